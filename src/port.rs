//! Per-port wiring of the LPC40xx UARTs and a registry of live drivers.
//!
//! The function codes select the UART alternate function of each pin in its
//! IOCON register.

use crate::config::{
    MAX_PORTS, UART0_BASE, UART0_IRQ, UART1_BASE, UART1_IRQ, UART2_BASE, UART2_IRQ, UART3_BASE,
    UART3_IRQ, UART4_BASE, UART4_IRQ,
};
use crate::error::{UartError, UartResult};
use crate::platform::{PeripheralId, PinId};
use crate::register::RegisterBus;
use crate::uart::UartDriver;

/// Fixed description of one UART port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PortDescriptor {
    /// Port number, also the trampoline slot.
    pub index: usize,
    /// Register block base address.
    pub base: usize,
    /// Power-control and clock identity.
    pub peripheral: PeripheralId,
    /// Interrupt vector number.
    pub vector: u16,
    /// Transmit pin.
    pub tx: PinId,
    /// Receive pin.
    pub rx: PinId,
    /// IOCON function code routing `tx` to this UART.
    pub tx_function: u8,
    /// IOCON function code routing `rx` to this UART.
    pub rx_function: u8,
}

/// UART0 on P0.2/P0.3.
pub static UART0: PortDescriptor = PortDescriptor {
    index: 0,
    base: UART0_BASE,
    peripheral: PeripheralId::UART0,
    vector: UART0_IRQ,
    tx: PinId::new(0, 2),
    rx: PinId::new(0, 3),
    tx_function: 0b001,
    rx_function: 0b001,
};

/// UART1 on P0.15/P0.16.
pub static UART1: PortDescriptor = PortDescriptor {
    index: 1,
    base: UART1_BASE,
    peripheral: PeripheralId::UART1,
    vector: UART1_IRQ,
    tx: PinId::new(0, 15),
    rx: PinId::new(0, 16),
    tx_function: 0b001,
    rx_function: 0b001,
};

/// UART2 on P2.8/P2.9.
pub static UART2: PortDescriptor = PortDescriptor {
    index: 2,
    base: UART2_BASE,
    peripheral: PeripheralId::UART2,
    vector: UART2_IRQ,
    tx: PinId::new(2, 8),
    rx: PinId::new(2, 9),
    tx_function: 0b010,
    rx_function: 0b010,
};

/// UART3 on P4.28/P4.29.
pub static UART3: PortDescriptor = PortDescriptor {
    index: 3,
    base: UART3_BASE,
    peripheral: PeripheralId::UART3,
    vector: UART3_IRQ,
    tx: PinId::new(4, 28),
    rx: PinId::new(4, 29),
    tx_function: 0b010,
    rx_function: 0b010,
};

/// UART4 on P1.28/P2.9.
pub static UART4: PortDescriptor = PortDescriptor {
    index: 4,
    base: UART4_BASE,
    peripheral: PeripheralId::UART4,
    vector: UART4_IRQ,
    tx: PinId::new(1, 28),
    rx: PinId::new(2, 9),
    tx_function: 0b101,
    rx_function: 0b011,
};

/// All ports, indexed by port number.
pub static PORTS: [&PortDescriptor; MAX_PORTS] = [&UART0, &UART1, &UART2, &UART3, &UART4];

/// Drivers keyed by port number.
///
/// Built once at startup and handed to whatever needs a port, instead of
/// global per-port singletons.
pub struct UartRegistry<'a, B: RegisterBus> {
    drivers: [Option<&'a UartDriver<'a, B>>; MAX_PORTS],
}

impl<'a, B: RegisterBus> UartRegistry<'a, B> {
    /// Registry with no drivers.
    pub const fn new() -> Self {
        Self {
            drivers: [None; MAX_PORTS],
        }
    }

    /// Add `driver` under its port number.
    pub fn register(&mut self, driver: &'a UartDriver<'a, B>) -> UartResult<()> {
        let entry = self
            .drivers
            .get_mut(driver.port().index)
            .ok_or(UartError::InvalidSlot)?;
        if entry.is_some() {
            log::warn!("UART{} registered twice", driver.port().index);
            return Err(UartError::PortAlreadyRegistered);
        }
        *entry = Some(driver);
        Ok(())
    }

    /// Driver for port `index`, if one was registered.
    pub fn get(&self, index: usize) -> Option<&'a UartDriver<'a, B>> {
        self.drivers.get(index).copied().flatten()
    }

    /// Registered drivers in port order.
    pub fn iter(&self) -> impl Iterator<Item = &'a UartDriver<'a, B>> + '_ {
        self.drivers.iter().filter_map(|driver| *driver)
    }
}

impl<B: RegisterBus> Default for UartRegistry<'_, B> {
    fn default() -> Self {
        Self::new()
    }
}
