//! Host-side stand-ins for the UART register block and board services.
//!
//! [`SimulatedUart`] behaves like the LPC40xx UART as far as the driver can
//! observe: DLAB selects DLL/DLM over RBR/THR/IER, IIR and FCR share an
//! address, writing FCR with the RX clear bit empties the receive FIFO, and
//! LSR reports data-ready and transmitter-empty.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::vec::Vec;

use crate::platform::{
    ClockSource, InterruptController, PeripheralId, PinId, PinMux, PowerControl, Vector,
};
use crate::register::RegisterBus;

const LCR_DLAB: u32 = 1 << 7;
const FCR_RX_CLEAR: u32 = 1 << 1;
const LSR_DATA_READY: u32 = 1 << 0;
const LSR_THR_EMPTY: u32 = 1 << 5;
/// IIR bit 0 set: no interrupt pending.
const IIR_NONE_PENDING: u32 = 1;

#[derive(Debug, Default)]
struct State {
    lcr: u32,
    ier: u32,
    dll: u32,
    dlm: u32,
    fdr: u32,
    interrupt_id: u32,
    fcr_writes: Vec<u32>,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    /// LSR reads left before the transmitter is empty again.
    tx_remaining: u32,
    tx_latency: u32,
    /// THR writes issued while the transmitter was still busy.
    tx_overruns: u32,
    writes: Vec<(usize, u32)>,
}

/// Simulated register file of one UART.
#[derive(Debug, Default)]
pub struct SimulatedUart {
    state: Mutex<State>,
}

impl SimulatedUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bytes arrive on the line; raises "receive data available".
    pub fn receive(&self, bytes: &[u8]) {
        let mut state = self.state.lock().unwrap();
        state.rx.extend(bytes.iter().copied());
        state.interrupt_id = 0x2;
    }

    /// Force the interrupt identification value.
    pub fn set_interrupt_id(&self, id: u32) {
        self.state.lock().unwrap().interrupt_id = id;
    }

    /// Number of LSR polls each transmitted byte keeps THR busy.
    pub fn set_tx_latency(&self, polls: u32) {
        self.state.lock().unwrap().tx_latency = polls;
    }

    pub fn transmitted(&self) -> Vec<u8> {
        self.state.lock().unwrap().tx.clone()
    }

    pub fn tx_overruns(&self) -> u32 {
        self.state.lock().unwrap().tx_overruns
    }

    pub fn pending_rx(&self) -> usize {
        self.state.lock().unwrap().rx.len()
    }

    pub fn lcr(&self) -> u32 {
        self.state.lock().unwrap().lcr
    }

    pub fn ier(&self) -> u32 {
        self.state.lock().unwrap().ier
    }

    /// Divisor latch as DLM:DLL.
    pub fn divisor(&self) -> u32 {
        let state = self.state.lock().unwrap();
        (state.dlm << 8) | state.dll
    }

    pub fn fdr(&self) -> u32 {
        self.state.lock().unwrap().fdr
    }

    pub fn fcr_writes(&self) -> Vec<u32> {
        self.state.lock().unwrap().fcr_writes.clone()
    }

    /// Every register write as `(offset, value)`, in order.
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.lock().unwrap().writes.clone()
    }
}

impl RegisterBus for SimulatedUart {
    fn read(&self, offset: usize) -> u32 {
        let mut state = self.state.lock().unwrap();
        let dlab = state.lcr & LCR_DLAB != 0;
        match offset {
            0x00 if dlab => state.dll,
            0x00 => {
                let byte = state.rx.pop_front().map_or(0, u32::from);
                if state.rx.is_empty() && matches!(state.interrupt_id, 0x2 | 0x6) {
                    state.interrupt_id = 0;
                }
                byte
            }
            0x04 if dlab => state.dlm,
            0x04 => state.ier,
            0x08 if state.interrupt_id == 0 => IIR_NONE_PENDING,
            0x08 => state.interrupt_id << 1,
            0x0C => state.lcr,
            0x14 => {
                let mut lsr = 0;
                if !state.rx.is_empty() {
                    lsr |= LSR_DATA_READY;
                }
                if state.tx_remaining == 0 {
                    lsr |= LSR_THR_EMPTY;
                } else {
                    state.tx_remaining -= 1;
                }
                lsr
            }
            0x28 => state.fdr,
            _ => 0,
        }
    }

    fn write(&self, offset: usize, value: u32) {
        let mut state = self.state.lock().unwrap();
        state.writes.push((offset, value));
        let dlab = state.lcr & LCR_DLAB != 0;
        match offset {
            0x00 if dlab => state.dll = value & 0xFF,
            0x00 => {
                if state.tx_remaining != 0 {
                    state.tx_overruns += 1;
                }
                state.tx.push(value as u8);
                state.tx_remaining = state.tx_latency;
            }
            0x04 if dlab => state.dlm = value & 0xFF,
            0x04 => state.ier = value,
            0x08 => {
                if value & FCR_RX_CLEAR != 0 {
                    state.rx.clear();
                }
                state.fcr_writes.push(value);
            }
            0x0C => state.lcr = value,
            0x28 => state.fdr = value,
            _ => {}
        }
    }
}

/// Board services that record every request.
#[derive(Debug, Default)]
pub struct FakePlatform {
    pub clock_hz: u32,
    pub powered: Vec<PeripheralId>,
    pub functions: Vec<(PinId, u8)>,
    pub pull_ups: Vec<PinId>,
    pub installed: Vec<(u16, Vector)>,
}

impl FakePlatform {
    pub fn with_clock(clock_hz: u32) -> Self {
        Self {
            clock_hz,
            ..Self::default()
        }
    }

    /// Handler installed on `vector`.
    pub fn vector(&self, vector: u16) -> Option<Vector> {
        self.installed
            .iter()
            .rev()
            .find(|(number, _)| *number == vector)
            .map(|(_, handler)| *handler)
    }
}

impl PowerControl for FakePlatform {
    fn power_on(&mut self, peripheral: PeripheralId) {
        self.powered.push(peripheral);
    }
}

impl ClockSource for FakePlatform {
    fn frequency(&self, _peripheral: PeripheralId) -> u32 {
        self.clock_hz
    }
}

impl PinMux for FakePlatform {
    fn set_function(&mut self, pin: PinId, function: u8) {
        self.functions.push((pin, function));
    }

    fn set_pull_up(&mut self, pin: PinId) {
        self.pull_ups.push(pin);
    }
}

impl InterruptController for FakePlatform {
    fn enable_interrupt(&mut self, vector: u16, handler: Vector) {
        self.installed.push((vector, handler));
    }
}
