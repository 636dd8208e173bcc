//! Context-free interrupt entry points for stateful handlers.
//!
//! A vector table entry is a bare `extern "C" fn()`: it carries no pointer to
//! the driver instance that should service the interrupt. A
//! [`TrampolineTable`] pairs a fixed set of such functions with a slot array;
//! trampoline `N` looks up slot `N` and forwards the interrupt to whatever
//! handler is bound there.
//!
//! Tables are created with [`trampoline_table!`], which emits the static and
//! one trampoline per slot. The crate provides [`UART_TRAMPOLINES`], one slot
//! per UART port.
//!
//! ```rust,ignore
//! static DRIVER: StaticCell<UartDriver<'static, Mmio>> = StaticCell::new();
//! let driver: &'static _ = DRIVER.init(UartDriver::new(&UART2, bus, storage, settings));
//!
//! let vector = UART_TRAMPOLINES.bind(UART2.index, driver)?;
//! nvic.enable_interrupt(UART2.vector, vector);
//! ```

use core::cell::UnsafeCell;
use core::sync::atomic::{AtomicBool, Ordering};

use crate::config::MAX_PORTS;
use crate::error::{UartError, UartResult};
use crate::platform::{InterruptController, Vector};

/// Something that services an interrupt.
pub trait InterruptHandler: Sync {
    /// Called from interrupt context.
    fn on_interrupt(&self);
}

/// Write-once handler slot.
///
/// `handler` is written at most once, inside a critical section, before
/// `bound` is published. Readers only look at it after observing `bound`.
struct Slot {
    bound: AtomicBool,
    handler: UnsafeCell<Option<&'static dyn InterruptHandler>>,
}

// SAFETY: `handler` is never written after `bound` is set, and writers are
// serialized by a critical section.
unsafe impl Sync for Slot {}

impl Slot {
    const fn new() -> Self {
        Self {
            bound: AtomicBool::new(false),
            handler: UnsafeCell::new(None),
        }
    }

    fn get(&self) -> Option<&'static dyn InterruptHandler> {
        if !self.bound.load(Ordering::Acquire) {
            return None;
        }
        // SAFETY: published by the Release store in `set`; immutable since.
        unsafe { *self.handler.get() }
    }

    fn set(&self, handler: &'static dyn InterruptHandler) -> UartResult<()> {
        critical_section::with(|_| match self.get() {
            Some(bound) if same_instance(bound, handler) => Ok(()),
            Some(_) => Err(UartError::HandlerAlreadyBound),
            None => {
                // SAFETY: unpublished, and the critical section excludes
                // other writers.
                unsafe { *self.handler.get() = Some(handler) };
                self.bound.store(true, Ordering::Release);
                Ok(())
            }
        })
    }
}

/// Fixed table of trampolines and the handlers bound to them.
///
/// Dispatch is lock-free: a trampoline never enters a critical section, so
/// it may fire while foreground code holds one on another core.
pub struct TrampolineTable {
    slots: [Slot; MAX_PORTS],
    trampolines: [Vector; MAX_PORTS],
}

impl TrampolineTable {
    /// Used by [`trampoline_table!`]; `trampolines[n]` must call `dispatch(n)`
    /// on this same table.
    #[doc(hidden)]
    pub const fn new(trampolines: [Vector; MAX_PORTS]) -> Self {
        Self {
            slots: [const { Slot::new() }; MAX_PORTS],
            trampolines,
        }
    }

    /// Number of slots.
    pub const fn capacity(&self) -> usize {
        MAX_PORTS
    }

    /// Bind `handler` to `slot` and return the slot's trampoline.
    ///
    /// Binding the instance already held by the slot succeeds again; binding a
    /// different one fails with [`UartError::HandlerAlreadyBound`]. A slot is
    /// never unbound.
    ///
    /// The handler must live for the rest of the program:
    ///
    /// ```compile_fail,E0597
    /// use lpc40xx_uart::trampoline::{InterruptHandler, UART_TRAMPOLINES};
    ///
    /// struct Blink;
    ///
    /// impl InterruptHandler for Blink {
    ///     fn on_interrupt(&self) {}
    /// }
    ///
    /// let local = Blink;
    /// let _ = UART_TRAMPOLINES.bind(0, &local);
    /// ```
    pub fn bind(&self, slot: usize, handler: &'static dyn InterruptHandler) -> UartResult<Vector> {
        self.slots
            .get(slot)
            .ok_or(UartError::InvalidSlot)?
            .set(handler)?;

        log::debug!("trampoline slot {} bound", slot);
        Ok(self.trampolines[slot])
    }

    /// Register the trampoline of `slot` on `vector` and enable it.
    pub fn install<C: InterruptController + ?Sized>(
        &self,
        slot: usize,
        vector: u16,
        controller: &mut C,
    ) -> UartResult<()> {
        controller.enable_interrupt(vector, self.trampoline(slot)?);
        Ok(())
    }

    /// Trampoline of `slot`, bound or not.
    pub fn trampoline(&self, slot: usize) -> UartResult<Vector> {
        self.trampolines
            .get(slot)
            .copied()
            .ok_or(UartError::InvalidSlot)
    }

    /// True if a handler is bound to `slot`.
    pub fn is_bound(&self, slot: usize) -> bool {
        self.slots
            .get(slot)
            .is_some_and(|entry| entry.get().is_some())
    }

    /// Forward an interrupt to the handler in `slot`. Empty slots ignore it.
    #[doc(hidden)]
    #[inline]
    pub fn dispatch(&self, slot: usize) {
        if let Some(handler) = self.slots.get(slot).and_then(Slot::get) {
            handler.on_interrupt();
        }
    }
}

fn same_instance(a: &dyn InterruptHandler, b: &dyn InterruptHandler) -> bool {
    core::ptr::eq(
        a as *const dyn InterruptHandler as *const (),
        b as *const dyn InterruptHandler as *const (),
    )
}

/// Declare a static [`TrampolineTable`] together with its trampolines.
///
/// ```rust,ignore
/// lpc40xx_uart::trampoline_table! {
///     /// Slots for the application's own interrupt sources.
///     pub static APP_TRAMPOLINES;
/// }
/// ```
#[macro_export]
macro_rules! trampoline_table {
    ($(#[$meta:meta])* $vis:vis static $name:ident;) => {
        $(#[$meta])*
        $vis static $name: $crate::trampoline::TrampolineTable = {
            extern "C" fn slot0() {
                $name.dispatch(0)
            }
            extern "C" fn slot1() {
                $name.dispatch(1)
            }
            extern "C" fn slot2() {
                $name.dispatch(2)
            }
            extern "C" fn slot3() {
                $name.dispatch(3)
            }
            extern "C" fn slot4() {
                $name.dispatch(4)
            }
            $crate::trampoline::TrampolineTable::new([slot0, slot1, slot2, slot3, slot4])
        };
    };
}

// The macro spells out one trampoline per port.
const _: () = assert!(MAX_PORTS == 5);

trampoline_table! {
    /// Trampolines for UART0..UART4, indexed by port.
    pub static UART_TRAMPOLINES;
}
