//! Bit-exact access to memory-mapped peripheral registers.
//!
//! Registers are described by plain data rather than overlaid structs: a
//! [`Register`] is an offset plus an access mode, a [`Field`] is a bit range
//! inside one register. Both are interpreted against a [`RegisterBus`], which
//! is volatile MMIO on hardware ([`Mmio`]) and a simulated register file in
//! host tests.
//!
//! # Read-Modify-Write
//!
//! Every field write reads the full register, replaces only the field's bits
//! and writes the full register back. Bits outside the field are preserved
//! bit-for-bit. Write-only registers cannot be read back, so they are modified
//! against a software copy held in a [`ShadowRegister`].
//!
//! # Aliased Registers
//!
//! Some addresses expose two registers, selected by a mode bit in another
//! register (the UART divisor latch). [`DivisorLatch`] sequences
//! "set mode bit, write aliased registers, clear mode bit" inside a critical
//! section so no other context can touch the aliased addresses in between.

use core::sync::atomic::{AtomicU32, Ordering};

/// Word-wide access to a block of peripheral registers.
///
/// Offsets are byte offsets from the start of the block.
pub trait RegisterBus {
    /// Read the register at `offset`.
    fn read(&self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`.
    fn write(&self, offset: usize, value: u32);
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        (**self).read(offset)
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        (**self).write(offset, value)
    }
}

/// Volatile memory-mapped register block at a fixed base address.
#[derive(Debug)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create an accessor for the register block at `base`.
    ///
    /// # Safety
    /// `base` must be the address of a mapped peripheral register block, and
    /// every offset used through this accessor must lie inside it.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the register block.
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for Mmio {
    #[inline]
    fn read(&self, offset: usize) -> u32 {
        // SAFETY: `new` requires base + offset to be a mapped register.
        unsafe { ((self.base + offset) as *const u32).read_volatile() }
    }

    #[inline]
    fn write(&self, offset: usize, value: u32) {
        // SAFETY: `new` requires base + offset to be a mapped register.
        unsafe { ((self.base + offset) as *mut u32).write_volatile(value) }
    }
}

/// How software may access a register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Reads return hardware state, writes are ignored by hardware.
    ReadOnly,
    /// Writes take effect, reads return something else (often an aliased register).
    WriteOnly,
    /// Ordinary read/write register.
    ReadWrite,
}

/// A register at a fixed byte offset inside a register block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Register {
    /// Byte offset from the block base.
    pub offset: usize,
    /// Permitted access.
    pub access: Access,
}

impl Register {
    /// Describe a register.
    pub const fn new(offset: usize, access: Access) -> Self {
        Self { offset, access }
    }

    /// Read the full register.
    #[inline]
    pub fn read<B: RegisterBus + ?Sized>(self, bus: &B) -> u32 {
        debug_assert!(
            self.access != Access::WriteOnly,
            "read of write-only register"
        );
        bus.read(self.offset)
    }

    /// Write the full register.
    #[inline]
    pub fn write<B: RegisterBus + ?Sized>(self, bus: &B, value: u32) {
        debug_assert!(
            self.access != Access::ReadOnly,
            "write of read-only register"
        );
        bus.write(self.offset, value)
    }

    /// Read the register, transform the value and write it back.
    #[inline]
    pub fn modify<B: RegisterBus + ?Sized>(self, bus: &B, f: impl FnOnce(u32) -> u32) {
        let value = self.read(bus);
        self.write(bus, f(value));
    }
}

/// A contiguous bit range inside a [`Register`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    /// Register holding the field.
    pub register: Register,
    /// Position of the least significant bit.
    pub position: u32,
    /// Number of bits.
    pub width: u32,
}

impl Field {
    /// Describe a `width`-bit field starting at bit `position`.
    ///
    /// Fails to evaluate (at compile time for `const` descriptors) if the
    /// range is empty or does not fit a 32-bit register.
    pub const fn new(register: Register, position: u32, width: u32) -> Self {
        assert!(width > 0, "field width must be non-zero");
        assert!(position + width <= 32, "field exceeds register width");
        Self {
            register,
            position,
            width,
        }
    }

    /// Describe a single-bit field.
    pub const fn bit(register: Register, position: u32) -> Self {
        Self::new(register, position, 1)
    }

    /// Mask of the field's bits in register position.
    #[inline]
    pub const fn mask(self) -> u32 {
        (((1u64 << self.width) - 1) << self.position) as u32
    }

    /// Field value contained in `word`.
    #[inline]
    pub const fn extract(self, word: u32) -> u32 {
        (word & self.mask()) >> self.position
    }

    /// `word` with the field replaced by `value`. Excess bits of `value` are discarded.
    #[inline]
    pub const fn insert_in(self, word: u32, value: u32) -> u32 {
        (word & !self.mask()) | ((value << self.position) & self.mask())
    }

    /// `word` with every bit of the field set.
    #[inline]
    pub const fn set_in(self, word: u32) -> u32 {
        word | self.mask()
    }

    /// `word` with every bit of the field cleared.
    #[inline]
    pub const fn reset_in(self, word: u32) -> u32 {
        word & !self.mask()
    }

    /// Read the field from hardware.
    #[inline]
    pub fn get<B: RegisterBus + ?Sized>(self, bus: &B) -> u32 {
        self.extract(self.register.read(bus))
    }

    /// True if any bit of the field is set.
    #[inline]
    pub fn is_set<B: RegisterBus + ?Sized>(self, bus: &B) -> bool {
        self.get(bus) != 0
    }

    /// Set the field's bits high.
    #[inline]
    pub fn set<B: RegisterBus + ?Sized>(self, bus: &B) {
        self.register.modify(bus, |word| self.set_in(word));
    }

    /// Clear the field's bits.
    #[inline]
    pub fn reset<B: RegisterBus + ?Sized>(self, bus: &B) {
        self.register.modify(bus, |word| self.reset_in(word));
    }

    /// Write `value` into the field.
    #[inline]
    pub fn insert<B: RegisterBus + ?Sized>(self, bus: &B, value: u32) {
        self.register.modify(bus, |word| self.insert_in(word, value));
    }
}

/// A write-only register modified against a software copy of its contents.
///
/// `strobe` bits trigger a one-shot hardware action (for example a FIFO
/// reset) and are written but never retained in the shadow.
#[derive(Debug)]
pub struct ShadowRegister {
    register: Register,
    strobe: u32,
    value: AtomicU32,
}

impl ShadowRegister {
    /// Shadow `register`, assuming it currently holds `reset_value`.
    pub const fn new(register: Register, reset_value: u32, strobe: u32) -> Self {
        Self {
            register,
            strobe,
            value: AtomicU32::new(reset_value & !strobe),
        }
    }

    /// Last retained value.
    #[inline]
    pub fn value(&self) -> u32 {
        self.value.load(Ordering::Relaxed)
    }

    /// Compute the next value from the shadow, write it, and retain it minus strobes.
    ///
    /// Callers must not modify the same shadow from two contexts at once.
    pub fn modify<B: RegisterBus + ?Sized>(&self, bus: &B, f: impl FnOnce(u32) -> u32) {
        let next = f(self.value());
        bus.write(self.register.offset, next);
        self.value.store(next & !self.strobe, Ordering::Relaxed);
    }
}

/// Sequencer for registers aliased behind a divisor-latch access bit.
pub struct DivisorLatch<'a, B: ?Sized> {
    bus: &'a B,
    access: Field,
}

impl<'a, B: RegisterBus + ?Sized> DivisorLatch<'a, B> {
    /// `access` is the mode bit that exposes the latched registers.
    pub fn new(bus: &'a B, access: Field) -> Self {
        Self { bus, access }
    }

    /// Run `f` with the latch open.
    ///
    /// The mode bit is set before `f` and cleared after it, all inside one
    /// critical section.
    pub fn program<R>(&self, f: impl FnOnce(&LatchedRegisters<'_, B>) -> R) -> R {
        critical_section::with(|_| {
            self.access.set(self.bus);
            let result = f(&LatchedRegisters { bus: self.bus });
            self.access.reset(self.bus);
            result
        })
    }
}

/// Write access handed out while a [`DivisorLatch`] is open.
pub struct LatchedRegisters<'a, B: ?Sized> {
    bus: &'a B,
}

impl<B: RegisterBus + ?Sized> LatchedRegisters<'_, B> {
    /// Write a full register while the latch is open.
    pub fn write(&self, register: Register, value: u32) {
        register.write(self.bus, value);
    }
}
