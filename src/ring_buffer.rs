//! Lock-free single-producer single-consumer (SPSC) receive ring.
//!
//! Carries received bytes from the UART interrupt to foreground code. The
//! producer side (`push_back`) runs in interrupt context, the consumer side
//! (`pop_front`, `flush`) runs in foreground context, and neither ever blocks.
//!
//! # Overflow Policy
//!
//! The producer is a hardware event and cannot be made to wait. When the ring
//! is full the incoming byte is dropped and counted; bytes already buffered
//! are kept.
//!
//! # Memory Ordering
//!
//! Uses Acquire/Release ordering on head and tail indices:
//! - Producer: writes the byte, then stores head with Release (byte visible before count)
//! - Consumer: reads the byte after loading head with Acquire (sees producer's write)
//! - Symmetric for tail updates, which hand the slot back to the producer
//!
//! # Indexing
//!
//! Capacity is whatever the caller's storage slice holds, not necessarily a
//! power of two. Indices run over `0..2N`, so a full ring (`head - tail == N`)
//! and an empty ring (`head == tail`) stay distinguishable without a spare slot.

use core::cell::UnsafeCell;
use core::marker::PhantomData;
use core::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// Fixed-capacity byte ring over caller-provided storage.
///
/// # Static Usage
///
/// ```rust,ignore
/// static STORAGE: StaticCell<[u8; 512]> = StaticCell::new();
/// let ring = ReceiveRingBuffer::new(STORAGE.init([0; 512]));
///
/// // In ISR (producer):
/// unsafe { ring.push_back(byte).ok(); }
///
/// // In foreground (consumer):
/// while let Some(byte) = unsafe { ring.pop_front() } { /* ... */ }
/// ```
pub struct ReceiveRingBuffer<'a> {
    /// Write index in `0..2N`. Only modified by the producer.
    head: AtomicUsize,
    /// Read index in `0..2N`. Only modified by the consumer.
    tail: AtomicUsize,
    /// Bytes rejected because the ring was full.
    dropped: AtomicU32,
    slots: &'a [UnsafeCell<u8>],
    _storage: PhantomData<&'a mut [u8]>,
}

// SAFETY: The ring is designed for exactly one producer and one consumer
// accessing it concurrently. Violating this contract (e.g., two contexts calling
// push_back()) is undefined behavior - there is no internal locking to prevent
// data races on slots. Each slot is written only by the producer while it lies
// outside head..tail and read only by the consumer while it lies inside, and the
// index handoff uses Release/Acquire ordering.
unsafe impl Sync for ReceiveRingBuffer<'_> {}
unsafe impl Send for ReceiveRingBuffer<'_> {}

impl<'a> ReceiveRingBuffer<'a> {
    /// Creates an empty ring whose capacity is `storage.len()`.
    pub fn new(storage: &'a mut [u8]) -> Self {
        let len = storage.len();
        // SAFETY: UnsafeCell<u8> is repr(transparent) over u8, and the
        // exclusive borrow of `storage` is held for 'a via `_storage`.
        let slots = unsafe {
            core::slice::from_raw_parts(storage.as_mut_ptr() as *const UnsafeCell<u8>, len)
        };
        Self {
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
            dropped: AtomicU32::new(0),
            slots,
            _storage: PhantomData,
        }
    }

    /// Returns the capacity of the ring.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of bytes currently buffered, in `0..=capacity()`.
    ///
    /// A snapshot: may be stale if called concurrently with push/pop.
    #[inline]
    pub fn len(&self) -> usize {
        let head = self.head.load(Ordering::Acquire);
        let tail = self.tail.load(Ordering::Acquire);
        self.distance(tail, head)
    }

    /// Returns true if no bytes are buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the next push would be dropped.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity()
    }

    /// Number of bytes dropped on overflow since construction.
    #[inline]
    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Appends a byte (producer side).
    ///
    /// Returns `Err(byte)` and counts the drop if the ring is full.
    ///
    /// # Safety
    ///
    /// Must only be called from a single producer context. Concurrent calls
    /// from multiple producers cause data races.
    #[inline]
    pub unsafe fn push_back(&self, byte: u8) -> Result<(), u8> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);

        if self.distance(tail, head) >= self.capacity() {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            return Err(byte);
        }

        self.slots[self.slot(head)].get().write(byte);

        // Release: data write must be visible before head update
        self.head.store(self.advance(head), Ordering::Release);

        Ok(())
    }

    /// Removes and returns the oldest byte (consumer side).
    ///
    /// Returns `None` if the ring is empty.
    ///
    /// # Safety
    ///
    /// Must only be called from a single consumer context. Concurrent calls
    /// from multiple consumers cause data races.
    #[inline]
    pub unsafe fn pop_front(&self) -> Option<u8> {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);

        if head == tail {
            return None;
        }

        // SAFETY: Slot was written by producer before head was updated (Release).
        // We loaded head with Acquire, so the data write is visible.
        let byte = self.slots[self.slot(tail)].get().read();

        // Release: read must complete before tail update (frees slot for producer)
        self.tail.store(self.advance(tail), Ordering::Release);

        Some(byte)
    }

    /// Discards every buffered byte (consumer side) and returns how many.
    ///
    /// # Safety
    ///
    /// Same contract as [`pop_front`](Self::pop_front).
    pub unsafe fn flush(&self) -> usize {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        self.tail.store(head, Ordering::Release);
        self.distance(tail, head)
    }

    /// Splits the ring into producer and consumer halves.
    ///
    /// Provides compile-time enforcement of the single-producer single-consumer
    /// contract via the borrow checker. For a ring shared between an ISR and
    /// foreground code through a static reference, use the unsafe
    /// [`push_back`](Self::push_back)/[`pop_front`](Self::pop_front) directly.
    pub fn split(&mut self) -> (Producer<'_, 'a>, Consumer<'_, 'a>) {
        (Producer { rb: self }, Consumer { rb: self })
    }

    /// Number of steps from `from` to `to` in index space.
    #[inline]
    fn distance(&self, from: usize, to: usize) -> usize {
        if to >= from {
            to - from
        } else {
            to + 2 * self.capacity() - from
        }
    }

    #[inline]
    fn advance(&self, index: usize) -> usize {
        if index + 1 == 2 * self.capacity() {
            0
        } else {
            index + 1
        }
    }

    #[inline]
    fn slot(&self, index: usize) -> usize {
        if index >= self.capacity() {
            index - self.capacity()
        } else {
            index
        }
    }
}

/// Producer half of a receive ring.
///
/// Obtained by calling [`ReceiveRingBuffer::split`].
pub struct Producer<'r, 'a> {
    rb: &'r ReceiveRingBuffer<'a>,
}

impl Producer<'_, '_> {
    /// Appends a byte, returning `Err(byte)` if the ring is full.
    #[inline]
    pub fn push_back(&mut self, byte: u8) -> Result<(), u8> {
        // SAFETY: Split guarantees exclusive producer access.
        // &mut self prevents aliased push calls.
        unsafe { self.rb.push_back(byte) }
    }

    /// Returns true if the ring is full.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.rb.is_full()
    }
}

/// Consumer half of a receive ring.
///
/// Obtained by calling [`ReceiveRingBuffer::split`].
pub struct Consumer<'r, 'a> {
    rb: &'r ReceiveRingBuffer<'a>,
}

impl Consumer<'_, '_> {
    /// Removes the oldest byte, or returns `None` if the ring is empty.
    #[inline]
    pub fn pop_front(&mut self) -> Option<u8> {
        // SAFETY: Split guarantees exclusive consumer access.
        // &mut self prevents aliased pop calls.
        unsafe { self.rb.pop_front() }
    }

    /// Discards every buffered byte.
    #[inline]
    pub fn flush(&mut self) -> usize {
        // SAFETY: as in pop_front.
        unsafe { self.rb.flush() }
    }

    /// Returns the number of buffered bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.rb.len()
    }

    /// Returns true if the ring is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rb.is_empty()
    }
}
