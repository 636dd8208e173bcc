//! Verify that a ring cannot hand out two producers at once.

use lpc40xx_uart::ring_buffer::ReceiveRingBuffer;

fn main() {
    let mut storage = [0u8; 8];
    let mut ring = ReceiveRingBuffer::new(&mut storage);

    // This should fail: ring is already mutably borrowed by the first split
    let (mut first, _consumer) = ring.split();
    let (mut second, _other) = ring.split();
    let _ = first.push_back(1);
    let _ = second.push_back(2);
}
