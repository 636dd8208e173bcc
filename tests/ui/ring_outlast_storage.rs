//! Verify that a ReceiveRingBuffer cannot outlive its storage.

use lpc40xx_uart::ring_buffer::ReceiveRingBuffer;

fn main() {
    // This should fail: ring borrows storage past its scope
    let ring;
    {
        let mut storage = [0u8; 16];
        ring = ReceiveRingBuffer::new(&mut storage);
    }
    let _ = ring.len();
}
