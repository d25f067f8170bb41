//! Single-producer/single-consumer byte ring fed from the UART receive interrupt.
//!
//! Every field has exactly one writer:
//! - producer: slot contents, `write`, `delimiters`, `overflows`
//! - consumer: `read` (and its private count of delimiters popped)
//!
//! Cursors are free-running and masked on access, so all `N` slots are
//! usable. When the ring is full the *newest* byte is dropped; bytes already
//! queued are never overwritten, which keeps an in-progress decode intact.

use portable_atomic::{AtomicU32, AtomicU8, AtomicUsize, Ordering};

use crate::cobs::DELIMITER;

/// Receive ring capacity used by the firmware
pub const RX_RING_SIZE: usize = 1024;

/// Returned by [`RxProducer::push`] when the byte was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct RingFull;

/// Lock-free receive ring of capacity `N` (a power of two)
pub struct RxRing<const N: usize> {
    slots: [AtomicU8; N],
    write: AtomicUsize,
    read: AtomicUsize,
    delimiters: AtomicU32,
    overflows: AtomicU32,
}

impl<const N: usize> Default for RxRing<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> RxRing<N> {
    const MASK: usize = {
        assert!(N.is_power_of_two(), "ring capacity must be a power of two");
        N - 1
    };

    pub const fn new() -> Self {
        let _ = Self::MASK;
        Self {
            slots: [const { AtomicU8::new(0) }; N],
            write: AtomicUsize::new(0),
            read: AtomicUsize::new(0),
            delimiters: AtomicU32::new(0),
            overflows: AtomicU32::new(0),
        }
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Split into the interrupt-side producer and the main-loop consumer
    pub fn split(&mut self) -> (RxProducer<'_, N>, RxConsumer<'_, N>) {
        let ring: &Self = self;
        (
            RxProducer { ring },
            RxConsumer {
                ring,
                delimiters_popped: ring.delimiters.load(Ordering::Acquire),
            },
        )
    }
}

/// Writing half, owned by the receive interrupt
pub struct RxProducer<'a, const N: usize> {
    ring: &'a RxRing<N>,
}

impl<const N: usize> RxProducer<'_, N> {
    /// Enqueue one byte, O(1)
    ///
    /// On a full ring the byte is dropped and the overflow counter bumped.
    pub fn push(&mut self, byte: u8) -> Result<(), RingFull> {
        let ring = self.ring;
        let write = ring.write.load(Ordering::Relaxed);
        let read = ring.read.load(Ordering::Acquire);

        if write.wrapping_sub(read) >= N {
            let overflows = ring.overflows.load(Ordering::Relaxed);
            ring.overflows
                .store(overflows.wrapping_add(1), Ordering::Release);
            return Err(RingFull);
        }

        ring.slots[write & RxRing::<N>::MASK].store(byte, Ordering::Relaxed);
        // Count the delimiter before publishing it so the consumer can never
        // pop a zero it has not been told about.
        if byte == DELIMITER {
            let delimiters = ring.delimiters.load(Ordering::Relaxed);
            ring.delimiters
                .store(delimiters.wrapping_add(1), Ordering::Release);
        }
        ring.write.store(write.wrapping_add(1), Ordering::Release);
        Ok(())
    }

    /// Enqueue a slice byte by byte, returning how many bytes were accepted
    pub fn push_slice(&mut self, bytes: &[u8]) -> usize {
        bytes.iter().filter(|&&byte| self.push(byte).is_ok()).count()
    }
}

/// Reading half, owned by the decoder
pub struct RxConsumer<'a, const N: usize> {
    ring: &'a RxRing<N>,
    delimiters_popped: u32,
}

impl<const N: usize> RxConsumer<'_, N> {
    /// Bytes queued and not yet consumed
    pub fn available(&self) -> usize {
        let write = self.ring.write.load(Ordering::Acquire);
        let read = self.ring.read.load(Ordering::Relaxed);
        write.wrapping_sub(read)
    }

    pub fn is_empty(&self) -> bool {
        self.available() == 0
    }

    /// Look at the byte `offset` positions past the read cursor
    pub fn peek(&self, offset: usize) -> Option<u8> {
        if offset >= self.available() {
            return None;
        }
        let read = self.ring.read.load(Ordering::Relaxed);
        let index = read.wrapping_add(offset) & RxRing::<N>::MASK;
        Some(self.ring.slots[index].load(Ordering::Relaxed))
    }

    /// Consume one byte
    pub fn pop(&mut self) -> Option<u8> {
        let byte = self.peek(0)?;
        let read = self.ring.read.load(Ordering::Relaxed);
        self.ring.read.store(read.wrapping_add(1), Ordering::Release);
        if byte == DELIMITER {
            self.delimiters_popped = self.delimiters_popped.wrapping_add(1);
        }
        Some(byte)
    }

    /// Discard bytes up to and including the next delimiter
    ///
    /// Returns `false` if the ring ran dry first; everything queued has then
    /// been discarded.
    pub fn skip_past_delimiter(&mut self) -> bool {
        while let Some(byte) = self.pop() {
            if byte == DELIMITER {
                return true;
            }
        }
        false
    }

    /// Delimiters enqueued but not yet consumed
    pub fn pending_delimiters(&self) -> u32 {
        self.ring
            .delimiters
            .load(Ordering::Acquire)
            .wrapping_sub(self.delimiters_popped)
    }

    /// Total bytes dropped because the ring was full
    pub fn overflow_count(&self) -> u32 {
        self.ring.overflows.load(Ordering::Acquire)
    }
}
