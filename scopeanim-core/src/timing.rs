//! Tick flag shared between the frame timer interrupt and the main loop
//!
//! The interrupt side only ever writes `raised`, the main loop only ever
//! writes `seen`; a tick is pending while they differ. Neither side needs a
//! read-modify-write, so this works on cores without atomic RMW.

use portable_atomic::{AtomicU32, Ordering};

pub struct TickFlag {
    raised: AtomicU32,
    seen: AtomicU32,
}

impl Default for TickFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl TickFlag {
    pub const fn new() -> Self {
        Self {
            raised: AtomicU32::new(0),
            seen: AtomicU32::new(0),
        }
    }

    /// Interrupt side: a tick elapsed
    pub fn raise(&self) {
        let raised = self.raised.load(Ordering::Relaxed);
        self.raised.store(raised.wrapping_add(1), Ordering::Release);
    }

    /// Main loop side: consume pending ticks
    ///
    /// Returns how many ticks elapsed since the last call. Anything above one
    /// means the loop fell behind and ticks were coalesced.
    pub fn take_count(&self) -> u32 {
        let raised = self.raised.load(Ordering::Acquire);
        let seen = self.seen.load(Ordering::Relaxed);
        self.seen.store(raised, Ordering::Relaxed);
        raised.wrapping_sub(seen)
    }

    /// Main loop side: true if at least one tick is pending
    pub fn take(&self) -> bool {
        self.take_count() > 0
    }

    /// Main loop side: drop pending ticks without acting on them
    pub fn clear(&self) {
        self.take_count();
    }

    pub fn is_pending(&self) -> bool {
        self.raised.load(Ordering::Acquire) != self.seen.load(Ordering::Relaxed)
    }
}
