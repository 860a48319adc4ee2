// Firmware-wide event log ring

use core::sync::atomic::{AtomicUsize, Ordering};

const MAX_EVENTS: usize = 256;

static mut EVENT_RING: [Option<&'static str>; MAX_EVENTS] = [None; MAX_EVENTS];
static EVENT_COUNT: AtomicUsize = AtomicUsize::new(0); // Total events recorded

/// Record an event. Oldest entries are overwritten once the ring is full.
pub fn log(event: &'static str) {
    let count = EVENT_COUNT.fetch_add(1, Ordering::SeqCst);
    let idx = count % MAX_EVENTS;

    unsafe {
        EVENT_RING[idx] = Some(event);
    }
}

/// Iterator over recorded events in chronological order.
pub struct EventIterator {
    start_idx: usize,
    current: usize,
    remaining: usize,
}

impl Iterator for EventIterator {
    type Item = &'static str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let idx = (self.start_idx + self.current) % MAX_EVENTS;
        self.current += 1;
        self.remaining -= 1;

        unsafe { EVENT_RING[idx] }
    }
}

/// All retained events, oldest first.
pub fn events() -> EventIterator {
    let total = EVENT_COUNT.load(Ordering::SeqCst);
    let retained = total.min(MAX_EVENTS);

    // Once the ring has wrapped the oldest retained entry is at total % MAX
    let start_idx = if total >= MAX_EVENTS {
        total % MAX_EVENTS
    } else {
        0
    };

    EventIterator {
        start_idx,
        current: 0,
        remaining: retained,
    }
}

/// The last `n` events (up to the ring capacity), oldest first.
pub fn recent(n: usize) -> EventIterator {
    let total = EVENT_COUNT.load(Ordering::SeqCst);
    let retained = total.min(MAX_EVENTS);
    let wanted = n.min(retained);

    let start_idx = if total >= MAX_EVENTS {
        (total - wanted) % MAX_EVENTS
    } else {
        total.saturating_sub(wanted)
    };

    EventIterator {
        start_idx,
        current: 0,
        remaining: wanted,
    }
}

/// Number of events currently retained in the ring.
pub fn retained_count() -> usize {
    EVENT_COUNT.load(Ordering::SeqCst).min(MAX_EVENTS)
}

/// Total number of events ever recorded, including overwritten ones.
pub fn total_count() -> usize {
    EVENT_COUNT.load(Ordering::SeqCst)
}

// Macro for easier logging
#[macro_export]
macro_rules! log_event {
    ($msg:expr) => {
        $crate::logger::log($msg)
    };
}
