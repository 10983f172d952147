use std::time::{Duration, Instant};

/// CycleHandle identifies one started relocation cycle.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub(crate) struct CycleHandle(pub(crate) u64);

impl std::fmt::Display for CycleHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "cycle#{}", self.0)
    }
}

/// RelocationCycle is the recurring target jump timer. It is driven by whoever owns it: nothing
/// fires unless the owner asks whether the cycle is due. Dropping the cycle cancels it.
#[derive(Debug)]
pub(crate) struct RelocationCycle {
    handle: CycleHandle,
    next_due: Instant,
}

impl RelocationCycle {
    pub(crate) fn new(handle: CycleHandle, started: Instant, interval: Duration) -> Self {
        Self {
            handle,
            next_due: started + interval,
        }
    }

    pub(crate) fn handle(&self) -> CycleHandle {
        self.handle
    }

    pub(crate) fn next_due(&self) -> Instant {
        self.next_due
    }

    pub(crate) fn is_due(&self, now: Instant) -> bool {
        now >= self.next_due
    }

    /// Schedule the following tick relative to the deadline that just fired, so a late poll
    /// does not shift the cadence.
    pub(crate) fn advance(&mut self, interval: Duration) {
        self.next_due += interval;
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn due_only_after_interval() {
        let start = Instant::now();
        let mut cycle = RelocationCycle::new(CycleHandle(1), start, Duration::from_millis(100));
        assert!(!cycle.is_due(start));
        assert!(!cycle.is_due(start + Duration::from_millis(99)));
        assert!(cycle.is_due(start + Duration::from_millis(100)));

        cycle.advance(Duration::from_millis(50));
        assert_eq!(cycle.next_due(), start + Duration::from_millis(150));
        assert!(!cycle.is_due(start + Duration::from_millis(120)));
        assert_eq!(cycle.handle(), CycleHandle(1));
    }
}
