use std::time::Instant;

/// Clock is the engine's source of monotonic time.
pub(crate) trait Clock {
    fn now(&self) -> Instant;
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// ManualClock only moves when told to. Clones share the same instant.
#[cfg(test)]
#[derive(Clone)]
pub(crate) struct ManualClock {
    now: std::rc::Rc<std::cell::Cell<Instant>>,
}

#[cfg(test)]
impl ManualClock {
    pub(crate) fn new() -> Self {
        Self {
            now: std::rc::Rc::new(std::cell::Cell::new(Instant::now())),
        }
    }

    pub(crate) fn advance(&self, by: std::time::Duration) {
        self.now.set(self.now.get() + by);
    }
}

#[cfg(test)]
impl Clock for ManualClock {
    fn now(&self) -> Instant {
        self.now.get()
    }
}
