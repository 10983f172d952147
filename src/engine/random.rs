use rand::{Rng, RngCore};

/// RandomSource produces uniformly distributed integers in `[from, to)`.
pub(crate) trait RandomSource {
    fn next_int(&mut self, from: usize, to: usize) -> usize;
}

/// RngSource adapts any rand generator into a RandomSource.
pub(crate) struct RngSource<R: RngCore>(R);

impl<R: RngCore> RngSource<R> {
    pub(crate) fn new(rng: R) -> Self {
        Self(rng)
    }
}

impl<R: RngCore> RandomSource for RngSource<R> {
    fn next_int(&mut self, from: usize, to: usize) -> usize {
        self.0.gen_range(from..to)
    }
}

/// SequenceSource replays a fixed list of values, starting over once it runs out.
#[cfg(test)]
pub(crate) struct SequenceSource {
    values: Vec<usize>,
    next: usize,
}

#[cfg(test)]
impl SequenceSource {
    pub(crate) fn new(values: Vec<usize>) -> Self {
        assert!(!values.is_empty(), "a sequence needs at least one value");
        Self { values, next: 0 }
    }
}

#[cfg(test)]
impl RandomSource for SequenceSource {
    fn next_int(&mut self, _from: usize, _to: usize) -> usize {
        let value = self.values[self.next];
        self.next = (self.next + 1) % self.values.len();
        value
    }
}
