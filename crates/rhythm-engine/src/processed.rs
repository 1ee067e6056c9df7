/// Fixed-size record of which note indices have been finalized.
///
/// Sized once per pattern load. `count` is kept alongside the flags so
/// completion checks are O(1), and `first_pending` lets the miss scanner
/// skip the already-resolved prefix of a time-sorted pattern.
#[derive(Debug, Clone, Default)]
pub struct ProcessedSet {
    flags: Vec<bool>,
    count: usize,
    first_pending: usize,
}

impl ProcessedSet {
    pub fn new(len: usize) -> Self {
        Self {
            flags: vec![false; len],
            count: 0,
            first_pending: 0,
        }
    }

    pub fn reset(&mut self, len: usize) {
        self.flags.clear();
        self.flags.resize(len, false);
        self.count = 0;
        self.first_pending = 0;
    }

    pub fn len(&self) -> usize {
        self.flags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    /// Out-of-range indices report as processed so they are never judged.
    pub fn is_processed(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(true)
    }

    /// Mark `index` processed. Returns false if it already was (or is out
    /// of range), in which case nothing changes.
    pub fn mark(&mut self, index: usize) -> bool {
        match self.flags.get_mut(index) {
            Some(flag) if !*flag => {
                *flag = true;
                self.count += 1;
                while self.first_pending < self.flags.len() && self.flags[self.first_pending] {
                    self.first_pending += 1;
                }
                true
            }
            _ => false,
        }
    }

    /// True once every index has been marked. An empty set is never complete.
    pub fn is_complete(&self) -> bool {
        !self.flags.is_empty() && self.count == self.flags.len()
    }

    /// Lowest index not yet processed (`len()` when all are).
    pub fn first_pending(&self) -> usize {
        self.first_pending
    }
}
