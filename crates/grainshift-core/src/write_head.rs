//! Circular write-index generator.
//!
//! A [`WriteHead`] walks `0, 1, .., delay - 1, 0, 1, ..` and records the index
//! used for every sample of the current block. Delay lines use the recorded
//! indices to address their ring; meters use the wrap back to `0` as the end of
//! a measurement window.

#[cfg(not(feature = "std"))]
use alloc::vec::Vec;

/// Write position of a ring of `delay` samples, recorded per block.
///
/// A delay of `0` disables the head: [`advance`](Self::advance) records
/// nothing and dependents must take their non-delayed path.
///
/// # Example
///
/// ```rust
/// use grainshift_core::WriteHead;
///
/// let mut head = WriteHead::new();
/// head.prepare(8, 3);
/// head.advance(5);
/// assert_eq!(head.indices(), &[0, 1, 2, 0, 1]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct WriteHead {
    indices: Vec<usize>,
    position: usize,
    delay: usize,
    len: usize,
}

impl WriteHead {
    /// Create a disabled write head.
    pub fn new() -> Self {
        Self::default()
    }

    /// Size the per-block index buffer and set the ring length.
    ///
    /// The current position is kept (folded into the new ring) so that a
    /// re-prepare with the same delay does not disturb alignment.
    pub fn prepare(&mut self, block_size: usize, delay: usize) {
        self.delay = delay;
        self.len = 0;
        if delay == 0 {
            self.position = 0;
            self.indices.clear();
        } else {
            self.position %= delay;
            self.indices.resize(block_size, 0);
        }
    }

    /// Record `num_samples` consecutive write indices.
    ///
    /// Clamped to the prepared block size.
    pub fn advance(&mut self, num_samples: usize) {
        if self.delay == 0 {
            self.len = 0;
            return;
        }
        let n = num_samples.min(self.indices.len());
        for slot in &mut self.indices[..n] {
            *slot = self.position;
            self.position += 1;
            if self.position == self.delay {
                self.position = 0;
            }
        }
        self.len = n;
    }

    /// Index recorded for sample `i` of the last advanced block.
    ///
    /// # Panics
    ///
    /// Panics if `i` is outside the last advanced block.
    #[inline]
    pub fn index_at(&self, i: usize) -> usize {
        self.indices[..self.len][i]
    }

    /// All indices recorded for the last advanced block.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices[..self.len]
    }

    /// Ring length; `0` when disabled.
    pub fn delay(&self) -> usize {
        self.delay
    }

    /// Whether the head has a non-zero ring.
    pub fn is_enabled(&self) -> bool {
        self.delay != 0
    }

    /// Next index to be written.
    pub fn position(&self) -> usize {
        self.position
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wraps_every_delay_samples() {
        let mut head = WriteHead::new();
        head.prepare(16, 4);
        head.advance(10);
        assert_eq!(head.indices(), &[0, 1, 2, 3, 0, 1, 2, 3, 0, 1]);
        head.advance(3);
        assert_eq!(head.indices(), &[2, 3, 0]);
        assert_eq!(head.index_at(2), 0);
    }

    #[test]
    fn zero_delay_records_nothing() {
        let mut head = WriteHead::new();
        head.prepare(16, 0);
        head.advance(8);
        assert!(head.indices().is_empty());
        assert!(!head.is_enabled());
    }

    #[test]
    fn reprepare_folds_position() {
        let mut head = WriteHead::new();
        head.prepare(8, 5);
        head.advance(4);
        head.prepare(8, 3);
        assert_eq!(head.position(), 1);
        head.advance(3);
        assert_eq!(head.indices(), &[1, 2, 0]);
    }

    #[test]
    fn advance_clamps_to_block_size() {
        let mut head = WriteHead::new();
        head.prepare(4, 100);
        head.advance(10);
        assert_eq!(head.indices().len(), 4);
        assert_eq!(head.position(), 4);
    }
}
