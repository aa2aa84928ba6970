//! Rolling history buffers for charting.

use std::collections::VecDeque;

/// Maximum number of historical points kept per metric.
pub const MAX_HISTORY_SIZE: usize = 60;

/// Fixed-capacity FIFO of recent numeric values for one metric.
///
/// Values are appended in arrival order; once the buffer is full the oldest
/// value is evicted. Non-finite values are stored as-is so the point count
/// matches the number of readings received.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HistoryBuffer {
    values: VecDeque<f64>,
}

impl HistoryBuffer {
    /// Create a new empty buffer.
    pub fn new() -> Self {
        Self {
            values: VecDeque::with_capacity(MAX_HISTORY_SIZE + 1),
        }
    }

    /// Append a value, evicting the oldest entry beyond capacity.
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > MAX_HISTORY_SIZE {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Copy the buffered values, oldest first.
    pub fn to_vec(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    /// Minimum and maximum over the finite values.
    ///
    /// Returns None if there are no finite values to chart.
    pub fn bounds(&self) -> Option<(f64, f64)> {
        self.values
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_within_capacity() {
        let mut buffer = HistoryBuffer::new();
        for i in 0..10 {
            buffer.push(i as f64);
        }
        assert_eq!(buffer.len(), 10);
        assert_eq!(buffer.to_vec().last(), Some(&9.0));
    }

    #[test]
    fn test_evicts_oldest_beyond_capacity() {
        let mut buffer = HistoryBuffer::new();
        for i in 0..150 {
            buffer.push(i as f64);
            assert!(buffer.len() <= MAX_HISTORY_SIZE);
        }

        let expected: Vec<f64> = (90..150).map(|i| i as f64).collect();
        assert_eq!(buffer.to_vec(), expected);
    }

    #[test]
    fn test_bounds_skip_non_finite() {
        let mut buffer = HistoryBuffer::new();
        assert_eq!(buffer.bounds(), None);

        buffer.push(f64::NAN);
        assert_eq!(buffer.bounds(), None);

        buffer.push(3.0);
        buffer.push(-1.5);
        buffer.push(f64::INFINITY);
        assert_eq!(buffer.bounds(), Some((-1.5, 3.0)));
        assert_eq!(buffer.len(), 4);
    }
}
