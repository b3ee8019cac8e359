use std::collections::VecDeque;

pub const DEFAULT_CAPACITY: usize = 60;

/// Bounded FIFO of recent samples, oldest first. Feeds the sparklines.
#[derive(Debug, Clone)]
pub struct HistoryBuffer {
    samples: VecDeque<f64>,
    capacity: usize,
}

impl HistoryBuffer {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn append(&mut self, value: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(value);
    }

    pub fn snapshot(&self) -> Vec<f64> {
        self.samples.iter().copied().collect()
    }

    pub fn latest(&self) -> Option<f64> {
        self.samples.back().copied()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_insertion_order() {
        let mut h = HistoryBuffer::new(4);
        h.append(1.0);
        h.append(2.0);
        assert_eq!(h.snapshot(), vec![1.0, 2.0]);
        assert_eq!(h.latest(), Some(2.0));
    }

    #[test]
    fn ring_buffer_caps_at_capacity() {
        let mut h = HistoryBuffer::new(5);
        for i in 0..12 {
            h.append(i as f64);
        }
        assert_eq!(h.len(), 5);
        assert_eq!(h.snapshot(), vec![7.0, 8.0, 9.0, 10.0, 11.0]);
    }

    #[test]
    fn zero_capacity_holds_one_sample() {
        let mut h = HistoryBuffer::new(0);
        h.append(3.0);
        h.append(4.0);
        assert_eq!(h.capacity(), 1);
        assert_eq!(h.snapshot(), vec![4.0]);
    }

    #[test]
    fn snapshot_does_not_mutate() {
        let mut h = HistoryBuffer::default();
        assert!(h.is_empty());
        h.append(9.5);
        let _ = h.snapshot();
        assert_eq!(h.snapshot(), vec![9.5]);
    }
}
