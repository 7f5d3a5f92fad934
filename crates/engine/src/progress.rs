//! Chunk completion accounting.

/// Counts aggregated chunks against the planned total.
#[derive(Debug, Clone, Copy)]
pub struct ProgressTracker {
    total: usize,
    completed: usize,
}

impl ProgressTracker {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            completed: 0,
        }
    }

    /// Count one more aggregated chunk and return the new fraction.
    pub fn record_chunk(&mut self) -> f64 {
        self.completed = (self.completed + 1).min(self.total);
        self.fraction()
    }

    /// `completed / total`, or 1.0 for an empty plan.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn is_complete(&self) -> bool {
        self.completed == self.total
    }
}
