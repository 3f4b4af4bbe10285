//! Tuning knobs for a load.
//!
//! None of these change what ends up in the store, only how fast it gets
//! there.

use store::DEFAULT_BATCH_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadConfig {
    /// Documents per insert batch
    pub batch_size: usize,
    /// Assembled documents allowed to wait for the writer
    pub channel_capacity: usize,
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            channel_capacity: 4 * DEFAULT_BATCH_SIZE,
        }
    }
}

impl LoadConfig {
    /// Builder-style override of the batch size
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}
