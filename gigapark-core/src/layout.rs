use serde::{Deserialize, Serialize};

/// Free spots that must remain before a new entry is accepted
pub const DEFAULT_BUFFER_THRESHOLD: u32 = 5;

fn default_buffer_threshold() -> u32 { DEFAULT_BUFFER_THRESHOLD }

/// Garage dimensions: `capacity` spots, of which ids `0..permanent_spots`
/// are reserved for permanent parkers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GarageLayout {
    pub capacity: u32,
    pub permanent_spots: u32,
    #[serde(default = "default_buffer_threshold")]
    pub buffer_threshold: u32,
}

impl GarageLayout {
    pub fn new(capacity: u32, permanent_spots: u32) -> Self {
        Self {
            capacity,
            permanent_spots,
            buffer_threshold: DEFAULT_BUFFER_THRESHOLD,
        }
    }

    pub fn with_buffer_threshold(mut self, buffer_threshold: u32) -> Self {
        self.buffer_threshold = buffer_threshold;
        self
    }

    pub fn validate(&self) -> Result<(), LayoutError> {
        if self.permanent_spots > self.capacity {
            return Err(LayoutError::PermanentExceedsCapacity {
                permanent: self.permanent_spots,
                capacity: self.capacity,
            });
        }
        Ok(())
    }
}

impl Default for GarageLayout {
    fn default() -> Self {
        Self::new(50, 40)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("Permanent spots ({permanent}) exceed capacity ({capacity})")]
    PermanentExceedsCapacity {
        permanent: u32,
        capacity: u32,
    },
}
