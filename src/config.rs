//! Construction-time limits for an engine.

use crate::error::{Error, Result};

/// Bucket capacity used by the single-key variant.
pub const DEFAULT_BUCKET_CAPACITY: usize = 1;
/// Deepest directory either table may grow to (2^24 slots).
pub const DEFAULT_MAX_DEPTH: u32 = 24;
/// Displacements allowed between two splits before one is forced.
pub const DEFAULT_MAX_DISPLACEMENTS: usize = 512;

/// Limits fixed when an engine is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    /// Keys per bucket; 1 gives the single-key variant.
    pub bucket_capacity: usize,
    /// Deepest either directory may grow to; a split past it fails with
    /// `Error::DepthLimit`.
    pub max_depth: u32,
    /// Evictions allowed between splits before the next full bucket is split.
    pub max_displacements: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bucket_capacity: DEFAULT_BUCKET_CAPACITY,
            max_depth: DEFAULT_MAX_DEPTH,
            max_displacements: DEFAULT_MAX_DISPLACEMENTS,
        }
    }
}

impl Config {
    pub fn with_bucket_capacity(mut self, capacity: usize) -> Self {
        self.bucket_capacity = capacity;
        self
    }

    pub fn with_max_depth(mut self, depth: u32) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_displacements(mut self, limit: usize) -> Self {
        self.max_displacements = limit;
        self
    }

    /// Reject settings the engine cannot honour. Every constructor calls this.
    pub fn validate(&self) -> Result<()> {
        if self.bucket_capacity == 0 {
            return Err(Error::InvalidConfig {
                reason: "bucket capacity must be at least 1",
            });
        }
        // Addresses are directory indices, so the deepest directory must
        // still be indexable by usize.
        if self.max_depth >= usize::BITS {
            return Err(Error::InvalidConfig {
                reason: "max depth must be below the pointer width",
            });
        }
        if self.max_displacements == 0 {
            return Err(Error::InvalidConfig {
                reason: "displacement limit must be at least 1",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let c = Config::default();
        assert_eq!(c.bucket_capacity, 1);
        assert!(c.validate().is_ok());
    }

    /// Invariant: each out-of-range setting is rejected with `InvalidConfig`.
    #[test]
    fn invalid_settings_rejected() {
        let bad = [
            Config::default().with_bucket_capacity(0),
            Config::default().with_max_depth(usize::BITS),
            Config::default().with_max_displacements(0),
        ];
        for c in bad {
            match c.validate() {
                Err(Error::InvalidConfig { .. }) => {}
                other => panic!("unexpected result for {:?}: {:?}", c, other),
            }
        }
    }

    #[test]
    fn setters_chain() {
        let c = Config::default()
            .with_bucket_capacity(4)
            .with_max_depth(10)
            .with_max_displacements(32);
        assert_eq!(
            c,
            Config {
                bucket_capacity: 4,
                max_depth: 10,
                max_displacements: 32
            }
        );
    }
}
