//! Growable bump arena addressed by offsets.
//!
//! Regions are handed out as byte offsets into a single buffer. Growing the
//! buffer may move it, so callers never keep references across `allocate`;
//! they address the arena by offset and only borrow slices once the arena has
//! been frozen.

use crate::error::{IndexerError, Result};

pub const MIB: usize = 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Bytes reserved up front.
    pub initial_capacity: usize,
    /// Hard ceiling; the arena doubles until the next doubling would exceed it.
    pub max_capacity: usize,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            initial_capacity: MIB,
            max_capacity: 64 * MIB,
        }
    }
}

impl ArenaConfig {
    pub fn from_mib(initial_mib: usize, max_mib: usize) -> Self {
        Self {
            initial_capacity: initial_mib.saturating_mul(MIB),
            max_capacity: max_mib.saturating_mul(MIB),
        }
    }

    fn validate(&self) -> Result<()> {
        if self.initial_capacity == 0 {
            return Err(IndexerError::InvalidArenaConfig(
                "initial capacity must be non-zero".to_string(),
            ));
        }
        if self.initial_capacity > self.max_capacity {
            return Err(IndexerError::InvalidArenaConfig(format!(
                "initial capacity {} exceeds max capacity {}",
                self.initial_capacity, self.max_capacity
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub struct Arena {
    buf: Vec<u8>,
    capacity: usize,
    config: ArenaConfig,
}

impl Arena {
    pub fn new(config: ArenaConfig) -> Result<Self> {
        config.validate()?;
        let mut buf = Vec::new();
        buf.try_reserve_exact(config.initial_capacity)
            .map_err(|_| IndexerError::AllocationExhausted {
                requested: config.initial_capacity,
                limit: config.max_capacity,
            })?;
        Ok(Self {
            buf,
            capacity: config.initial_capacity,
            config,
        })
    }

    /// Bump-allocates `size` zeroed bytes and returns their offset.
    pub fn allocate(&mut self, size: usize) -> Result<usize> {
        let offset = self.buf.len();
        let end = offset
            .checked_add(size)
            .ok_or(IndexerError::AllocationExhausted {
                requested: size,
                limit: self.config.max_capacity,
            })?;
        while end > self.capacity {
            self.grow(end)?;
        }
        self.buf.resize(end, 0);
        Ok(offset)
    }

    fn grow(&mut self, needed: usize) -> Result<()> {
        let exhausted = IndexerError::AllocationExhausted {
            requested: needed,
            limit: self.config.max_capacity,
        };
        let next = self.capacity.checked_mul(2).ok_or(exhausted)?;
        if next > self.config.max_capacity {
            return Err(IndexerError::AllocationExhausted {
                requested: needed,
                limit: self.config.max_capacity,
            });
        }
        self.buf
            .try_reserve_exact(next - self.buf.len())
            .map_err(|_| IndexerError::AllocationExhausted {
                requested: needed,
                limit: self.config.max_capacity,
            })?;
        log::debug!("arena grew {} -> {} bytes", self.capacity, next);
        self.capacity = next;
        Ok(())
    }

    pub fn write_u32(&mut self, offset: usize, value: u32) {
        self.write_bytes(offset, &value.to_ne_bytes());
    }

    pub fn write_bytes(&mut self, offset: usize, bytes: &[u8]) {
        self.buf[offset..offset + bytes.len()].copy_from_slice(bytes);
    }

    /// Offset the next allocation will start at.
    pub fn next_offset(&self) -> usize {
        self.buf.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Ends the build phase. The returned bytes can no longer grow or move.
    pub fn freeze(self) -> Box<[u8]> {
        self.buf.into_boxed_slice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(initial: usize, max: usize) -> Arena {
        Arena::new(ArenaConfig {
            initial_capacity: initial,
            max_capacity: max,
        })
        .unwrap()
    }

    #[test]
    fn offsets_increase_monotonically() {
        let mut arena = small(64, 64);
        let a = arena.allocate(4).unwrap();
        let b = arena.allocate(10).unwrap();
        let c = arena.allocate(0).unwrap();
        assert_eq!(a, 0);
        assert_eq!(b, 4);
        assert_eq!(c, 14);
        assert_eq!(arena.next_offset(), 14);
    }

    #[test]
    fn growth_doubles_and_keeps_contents() {
        let mut arena = small(8, 64);
        let first = arena.allocate(4).unwrap();
        arena.write_u32(first, 0xdead_beef);
        let second = arena.allocate(20).unwrap();
        arena.write_bytes(second, b"abc");
        assert_eq!(arena.capacity(), 32);

        let bytes = arena.freeze();
        assert_eq!(&bytes[first..first + 4], &0xdead_beef_u32.to_ne_bytes());
        assert_eq!(&bytes[second..second + 3], b"abc");
    }

    #[test]
    fn growth_past_ceiling_fails() {
        let mut arena = small(8, 16);
        arena.allocate(16).unwrap();
        let err = arena.allocate(1).unwrap_err();
        assert!(matches!(
            err,
            IndexerError::AllocationExhausted {
                requested: 17,
                limit: 16
            }
        ));
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let zero = Arena::new(ArenaConfig {
            initial_capacity: 0,
            max_capacity: 16,
        });
        assert!(matches!(zero, Err(IndexerError::InvalidArenaConfig(_))));

        let inverted = Arena::new(ArenaConfig {
            initial_capacity: 32,
            max_capacity: 16,
        });
        assert!(matches!(inverted, Err(IndexerError::InvalidArenaConfig(_))));
    }

    #[test]
    fn default_config_is_one_to_sixty_four_mib() {
        let config = ArenaConfig::default();
        assert_eq!(config.initial_capacity, MIB);
        assert_eq!(config.max_capacity, 64 * MIB);
        assert_eq!(ArenaConfig::from_mib(2, 8).max_capacity, 8 * MIB);
    }
}
