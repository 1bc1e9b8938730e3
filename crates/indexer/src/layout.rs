//! Packed index byte layout.
//!
//! ```text
//! DirectoryGroup := dir_len:u32 dirname:bytes[dir_len] FileEntry* 0u32
//! FileEntry      := name_len:u32 filename:bytes[name_len]
//! Index          := DirectoryGroup*
//! ```
//!
//! Lengths are host-endian and count the trailing NUL terminator, so a zero
//! length can only be the group terminator.

use crate::arena::Arena;
use crate::error::{IndexerError, Result};

pub const LEN_SIZE: usize = std::mem::size_of::<u32>();
pub const GROUP_TERMINATOR: u32 = 0;

/// Appends one length-prefixed, NUL-terminated string.
pub(crate) fn write_record(arena: &mut Arena, value: &[u8]) -> Result<()> {
    let stored_len = value.len() + 1;
    let len = u32::try_from(stored_len).map_err(|_| IndexerError::AllocationExhausted {
        requested: stored_len,
        limit: u32::MAX as usize,
    })?;
    let offset = arena.allocate(LEN_SIZE + stored_len)?;
    arena.write_u32(offset, len);
    arena.write_bytes(offset + LEN_SIZE, value);
    // the trailing byte is already zero
    Ok(())
}

pub(crate) fn write_terminator(arena: &mut Arena) -> Result<()> {
    let offset = arena.allocate(LEN_SIZE)?;
    arena.write_u32(offset, GROUP_TERMINATOR);
    Ok(())
}

/// Forward cursor over a packed region. Malformed input ends the read
/// instead of panicking.
#[derive(Debug, Clone)]
pub(crate) struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    /// Bytes in `[start, end)` of the underlying region.
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a [u8] {
        &self.bytes[start..end]
    }

    pub(crate) fn read_len(&mut self) -> Option<u32> {
        let raw = self.bytes.get(self.pos..self.pos + LEN_SIZE)?;
        self.pos += LEN_SIZE;
        raw.try_into().ok().map(u32::from_ne_bytes)
    }

    /// Reads `len` stored bytes and returns them without the terminator.
    pub(crate) fn read_str(&mut self, len: u32) -> Option<&'a [u8]> {
        let len = len as usize;
        if len == 0 {
            return None;
        }
        let raw = self.bytes.get(self.pos..self.pos + len)?;
        self.pos += len;
        Some(&raw[..len - 1])
    }
}
