/// Number of consecutive keys covered by one sparse block.
pub const BLOCK_WIDTH: usize = 16;

/// Serialized footprint of one sparse block: a 4-byte header word followed by
/// the 16-byte payload. The representation selector compares multiples of
/// this against `max`.
pub const BLOCK_BYTES: usize = 4 + BLOCK_WIDTH;

/// Keys must fit in the 24 bits the header word reserves for them.
pub const MAX_KEY: u32 = 1 << 24;

const BLOCK_MASK: u32 = BLOCK_WIDTH as u32 - 1;

/// The 16 values of a block, indexed by `key - block_key`.
pub type Block = [u8; BLOCK_WIDTH];

#[inline]
pub(crate) fn block_key_of(key: u32) -> u32 {
    key & !BLOCK_MASK
}

#[inline]
pub(crate) fn block_offset(key: u32) -> usize {
    (key & BLOCK_MASK) as usize
}

/// Rounds `max` up to a whole number of blocks.
#[inline]
pub(crate) fn align_up(max: u32) -> usize {
    (max as usize + BLOCK_WIDTH - 1) & !(BLOCK_WIDTH - 1)
}

#[inline]
pub(crate) fn count_live(block: &Block) -> u8 {
    block.iter().filter(|v| **v != 0).count() as u8
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct BlockHeader {
    pub(crate) block_key: u32,
    /// Non-zero bytes in the matching payload. Never zero for a stored block.
    pub(crate) live_count: u8,
}

impl BlockHeader {
    /// Header for a freshly inserted block holding exactly one value.
    pub(crate) fn for_key(key: u32) -> Self {
        debug_assert!(key < MAX_KEY);
        Self {
            block_key: block_key_of(key),
            live_count: 1,
        }
    }

    #[inline]
    pub(crate) fn contains(&self, key: u32) -> bool {
        key.wrapping_sub(self.block_key) < BLOCK_WIDTH as u32
    }
}
