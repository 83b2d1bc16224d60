use tracing::debug;

use crate::block::{align_up, Block, BLOCK_WIDTH};
use crate::sparse::SparseBlocks;

/// One byte per key, padded up to a whole number of blocks so that 16-wide
/// groups can always be read and merged without bounds juggling.
#[derive(Clone)]
pub(crate) struct DenseValues {
    values: Box<[u8]>,
}

impl DenseValues {
    /// Expands `sparse` into a zero-filled buffer covering `0..max`.
    pub(crate) fn from_sparse(sparse: &SparseBlocks, max: u32) -> Self {
        let len = align_up(max);
        debug!(
            blocks = sparse.block_count(),
            max,
            len,
            "migrating node array to dense"
        );

        let mut values = vec![0u8; len].into_boxed_slice();
        for (block_key, block) in sparse.blocks() {
            let start = block_key as usize;
            debug_assert!(start < len, "block {block_key} lies outside max {max}");
            values[start..start + BLOCK_WIDTH].copy_from_slice(block);
        }
        Self { values }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub(crate) fn get(&self, key: u32) -> u8 {
        self.values[key as usize]
    }

    #[inline]
    pub(crate) fn orr(&mut self, key: u32, value: u8) {
        self.values[key as usize] |= value;
    }

    #[inline]
    pub(crate) fn bic(&mut self, key: u32, value: u8) {
        self.values[key as usize] &= !value;
    }

    pub(crate) fn orr_block(&mut self, block_key: u32, block: &Block) {
        let start = block_key as usize;
        let dst = &mut self.values[start..start + BLOCK_WIDTH];
        for (dst, src) in dst.iter_mut().zip(block.iter()) {
            *dst |= *src;
        }
    }

    /// Every 16-key group that holds at least one non-zero byte, with the key
    /// of its first slot.
    pub(crate) fn blocks(&self) -> DenseBlockIter<'_> {
        DenseBlockIter {
            chunks: self.values.chunks_exact(BLOCK_WIDTH),
            next_key: 0,
        }
    }
}

pub(crate) struct DenseBlockIter<'a> {
    chunks: std::slice::ChunksExact<'a, u8>,
    next_key: u32,
}

impl<'a> Iterator for DenseBlockIter<'a> {
    type Item = (u32, &'a Block);

    fn next(&mut self) -> Option<Self::Item> {
        for chunk in self.chunks.by_ref() {
            let block_key = self.next_key;
            self.next_key = self.next_key.wrapping_add(BLOCK_WIDTH as u32);

            let block: &Block = chunk.try_into().ok()?;
            if u128::from_ne_bytes(*block) != 0 {
                return Some((block_key, block));
            }
        }
        None
    }
}
