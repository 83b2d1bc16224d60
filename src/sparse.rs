use std::mem::size_of;

use tracing::trace;

use crate::block::{block_key_of, block_offset, count_live, Block, BlockHeader, BLOCK_BYTES, BLOCK_WIDTH};

/// Outcome of merging into the sparse store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SparseOrr {
    /// The owning block already existed.
    Merged,
    /// A new block was inserted at its sorted position.
    Inserted,
    /// A new block was needed but the limits leave no room; the caller has to
    /// switch to the dense representation.
    Full,
}

/// Sorted list of 16-key blocks.
///
/// Headers and payloads live in two vectors that are always the same length
/// and are indexed together: `headers[i]` describes `payloads[i]`. Lookups only
/// touch the (small) header vector until the owning block is known.
#[derive(Debug, Clone, Default)]
pub(crate) struct SparseBlocks {
    headers: Vec<BlockHeader>,
    payloads: Vec<Block>,
}

impl SparseBlocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn block_count(&self) -> usize {
        debug_assert_eq!(self.headers.len(), self.payloads.len());
        self.headers.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.headers.is_empty()
    }

    /// Size the blocks would take in the packed header-then-payload layout.
    #[inline]
    pub(crate) fn serialized_size(&self) -> usize {
        self.block_count() * BLOCK_BYTES
    }

    pub(crate) fn allocated_bytes(&self) -> usize {
        self.headers.capacity() * size_of::<BlockHeader>()
            + self.payloads.capacity() * size_of::<Block>()
    }

    /// Finds the block owning `key`.
    ///
    /// Returns `Ok(idx)` if `headers[idx]` covers `key`, otherwise `Err(idx)`
    /// where `idx` is the position a new block for `key` has to be inserted at
    /// to keep the headers sorted. `Err(block_count())` means `key` lies past
    /// every existing block.
    #[inline]
    pub(crate) fn search(&self, key: u32) -> Result<usize, usize> {
        let target = block_key_of(key);
        self.headers
            .binary_search_by_key(&target, |header| header.block_key)
    }

    pub(crate) fn get(&self, key: u32) -> u8 {
        if self.is_empty() {
            return 0;
        }
        match self.search(key) {
            Ok(idx) => {
                debug_assert!(self.headers[idx].contains(key));
                self.payloads[idx][block_offset(key)]
            }
            Err(_) => 0,
        }
    }

    #[inline]
    fn has_room(&self, max_sparse: u32, max: u32) -> bool {
        let count = self.block_count() as u64;
        count < max_sparse as u64 && (count + 1) * (BLOCK_BYTES as u64) < max as u64
    }

    pub(crate) fn orr(&mut self, key: u32, value: u8, max_sparse: u32, max: u32) -> SparseOrr {
        debug_assert_ne!(value, 0);

        match self.search(key) {
            Ok(idx) => {
                let slot = &mut self.payloads[idx][block_offset(key)];
                if *slot == 0 {
                    self.headers[idx].live_count += 1;
                }
                *slot |= value;
                SparseOrr::Merged
            }
            Err(idx) => {
                if !self.has_room(max_sparse, max) {
                    return SparseOrr::Full;
                }
                let mut payload: Block = [0; BLOCK_WIDTH];
                payload[block_offset(key)] = value;
                self.insert_block(idx, BlockHeader::for_key(key), payload);
                SparseOrr::Inserted
            }
        }
    }

    /// Merges a whole 16-key group. `block` must hold at least one non-zero
    /// byte and `block_key` must be block aligned.
    pub(crate) fn orr_block(
        &mut self,
        block_key: u32,
        block: &Block,
        max_sparse: u32,
        max: u32,
    ) -> SparseOrr {
        debug_assert_eq!(block_key_of(block_key), block_key);

        match self.search(block_key) {
            Ok(idx) => {
                let payload = &mut self.payloads[idx];
                for (dst, src) in payload.iter_mut().zip(block.iter()) {
                    *dst |= *src;
                }
                self.headers[idx].live_count = count_live(payload);
                SparseOrr::Merged
            }
            Err(idx) => {
                if !self.has_room(max_sparse, max) {
                    return SparseOrr::Full;
                }
                let live_count = count_live(block);
                debug_assert!(live_count > 0);
                let header = BlockHeader {
                    block_key,
                    live_count,
                };
                self.insert_block(idx, header, *block);
                SparseOrr::Inserted
            }
        }
    }

    pub(crate) fn bic(&mut self, key: u32, value: u8) {
        let Ok(idx) = self.search(key) else {
            return;
        };

        let slot = &mut self.payloads[idx][block_offset(key)];
        if *slot == 0 {
            return;
        }
        *slot &= !value;
        if *slot != 0 {
            return;
        }

        let header = &mut self.headers[idx];
        header.live_count -= 1;
        if header.live_count == 0 {
            self.remove_block(idx);
        }
    }

    fn insert_block(&mut self, idx: usize, header: BlockHeader, payload: Block) {
        trace!(block_key = header.block_key, idx, "insert sparse block");
        self.headers.insert(idx, header);
        self.payloads.insert(idx, payload);
    }

    fn remove_block(&mut self, idx: usize) {
        let header = self.headers.remove(idx);
        self.payloads.remove(idx);
        trace!(block_key = header.block_key, idx, "remove empty sparse block");
    }

    /// Blocks in ascending key order.
    pub(crate) fn blocks(&self) -> SparseBlockIter<'_> {
        SparseBlockIter {
            headers: self.headers.iter(),
            payloads: self.payloads.iter(),
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert_eq!(self.headers.len(), self.payloads.len());
        for pair in self.headers.windows(2) {
            assert!(
                pair[0].block_key < pair[1].block_key,
                "blocks must be strictly increasing: {} then {}",
                pair[0].block_key,
                pair[1].block_key
            );
        }
        for (header, payload) in self.headers.iter().zip(self.payloads.iter()) {
            assert_eq!(header.block_key % BLOCK_WIDTH as u32, 0);
            assert!(header.live_count > 0, "empty block {} kept", header.block_key);
            assert_eq!(header.live_count, count_live(payload));
        }
    }
}

pub(crate) struct SparseBlockIter<'a> {
    headers: std::slice::Iter<'a, BlockHeader>,
    payloads: std::slice::Iter<'a, Block>,
}

impl<'a> Iterator for SparseBlockIter<'a> {
    type Item = (u32, &'a Block);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let header = self.headers.next()?;
        let payload = self.payloads.next()?;
        Some((header.block_key, payload))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.headers.size_hint()
    }
}
