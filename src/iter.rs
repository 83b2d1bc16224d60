use crate::block::{Block, BLOCK_WIDTH};
use crate::dense::DenseBlockIter;
use crate::sparse::SparseBlockIter;

/// Iterator over 16-key groups that hold at least one non-zero value, in
/// ascending key order. Yields `(base_key, values)` where `values[i]` belongs
/// to `base_key + i`; individual bytes in a group may still be zero.
///
/// Created by [`NodeArray::blocks`](crate::NodeArray::blocks).
pub struct Blocks<'a> {
    inner: BlocksInner<'a>,
}

enum BlocksInner<'a> {
    Sparse(SparseBlockIter<'a>),
    Dense(DenseBlockIter<'a>),
}

impl<'a> Blocks<'a> {
    pub(crate) fn sparse(iter: SparseBlockIter<'a>) -> Self {
        Self {
            inner: BlocksInner::Sparse(iter),
        }
    }

    pub(crate) fn dense(iter: DenseBlockIter<'a>) -> Self {
        Self {
            inner: BlocksInner::Dense(iter),
        }
    }
}

impl<'a> Iterator for Blocks<'a> {
    type Item = (u32, &'a Block);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            BlocksInner::Sparse(iter) => iter.next(),
            BlocksInner::Dense(iter) => iter.next(),
        }
    }
}

/// Iterator over the non-zero `(key, value)` pairs of a
/// [`NodeArray`](crate::NodeArray), in ascending key order.
///
/// Created by [`NodeArray::iter`](crate::NodeArray::iter).
pub struct Iter<'a> {
    blocks: Blocks<'a>,
    current: Option<(u32, &'a Block)>,
    offset: usize,
}

impl<'a> Iter<'a> {
    pub(crate) fn new(blocks: Blocks<'a>) -> Self {
        Self {
            blocks,
            current: None,
            offset: 0,
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = (u32, u8);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((block_key, block)) = self.current {
                while self.offset < BLOCK_WIDTH {
                    let offset = self.offset;
                    self.offset += 1;
                    let value = block[offset];
                    if value != 0 {
                        return Some((block_key + offset as u32, value));
                    }
                }
            }
            self.current = Some(self.blocks.next()?);
            self.offset = 0;
        }
    }
}
