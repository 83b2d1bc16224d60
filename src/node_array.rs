use std::fmt;

use crate::block::MAX_KEY;
use crate::dense::DenseValues;
use crate::iter::{Blocks, Iter};
use crate::limits::Limits;
use crate::sparse::{SparseBlocks, SparseOrr};

/// Which layout a [`NodeArray`] currently uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "stats", derive(serde::Serialize))]
pub enum Representation {
    /// Sorted 16-key blocks, only covering keys near a non-zero value.
    Sparse,
    /// One byte for every key below `max`.
    Dense,
}

#[derive(Clone)]
enum Repr {
    Sparse(SparseBlocks),
    Dense(DenseValues),
}

/// A map from node indices to one byte of flags, where absent keys read as 0.
///
/// The array starts out sparse and switches to a flat byte buffer once the
/// sparse form would grow past `max_sparse` blocks or past `max` bytes. The
/// switch is permanent and not observable through [`get`](Self::get) or
/// [`iter`](Self::iter).
///
/// The array does not store its limits. Every call takes `max` (and
/// `max_sparse` where it may grow) and callers must pass the same values for
/// the lifetime of the array. Keys must be below `max` and below `1 << 24`.
/// Both contracts are checked with debug assertions only.
///
/// # Examples
///
/// ```
/// use nodearray::NodeArray;
///
/// let max = 1000 * 16;
/// let mut flags = NodeArray::new();
///
/// flags.orr(5, 0x03, u32::MAX, max);
/// flags.orr(5, 0x04, u32::MAX, max);
/// assert_eq!(flags.get(5, max), 0x07);
///
/// flags.bic(5, 0x01, max);
/// assert_eq!(flags.iter().collect::<Vec<_>>(), vec![(5, 0x06)]);
/// ```
#[derive(Clone)]
pub struct NodeArray {
    repr: Repr,
}

impl Default for NodeArray {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeArray {
    /// Creates an empty, sparse array.
    pub fn new() -> Self {
        Self {
            repr: Repr::Sparse(SparseBlocks::new()),
        }
    }

    /// Returns the byte stored for `key`, or 0 if nothing is stored.
    ///
    /// # Examples
    ///
    /// ```
    /// use nodearray::NodeArray;
    ///
    /// let mut a = NodeArray::new();
    /// assert_eq!(a.get(42, 128), 0);
    /// a.orr(42, 0x80, u32::MAX, 128);
    /// assert_eq!(a.get(42, 128), 0x80);
    /// ```
    #[inline]
    pub fn get(&self, key: u32, max: u32) -> u8 {
        debug_assert!(key < max, "key {key} out of range (max {max})");
        match &self.repr {
            Repr::Sparse(sparse) => sparse.get(key),
            Repr::Dense(dense) => dense.get(key),
        }
    }

    /// ORs `value` into the byte at `key`.
    ///
    /// Inserting a new sparse block when the array already holds `max_sparse`
    /// blocks, or when one more block would make the sparse form reach `max`
    /// bytes, converts the array to the dense representation first.
    pub fn orr(&mut self, key: u32, value: u8, max_sparse: u32, max: u32) {
        debug_assert!(key < MAX_KEY, "key {key} does not fit in 24 bits");
        debug_assert!(key < max, "key {key} out of range (max {max})");

        if value == 0 {
            return;
        }

        match &mut self.repr {
            Repr::Dense(dense) => dense.orr(key, value),
            Repr::Sparse(sparse) => match sparse.orr(key, value, max_sparse, max) {
                SparseOrr::Merged | SparseOrr::Inserted => {}
                SparseOrr::Full => self.make_dense(max).orr(key, value),
            },
        }
    }

    /// Clears the bits of `value` from the byte at `key`.
    ///
    /// A sparse block whose last non-zero byte is cleared is dropped. A dense
    /// array stays dense.
    pub fn bic(&mut self, key: u32, value: u8, max: u32) {
        debug_assert!(key < max, "key {key} out of range (max {max})");

        if value == 0 {
            return;
        }

        match &mut self.repr {
            Repr::Sparse(sparse) => sparse.bic(key, value),
            Repr::Dense(dense) => dense.bic(key, value),
        }
    }

    /// ORs every non-zero byte of `src` into `self`, with the same result as
    /// calling [`orr`](Self::orr) once per entry of `src`.
    ///
    /// `src` must be sparse under `max`.
    ///
    /// # Examples
    ///
    /// ```
    /// use nodearray::NodeArray;
    ///
    /// let max = 4096;
    /// let mut live_in = NodeArray::new();
    /// let mut live_out = NodeArray::new();
    /// live_out.orr(7, 0x1, u32::MAX, max);
    /// live_out.orr(900, 0x2, u32::MAX, max);
    ///
    /// live_in.orr(7, 0x4, u32::MAX, max);
    /// live_in.orr_array(&live_out, u32::MAX, max);
    /// assert_eq!(live_in.get(7, max), 0x5);
    /// assert_eq!(live_in.get(900, max), 0x2);
    /// ```
    pub fn orr_array(&mut self, src: &NodeArray, max_sparse: u32, max: u32) {
        debug_assert!(src.is_sparse(max), "orr_array source must be sparse");

        for (block_key, block) in src.blocks() {
            match &mut self.repr {
                Repr::Dense(dense) => dense.orr_block(block_key, block),
                Repr::Sparse(sparse) => match sparse.orr_block(block_key, block, max_sparse, max) {
                    SparseOrr::Merged | SparseOrr::Inserted => {}
                    SparseOrr::Full => self.make_dense(max).orr_block(block_key, block),
                },
            }
        }
    }

    /// Returns `true` while the array uses the sparse block representation.
    #[inline]
    pub fn is_sparse(&self, max: u32) -> bool {
        match &self.repr {
            Repr::Sparse(sparse) => {
                debug_assert!(sparse.is_empty() || sparse.serialized_size() < max as usize);
                true
            }
            Repr::Dense(dense) => {
                debug_assert!(dense.len() >= max as usize);
                false
            }
        }
    }

    #[inline]
    pub fn representation(&self) -> Representation {
        match &self.repr {
            Repr::Sparse(_) => Representation::Sparse,
            Repr::Dense(_) => Representation::Dense,
        }
    }

    /// Number of sparse blocks. Always 0 once the array is dense.
    #[inline]
    pub fn block_count(&self) -> usize {
        match &self.repr {
            Repr::Sparse(sparse) => sparse.block_count(),
            Repr::Dense(_) => 0,
        }
    }

    /// Bytes the current representation takes in its packed form: 20 per
    /// sparse block, or the padded buffer length when dense.
    pub fn serialized_size(&self) -> usize {
        match &self.repr {
            Repr::Sparse(sparse) => sparse.serialized_size(),
            Repr::Dense(dense) => dense.len(),
        }
    }

    /// Returns `true` if no key holds a non-zero value.
    ///
    /// Constant time while sparse; scans the buffer when dense.
    pub fn is_empty(&self) -> bool {
        match &self.repr {
            Repr::Sparse(sparse) => sparse.is_empty(),
            Repr::Dense(dense) => dense.blocks().next().is_none(),
        }
    }

    /// Iterates over the non-zero `(key, value)` pairs in ascending key order.
    ///
    /// # Examples
    ///
    /// ```
    /// use nodearray::NodeArray;
    ///
    /// let mut a = NodeArray::new();
    /// a.orr(300, 1, u32::MAX, 512);
    /// a.orr(2, 9, u32::MAX, 512);
    /// assert_eq!(a.iter().collect::<Vec<_>>(), vec![(2, 9), (300, 1)]);
    /// ```
    pub fn iter(&self) -> Iter<'_> {
        Iter::new(self.blocks())
    }

    /// Iterates over 16-key groups holding at least one non-zero value, for
    /// callers that want to process a whole group at a time.
    pub fn blocks(&self) -> Blocks<'_> {
        match &self.repr {
            Repr::Sparse(sparse) => Blocks::sparse(sparse.blocks()),
            Repr::Dense(dense) => Blocks::dense(dense.blocks()),
        }
    }

    /// Converts to the dense representation (if not already dense) and
    /// returns the dense buffer.
    fn make_dense(&mut self, max: u32) -> &mut DenseValues {
        if let Repr::Sparse(sparse) = &self.repr {
            let dense = DenseValues::from_sparse(sparse, max);
            self.repr = Repr::Dense(dense);
        }
        match &mut self.repr {
            Repr::Dense(dense) => dense,
            Repr::Sparse(_) => unreachable!("node array was just made dense"),
        }
    }

    /// Heap bytes currently reserved by the array.
    pub fn allocated_bytes(&self) -> usize {
        match &self.repr {
            Repr::Sparse(sparse) => sparse.allocated_bytes(),
            Repr::Dense(dense) => dense.len(),
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        if let Repr::Sparse(sparse) = &self.repr {
            sparse.check_invariants();
        }
    }
}

/// Forwarding helpers for callers that keep their limits in a [`Limits`].
impl NodeArray {
    #[inline]
    pub fn get_in(&self, key: u32, limits: &Limits) -> u8 {
        self.get(key, limits.max())
    }

    #[inline]
    pub fn orr_in(&mut self, key: u32, value: u8, limits: &Limits) {
        self.orr(key, value, limits.max_sparse(), limits.max())
    }

    #[inline]
    pub fn bic_in(&mut self, key: u32, value: u8, limits: &Limits) {
        self.bic(key, value, limits.max())
    }

    #[inline]
    pub fn orr_array_in(&mut self, src: &NodeArray, limits: &Limits) {
        self.orr_array(src, limits.max_sparse(), limits.max())
    }

    #[inline]
    pub fn is_sparse_in(&self, limits: &Limits) -> bool {
        self.is_sparse(limits.max())
    }
}

impl<'a> IntoIterator for &'a NodeArray {
    type Item = (u32, u8);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Debug for NodeArray {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeArray::{:?}", self.representation())?;
        f.debug_map().entries(self.iter()).finish()
    }
}
