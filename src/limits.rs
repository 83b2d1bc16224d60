use crate::block::MAX_KEY;
use crate::error::{KeyOutOfRange, LimitsError};

/// The two sizing parameters every [`NodeArray`](crate::NodeArray) operation
/// needs, validated once.
///
/// A `NodeArray` does not remember its limits; the same values have to be
/// used for its whole lifetime. Keeping them in one `Limits` value next to the
/// arrays it governs makes that easy.
///
/// # Examples
///
/// ```
/// use nodearray::{Limits, NodeArray};
///
/// let limits = Limits::new(8, 1024).unwrap();
/// let mut live = NodeArray::new();
/// live.orr_in(100, 0b11, &limits);
/// assert_eq!(live.get_in(100, &limits), 0b11);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_sparse: u32,
    max: u32,
}

impl Limits {
    /// `max_sparse` caps the number of sparse blocks; `max` is the size of the
    /// key space. `max_sparse == 0` is accepted and makes the first insertion
    /// go dense.
    pub fn new(max_sparse: u32, max: u32) -> Result<Self, LimitsError> {
        if max == 0 {
            return Err(LimitsError::ZeroMax);
        }
        if max > MAX_KEY {
            return Err(LimitsError::MaxTooLarge(max));
        }
        Ok(Self { max_sparse, max })
    }

    /// Limits where only the serialized size bounds the sparse representation.
    pub fn unbounded_sparse(max: u32) -> Result<Self, LimitsError> {
        Self::new(u32::MAX, max)
    }

    #[inline]
    pub fn max_sparse(&self) -> u32 {
        self.max_sparse
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Checked form of the `key < max` contract.
    pub fn check_key(&self, key: u32) -> Result<(), KeyOutOfRange> {
        if key < self.max {
            Ok(())
        } else {
            Err(KeyOutOfRange { key, max: self.max })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_bad_max() {
        assert_eq!(Limits::new(4, 0), Err(LimitsError::ZeroMax));
        assert_eq!(
            Limits::new(4, MAX_KEY + 1),
            Err(LimitsError::MaxTooLarge(MAX_KEY + 1))
        );
        assert!(Limits::new(0, MAX_KEY).is_ok());
    }

    #[test]
    fn check_key() {
        let limits = Limits::unbounded_sparse(100).unwrap();
        assert_eq!(limits.max_sparse(), u32::MAX);
        assert!(limits.check_key(99).is_ok());
        let err = limits.check_key(100).unwrap_err();
        assert_eq!(err, KeyOutOfRange { key: 100, max: 100 });
        assert_eq!(err.to_string(), "key 100 is out of range (max 100)");
    }
}
