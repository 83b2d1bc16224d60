use std::fmt::Display;

use crate::{NodeArray, Representation};

#[derive(Debug, Clone, serde::Serialize)]
pub struct NodeArrayStats {
    pub representation: Representation,
    /// Sparse blocks in use, 0 when dense.
    pub blocks: usize,
    /// Keys holding a non-zero value.
    pub live_entries: usize,
    pub allocated_bytes: usize,
}

impl NodeArrayStats {
    /// Allocated bytes per live entry.
    pub fn bytes_per_entry(&self) -> f64 {
        if self.live_entries == 0 {
            return 0.0;
        }
        self.allocated_bytes as f64 / self.live_entries as f64
    }
}

impl Display for NodeArrayStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "{:?} || blocks: {:8} || live: {:8} || allocated: {:10} bytes ||",
            self.representation, self.blocks, self.live_entries, self.allocated_bytes,
        )?;

        let per_entry = self.bytes_per_entry();
        if self.representation == Representation::Dense && per_entry > 16.0 {
            writeln!(f, "Bytes per entry: {:.2} (mostly empty)", per_entry)?;
        } else {
            writeln!(f, "Bytes per entry: {:.2}", per_entry)?;
        }
        Ok(())
    }
}

impl NodeArray {
    /// Returns occupancy and memory statistics for the array.
    pub fn stats(&self) -> NodeArrayStats {
        NodeArrayStats {
            representation: self.representation(),
            blocks: self.block_count(),
            live_entries: self.iter().count(),
            allocated_bytes: self.allocated_bytes(),
        }
    }
}
