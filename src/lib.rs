#![doc = include_str!("../README.md")]
#![cfg_attr(doc_cfg, feature(doc_cfg))]

mod block;
mod dense;
mod error;
mod iter;
mod limits;
mod node_array;
mod sparse;

#[cfg(feature = "stats")]
mod stats;

#[cfg(test)]
mod tests;

pub use block::{Block, BLOCK_BYTES, BLOCK_WIDTH, MAX_KEY};
pub use error::{KeyOutOfRange, LimitsError};
pub use iter::{Blocks, Iter};
pub use limits::Limits;
pub use node_array::{NodeArray, Representation};

#[cfg(feature = "stats")]
#[cfg_attr(doc_cfg, doc(cfg(feature = "stats")))]
pub use stats::NodeArrayStats;
