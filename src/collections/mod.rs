//! Bidirectional mapping collections.
//!
//! Every renaming or merging decision the optimizer takes is recorded in one
//! of these maps: one-to-one for renames, many-to-one for merges. Lenses
//! freeze them once the pass completes and answer both forward ("what is this
//! reference now") and reverse ("what was this reference then") lookups.

mod many_to_one;
mod one_to_one;

pub use many_to_one::BidirectionalManyToOneMap;
pub use one_to_one::{BidirectionalOneToOneMap, ConcurrentOneToOneBuilder};
