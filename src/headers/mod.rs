//! HTTP header collection.
mod set;
mod split;

pub use set::{HeaderSet, Iter, Values};
pub use split::{is_nosplit, split_value, trim};
