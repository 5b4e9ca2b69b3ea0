//! Writing rendered frames to disk

mod sequence;
mod sink;

pub use sequence::*;
pub use sink::*;
