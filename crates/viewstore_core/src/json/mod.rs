//! JSON conversion helpers shared by typed document codecs.

pub mod dates;
