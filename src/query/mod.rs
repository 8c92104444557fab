mod error;
pub(crate) mod pest;
mod selector_try_from;
mod traversal;

pub use error::*;

pub(crate) use self::pest::{Error, Pair, Pairs, Query};
