//! Request matching utilities.

mod pattern;

pub use pattern::{strip_query, Pattern, PatternSet};
