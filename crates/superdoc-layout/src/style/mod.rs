//! Style cascade and resolution (spec §4.A, §4.B).
//!
//! [`cascade`] implements the generic property-chain merge primitives;
//! [`context`] defines the OOXML-equivalent typed property bags and the
//! immutable per-document [`context::StyleContext`]; [`resolver`] builds
//! and folds the paragraph/run property chains on top of both.

pub mod cascade;
pub mod context;
pub mod resolver;

pub use cascade::{combine_properties, Combine};
pub use context::StyleContext;
