//! Diff reversal, shadow trees, and linear chain merge.
//!
//! Works over [`json_tree_diff`] records: [`reverse_diff`] produces the
//! record that exactly undoes another without touching the original data,
//! [`ShadowTree`] is a lazily-built placeholder tree that records can be
//! replayed onto, and [`merge`] folds an ordered chain of records into the
//! single record covering the whole span.

pub mod merge;
pub mod reverse;
pub mod shadow;
pub mod swap;

pub use merge::{merge, MergeError};
pub use reverse::{reverse_diff, ReverseError};
pub use shadow::{ShadowChild, ShadowError, ShadowKey, ShadowNode, ShadowTree};
pub use swap::{swap_keys, SwapError};
