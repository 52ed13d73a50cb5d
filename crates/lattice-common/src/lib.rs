//! Shared leaf types for the Lattice compiler.
//!
//! Every phase that positions itself against source text depends on this
//! crate: spans are byte offsets into the original source, and line/column
//! pairs are computed on demand via [`LineIndex`] at the reporting boundary.

pub mod span;

pub use span::{LineIndex, Span};
