//! Reference detection and rewriting.
//!
//! Asset content refers to other platform objects through scripting calls
//! such as `ContentBlockByName("Folder\Header")` or `Lookup("Orders", ...)`.
//! This module holds the three pieces that find and replace those arguments:
//!
//! - [`catalog`] - the fixed table of recognized functions and their patterns
//! - [`extractor`] - finds every call of a function in a content string
//! - [`rewriter`] - swaps a found argument for a package-local id
//!
//! Resolving what an argument points at lives in [`crate::resolver`].

pub mod catalog;
pub mod extractor;
pub mod rewriter;

pub use catalog::{ReferenceCatalog, ReferenceClass, ReferenceFunction};
pub use extractor::{RawMatch, extract, extract_all};
pub use rewriter::ContentRewriter;
