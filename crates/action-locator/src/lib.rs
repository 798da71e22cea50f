//! Locator engine - strategy-based element resolution over UI snapshots
//!
//! This crate maps a (strategy, selector, scope) request to UI-tree nodes:
//! - Strategy registry with per-platform capability rules
//! - Single and plural resolution, optionally scoped to an element
//! - XPath subset evaluation
//! - Scroll-assisted search with a bounded retry loop
//! - Classification of failures into wire status codes

pub mod classify;
pub mod errors;
pub mod resolver;
pub mod scroll;
pub mod strategies;
pub mod types;
pub mod xpath;

pub use classify::*;
pub use errors::*;
pub use resolver::*;
pub use scroll::*;
pub use strategies::*;
pub use types::*;
pub use xpath::{XPath, XPathError};
