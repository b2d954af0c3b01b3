//! docsync: keep Javadoc comments in JSON sidecars next to a Java source tree.
//!
//! `extract` records the javadoc of every class, member and anonymous body
//! under a stable identity key; `apply` writes it back into a structurally
//! equivalent tree, which may have been regenerated or reformatted;
//! `strip` removes javadoc so that such a tree can be produced.

pub mod apply;
pub mod config;
pub mod descriptor;
pub mod error;
pub mod extract;
pub mod identity;
pub mod model;
pub mod resolve;
pub mod strip;
pub mod syntax;
pub mod walker;
pub mod workspace;

pub use error::{Error, Result};
