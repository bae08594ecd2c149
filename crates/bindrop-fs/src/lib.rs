//! Filesystem primitives used to materialize a drop.
//!
//! Every file this crate creates is created exclusively: an existing file at
//! the destination is reported as [`Error::AlreadyExists`], never overwritten.
//! Directory creation is the opposite: an existing directory counts as success.

mod error;
mod primitives;

pub use error::{Error, Result, from_create};
pub use primitives::{copy_new, create_new, ensure_parent_dir, remove_partial};
