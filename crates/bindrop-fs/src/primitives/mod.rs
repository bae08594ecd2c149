mod dir;
mod exclusive;

pub use dir::ensure_parent_dir;
pub use exclusive::{copy_new, create_new, remove_partial};
