pub mod atomic;
pub mod dirs;
pub mod meta;
pub mod temp;

pub use atomic::{fsync_parent_dir, open_dir, rename_into_place};
pub use dirs::{ensure_dir, resolve, ResolvedDirs};
pub use meta::{digest_of, set_mode};
pub use temp::{create_staged, parse_template, Template};
