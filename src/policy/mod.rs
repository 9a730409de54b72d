//! Writer configuration.
//!
//! Submodules:
//! - `config`: the `Policy` struct and presets
//! - `types`: grouped knobs (`Durability`, `Staging`)

pub mod config;
pub mod types;

pub use config::Policy;
