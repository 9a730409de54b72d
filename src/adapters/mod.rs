pub mod device;
pub mod digest;
pub mod ownership;

pub use device::*;
pub use digest::*;
pub use ownership::{AccountDb, SystemAccountDb};
