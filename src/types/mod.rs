pub mod errors;
pub mod ownership;
pub mod report;
pub mod request;
pub mod state;

pub use errors::*;
pub use ownership::*;
pub use report::*;
pub use request::*;
pub use state::*;
