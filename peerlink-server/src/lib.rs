mod config;
mod error;
mod relay;
mod signaling;

pub use config::*;
pub use error::*;
pub use relay::*;
pub use signaling::*;
