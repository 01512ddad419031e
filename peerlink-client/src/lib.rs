mod coordinator;
mod error;
mod media;
mod signaling;
mod transport;

pub use coordinator::*;
pub use error::*;
pub use media::*;
pub use signaling::*;
pub use transport::*;
