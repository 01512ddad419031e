pub mod signal_helpers;

pub use mock_channel::*;
pub use signal_helpers::*;
pub use test_client::*;
