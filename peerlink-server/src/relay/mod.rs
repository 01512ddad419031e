mod registry;
mod relay;
mod relay_stats;

pub use registry::*;
pub use relay::*;
pub use relay_stats::*;
