pub mod events;
pub mod format;
pub mod metrics;

pub use metrics::init_prometheus;
