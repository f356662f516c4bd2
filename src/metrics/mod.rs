//! Value model behind the gauges: snapshot parsing, unit scaling,
//! peak normalization and animation.

pub mod channel;
pub mod gauge;
pub mod schema;
pub mod throughput;
pub mod units;

pub use channel::{ChannelDescriptor, MetricChannel};
pub use schema::Snapshot;
