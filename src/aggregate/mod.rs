mod classifier;
mod stats;

pub use classifier::Publisher;
pub use stats::{Aggregation, Aggregator, PublisherShare};
