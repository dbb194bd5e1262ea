//! Distributor - drains the ingress slot and fans frames out to the worker pool.

mod distributor;
mod metrics;

pub use distributor::{Distributor, DistributorConfig};
pub use metrics::{DistributorMetrics, DistributorSnapshot};
