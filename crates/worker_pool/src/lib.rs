//! Worker pool - stateless compute units pulling from the fan-out channel.
//!
//! Workers are anonymous and interchangeable: no per-worker state, no
//! explicit assignment. The fabric's MPMC channels do the load balancing.

mod metrics;
mod pool;
pub mod transforms;
mod worker;

pub use metrics::{WorkerMetrics, WorkerSnapshot};
pub use pool::{WorkerPool, WorkerPoolConfig};
pub use worker::run_worker;
