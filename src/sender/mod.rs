//! Mass sending pipeline
//!
//! Loader → shuffle/partition → concurrent dispatch workers → per-cycle
//! aggregation, all driven by the [`orchestrator::Orchestrator`].

pub mod batch;
pub mod client;
pub mod delay;
pub mod input;
pub mod orchestrator;
pub mod report;
pub mod stats;
pub mod worker;

pub use batch::{partition, shuffled, Batch};
pub use client::{ChatClient, DryRunClient, SendOutcome};
pub use delay::DelayPolicy;
pub use input::{load_groups, load_messages, normalize_identifier, GroupTarget, MessageCandidate};
pub use orchestrator::{Orchestrator, RunConfig};
pub use report::{Event, MemoryReporter, NullReporter, Reporter, TracingReporter};
pub use stats::{CycleCount, CycleStats, RunStats, MAX_WORKERS, UNBOUNDED_SENTINEL};
