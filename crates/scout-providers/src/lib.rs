pub mod job;
pub mod reddit;
pub mod serp;

pub use job::{JobOutcome, JobPhase, PollPolicy, SnapshotApi, SnapshotJob, SnapshotStatus};
pub use reddit::BrightDataReddit;
pub use serp::BrightDataSerp;
