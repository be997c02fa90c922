pub mod context;
pub mod ops_bundle;
pub mod ops_publish;
pub mod ops_release;
pub mod ops_snapshot;
pub mod ops_status;
pub mod outcome;
pub mod session;

pub use context::ProjectContext;
pub use outcome::PublishOutcome;
