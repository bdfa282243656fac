pub mod command;
pub mod fs_ops;
pub mod manifest;

// Trait-based abstractions for testability
pub mod archive_ops;
pub mod executor;
pub mod reporter;

// Re-export commonly used types and traits (used by test crate)
pub use archive_ops::{ArchiveError, ArchiveOperations, RealArchiveOps};
pub use executor::{CommandExecutor, RealExecutor};
pub use reporter::{Reporter, RunEvent, TracingReporter};
