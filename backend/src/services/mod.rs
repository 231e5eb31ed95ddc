//! Services for the olive grove records

pub mod batch;
pub mod batch_log;
pub mod grid;
pub mod log_book;
pub mod registry;
pub mod tree;
pub mod tree_log;

pub use batch::BatchService;
pub use batch_log::BatchLogService;
pub use grid::GridSource;
pub use log_book::{LogBook, LogWriteError};
pub use registry::{RegistryStatus, SeedOutcome, TreeRegistry};
pub use tree::TreeService;
pub use tree_log::TreeLogService;
