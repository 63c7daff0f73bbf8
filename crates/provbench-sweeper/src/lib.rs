pub mod error;
pub mod registry;
pub mod report;
pub mod service_attachment;
pub mod sweeper;

pub use error::SweepError;
pub use registry::SweeperRegistry;
pub use report::{SweepReport, SweeperResult};
pub use service_attachment::{is_deletable_service_attachment, ComputeServiceAttachmentSweeper};
pub use sweeper::{ConfigSource, Sweep};
