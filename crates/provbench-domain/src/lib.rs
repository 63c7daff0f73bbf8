pub mod error;
pub mod naming;
pub mod types;


pub use error::DomainError;
pub use naming::{is_sweepable_test_resource, TEST_RESOURCE_PREFIXES};
pub use types::ResourceData;
