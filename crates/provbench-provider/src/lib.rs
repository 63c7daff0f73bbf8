pub mod client;
pub mod compute;
pub mod container;
pub mod error;
pub mod registry;
pub mod resource;
pub mod sql;

pub use client::ApiClient;
pub use compute::{ComputeClient, ServiceAttachment};
pub use container::ContainerCluster;
pub use error::{ApiError, ResourceError};
pub use registry::ResourceRegistry;
pub use resource::Resource;
pub use sql::SqlDatabaseInstance;

/// Header naming the project that quota and billing are charged to.
pub const USER_PROJECT_HEADER: &str = "x-goog-user-project";
