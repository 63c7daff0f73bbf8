pub mod error;
pub mod http;
pub mod matcher;
pub mod mock;
pub mod table;
pub mod transport;

pub use error::TransportError;
pub use http::{HttpRequest, HttpResponse};
pub use matcher::RequestMatcher;
pub use mock::{CapturedRequest, MockTransport, RequestLog};
pub use table::{CannedResponse, ResponseTable, ResponseTableBuilder};
pub use transport::{ReqwestTransport, Transport};

/// Re-exported so downstream crates build requests without a direct reqwest dependency.
pub use reqwest::{header, Method, StatusCode, Url};
