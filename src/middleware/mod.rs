pub mod api_version;
pub mod auth;
pub mod error_handler;
pub mod request_id;

pub use api_version::{unsupported_api_version, ReportApiVersions, SUPPORTED_API_VERSIONS};
pub use auth::{Claims, JwtAuth, JwtValidator};
pub use error_handler::{json_error_handler, path_error_handler, query_error_handler, ErrorHandler};
pub use request_id::{RequestId, RequestIdentifier};
