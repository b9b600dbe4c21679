pub mod credentials;
pub mod response;

pub use credentials::HeaderCredential;
pub use response::{ApiResponse, ApiResult};
