pub mod api_client;
pub mod auth_service;
pub mod budget_service;
pub mod transport;

pub use api_client::ApiClient;
pub use transport::{HttpRequest, HttpResponse, HttpTransport, Method};
#[cfg(target_arch = "wasm32")]
pub use transport::GlooTransport;
