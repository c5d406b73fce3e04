//! API endpoint modules.

pub mod health;
pub mod notifications;
pub mod openapi;
pub mod test_cases;
pub mod websocket;

pub use health::configure_health_routes;
pub use notifications::configure_routes as configure_notification_routes;
pub use openapi::ApiDoc;
pub use test_cases::configure_routes as configure_test_case_routes;
pub use websocket::configure_routes as configure_websocket_routes;
