//! HTTP gateway exposing stream resolution as a JSON endpoint.

pub mod app;
pub mod error;
pub mod handlers;
pub mod model;
pub mod state;

pub use app::App;
pub use state::AppState;
