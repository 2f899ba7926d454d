mod health;
mod stream;

pub use health::HealthResponse;
pub use stream::StreamResponse;
