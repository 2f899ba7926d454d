mod health;
mod stream;

pub use health::health_handler;
pub use stream::stream_handler;
