use std::sync::Arc;

use tubelink_resolver::Resolver;

#[derive(Clone)]
pub struct AppState {
    resolver: Arc<dyn Resolver>,
}

impl AppState {
    pub fn new(resolver: Arc<dyn Resolver>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> &dyn Resolver {
        self.resolver.as_ref()
    }
}
