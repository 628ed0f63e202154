use tracing::debug;

use crate::store::mem::MemoryBackend;
use crate::store::{ModelBackend, ModelDefinition};

/// Decides which backend instance serves a model.
pub trait ModelFactory {
    fn backend_for(&self, model: &ModelDefinition) -> Box<dyn ModelBackend + Send>;
}

/// Hands every model a fresh [`MemoryBackend`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultModelFactory;

impl ModelFactory for DefaultModelFactory {
    fn backend_for(&self, model: &ModelDefinition) -> Box<dyn ModelBackend + Send> {
        let backend = MemoryBackend::new();
        debug!(
            model = %model,
            connection = backend.connection_string(),
            "resolved memory backend"
        );
        Box::new(backend)
    }
}

pub fn create_factory() -> DefaultModelFactory {
    DefaultModelFactory
}
