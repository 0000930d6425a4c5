//! Recognition/export backend contract.

use inkstone_core::{Exports, Model};
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Backend failures. Opaque to the editor, which only forwards them.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("Export failed: {0}")]
    Export(String),
    #[error("Conversion failed: {0}")]
    Convert(String),
    #[error("Backend unavailable: {0}")]
    Unavailable(String),
}

/// Result type for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// Trait for recognition backends.
///
/// Implementations may talk to a remote service. The returned future must not borrow the
/// model: copy what is needed before the first await point.
pub trait RecognitionBackend {
    /// Produce exports for the scene. An empty `mime_types` asks for the default set.
    fn export(&self, model: &Model, mime_types: &[String]) -> BoxFuture<'_, BackendResult<Exports>>;

    /// Produce converted (typeset) output for the scene.
    fn convert(&self, model: &Model) -> BoxFuture<'_, BackendResult<Exports>>;
}

/// Backend for sessions without recognition: hands back what the model already holds.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalBackend;

impl LocalBackend {
    pub fn new() -> Self {
        Self
    }
}

impl RecognitionBackend for LocalBackend {
    fn export(
        &self,
        model: &Model,
        mime_types: &[String],
    ) -> BoxFuture<'_, BackendResult<Exports>> {
        let mut exports = model.exports.clone().unwrap_or_default();
        if !mime_types.is_empty() {
            exports.retain(|mime, _| mime_types.iter().any(|wanted| wanted == mime));
        }
        Box::pin(async move { Ok(exports) })
    }

    fn convert(&self, model: &Model) -> BoxFuture<'_, BackendResult<Exports>> {
        let converts = model
            .converts
            .clone()
            .or_else(|| model.exports.clone())
            .unwrap_or_default();
        Box::pin(async move { Ok(converts) })
    }
}
