//! Shared, read-only application state.

use std::path::PathBuf;
use std::sync::Arc;

use zeroshot_ai::{ImageCaptioner, SpeechTranscriber, ZeroShotClassifier};
use zeroshot_core::Catalog;

/// Catalog, model adapters and upload directory, cloned into every handler.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<Catalog>,
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub captioner: Arc<dyn ImageCaptioner>,
    pub transcriber: Arc<dyn SpeechTranscriber>,
    /// Where audio uploads are spooled while being transcribed.
    pub upload_dir: PathBuf,
}

impl AppState {
    pub fn new(
        catalog: Catalog,
        classifier: Arc<dyn ZeroShotClassifier>,
        captioner: Arc<dyn ImageCaptioner>,
        transcriber: Arc<dyn SpeechTranscriber>,
        upload_dir: PathBuf,
    ) -> Self {
        Self {
            catalog: Arc::new(catalog),
            classifier,
            captioner,
            transcriber,
            upload_dir,
        }
    }
}
