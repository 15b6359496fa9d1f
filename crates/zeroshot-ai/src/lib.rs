//! Model adapters: zero-shot classification, image captioning and speech
//! transcription behind small traits, with ONNX Runtime implementations.
//!
//! The traits are always available so callers can plug in their own
//! backends; the ONNX implementations need the `onnx` feature and model
//! fetching from the Hugging Face hub needs the `hub` feature.

use std::path::Path;

pub use zeroshot_core::Ranking;

#[cfg(feature = "onnx")]
pub mod audio;
#[cfg(feature = "onnx")]
mod captioner;
#[cfg(feature = "onnx")]
mod classifier;
#[cfg(feature = "onnx")]
mod transcriber;
#[cfg(feature = "onnx")]
mod util;

#[cfg(feature = "onnx")]
pub use captioner::BlipCaptioner;
#[cfg(feature = "onnx")]
pub use classifier::{DEFAULT_HYPOTHESIS_TEMPLATE, NliClassifier};
#[cfg(feature = "onnx")]
pub use transcriber::{DEFAULT_LANGUAGE, WhisperTranscriber};

#[cfg(feature = "hub")]
pub mod hub;
#[cfg(feature = "hub")]
pub use hub::{HubClient, HubError};

/// Scores free-form candidate labels against a text.
pub trait ZeroShotClassifier: Send + Sync {
    /// Rank `labels` for `text`, highest score first, keeping at most `num`
    /// entries when given. Empty text or no labels yields an empty ranking.
    fn classify(&self, text: &str, labels: &[String], num: Option<usize>)
    -> anyhow::Result<Ranking>;
}

/// Describes an encoded image (JPEG, PNG, ...) in natural language.
pub trait ImageCaptioner: Send + Sync {
    fn caption(&self, image: &[u8]) -> anyhow::Result<String>;
}

/// Transcribes an audio file on disk.
pub trait SpeechTranscriber: Send + Sync {
    fn transcribe(&self, audio_file: &Path) -> anyhow::Result<String>;
}

/// A file a model directory must contain.
///
/// `remote` is the path inside the hub repository, `local` the file name in
/// the model directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelFile {
    pub remote: &'static str,
    pub local: &'static str,
}

impl ModelFile {
    pub const fn new(remote: &'static str, local: &'static str) -> Self {
        Self { remote, local }
    }
}

/// Files of `files` not yet present in `dir`.
pub fn missing_files<'a>(dir: &Path, files: &'a [ModelFile]) -> Vec<&'a ModelFile> {
    files
        .iter()
        .filter(|f| !dir.join(f.local).is_file())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const FILES: &[ModelFile] = &[
        ModelFile::new("onnx/model.onnx", "model.onnx"),
        ModelFile::new("tokenizer.json", "tokenizer.json"),
    ];

    #[test]
    fn missing_files_reports_absent_only() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("tokenizer.json"), b"{}").unwrap();

        let missing = missing_files(dir.path(), FILES);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].local, "model.onnx");
    }

    #[test]
    fn missing_files_empty_when_complete() {
        let dir = tempfile::tempdir().unwrap();
        for f in FILES {
            std::fs::write(dir.path().join(f.local), b"x").unwrap();
        }
        assert!(missing_files(dir.path(), FILES).is_empty());
    }
}
