//! Runs the model adapters on the blocking pool and shapes their output.
//!
//! Handlers never call an adapter directly: everything goes through here so
//! empty input is short-circuited before any model runs, and inference
//! stays off the async executor.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use axum::body::Bytes;
use tokio::task::spawn_blocking;
use tracing::debug;
use zeroshot_ai::ZeroShotClassifier;
use zeroshot_core::{GroupResult, LabelGroup, Modality, Ranking};

use crate::error::ApiResult;
use crate::state::AppState;

/// Rank `labels` for `text`. Empty text or labels skip the model.
pub async fn classify(
    state: &AppState,
    text: String,
    labels: Vec<String>,
    num: Option<usize>,
) -> ApiResult<Ranking> {
    if text.trim().is_empty() || labels.is_empty() {
        return Ok(Ranking::empty());
    }
    let classifier = Arc::clone(&state.classifier);
    let ranking = spawn_blocking(move || classifier.classify(&text, &labels, num)).await??;
    Ok(ranking)
}

/// Best label of every configured group of `modality`, in group order.
pub async fn classify_groups(
    state: &AppState,
    text: String,
    modality: Modality,
) -> ApiResult<Vec<GroupResult>> {
    if let Some(results) = unlabelled_groups(state, modality) {
        return Ok(results);
    }
    if text.trim().is_empty() {
        let group_count = state.catalog.modalities.groups(modality).len();
        return Ok(vec![GroupResult::Empty; group_count]);
    }

    let catalog = Arc::clone(&state.catalog);
    let classifier = Arc::clone(&state.classifier);
    let results = spawn_blocking(move || {
        catalog
            .modalities
            .groups(modality)
            .iter()
            .map(|group| best_of_group(classifier.as_ref(), &text, group))
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await??;

    debug!(%modality, groups = results.len(), "classified groups");
    Ok(results)
}

/// Results for `modality` when none of its groups has a label to rank,
/// `None` when a model has to run.
pub fn unlabelled_groups(state: &AppState, modality: Modality) -> Option<Vec<GroupResult>> {
    let groups = state.catalog.modalities.groups(modality);
    groups
        .iter()
        .all(LabelGroup::is_empty)
        .then(|| vec![GroupResult::Empty; groups.len()])
}

fn best_of_group(
    classifier: &dyn ZeroShotClassifier,
    text: &str,
    group: &LabelGroup,
) -> anyhow::Result<GroupResult> {
    if group.is_empty() {
        return Ok(GroupResult::Empty);
    }
    let ranking = classifier.classify(text, group.labels(), Some(1))?;
    Ok(GroupResult::from_ranking(&ranking))
}

pub async fn caption(state: &AppState, image: Bytes) -> ApiResult<String> {
    let captioner = Arc::clone(&state.captioner);
    let caption = spawn_blocking(move || captioner.caption(&image)).await??;
    Ok(caption)
}

/// Spool `audio` to a uniquely named file in the upload directory and
/// transcribe it. The file is removed when the call returns, whatever the
/// outcome.
pub async fn transcribe(
    state: &AppState,
    audio: Bytes,
    extension: Option<String>,
) -> ApiResult<String> {
    let transcriber = Arc::clone(&state.transcriber);
    let upload_dir = state.upload_dir.clone();
    let text = spawn_blocking(move || -> anyhow::Result<String> {
        let file = spool(&upload_dir, &audio, extension.as_deref())?;
        transcriber.transcribe(file.path())
    })
    .await??;
    Ok(text)
}

fn spool(
    dir: &Path,
    data: &[u8],
    extension: Option<&str>,
) -> anyhow::Result<tempfile::NamedTempFile> {
    std::fs::create_dir_all(dir)
        .map_err(|e| anyhow::anyhow!("create upload dir {}: {e}", dir.display()))?;
    let suffix = extension
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix("audio-")
        .suffix(&suffix)
        .tempfile_in(dir)
        .map_err(|e| anyhow::anyhow!("create upload file in {}: {e}", dir.display()))?;
    file.write_all(data)?;
    file.flush()?;
    Ok(file)
}
