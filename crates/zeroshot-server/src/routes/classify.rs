//! Classification endpoints: free text with caller labels, and text, image,
//! audio and CSV inputs against the configured label groups.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use tracing::info;
use zeroshot_core::{GroupResult, Modality, Ranking};

use crate::error::{ApiJson, ApiResult};
use crate::orchestrator;
use crate::state::AppState;
use crate::upload::{Form, csv_header_text, parse_labels, parse_num_results};

#[derive(Debug, Deserialize)]
pub struct ClassifyRequest {
    pub text: String,
    pub labels: Vec<String>,
    #[serde(default)]
    pub num_results: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct TxtRequest {
    pub txt: String,
}

/// One entry per configured label group, in group order.
#[derive(Debug, Serialize)]
pub struct GroupResults {
    pub results: Vec<GroupResult>,
}

pub async fn classify(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<ClassifyRequest>,
) -> ApiResult<Json<Ranking>> {
    let ranking = orchestrator::classify(&state, req.text, req.labels, req.num_results).await?;
    Ok(Json(ranking))
}

pub async fn classify_txt(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TxtRequest>,
) -> ApiResult<Json<GroupResults>> {
    let results = orchestrator::classify_groups(&state, req.txt, Modality::Txt).await?;
    Ok(Json(GroupResults { results }))
}

/// Caption the `image` field, then classify the caption against the
/// caller's `labels` when given, the configured image groups otherwise.
/// No model runs when there is nothing to rank.
pub async fn classify_image(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Response> {
    let mut form = Form::read(multipart?).await?;
    let image = form.take_nonempty("image")?;
    let custom_labels = form
        .contains("labels")
        .then(|| parse_labels(form.values("labels")));
    let num = parse_num_results(form.value("num_results"))?;

    match custom_labels {
        Some(labels) if labels.is_empty() => Ok(Json(Ranking::empty()).into_response()),
        Some(labels) => {
            let caption = orchestrator::caption(&state, image.data).await?;
            info!(%caption, labels = labels.len(), "captioned image");
            let ranking = orchestrator::classify(&state, caption, labels, num).await?;
            Ok(Json(ranking).into_response())
        }
        None => {
            if let Some(results) = orchestrator::unlabelled_groups(&state, Modality::Image) {
                return Ok(Json(GroupResults { results }).into_response());
            }
            let caption = orchestrator::caption(&state, image.data).await?;
            info!(%caption, "captioned image");
            let results = orchestrator::classify_groups(&state, caption, Modality::Image).await?;
            Ok(Json(GroupResults { results }).into_response())
        }
    }
}

/// Transcribe the `audio` field and classify the transcript. Nothing is
/// spooled or transcribed when no audio group has labels.
pub async fn classify_audio(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<GroupResults>> {
    let mut form = Form::read(multipart?).await?;
    let audio = form.take_nonempty("audio")?;
    if let Some(results) = orchestrator::unlabelled_groups(&state, Modality::Audio) {
        return Ok(Json(GroupResults { results }));
    }
    let extension = audio.extension();

    let text = orchestrator::transcribe(&state, audio.data, extension).await?;
    info!(chars = text.chars().count(), "transcribed audio");

    let results = orchestrator::classify_groups(&state, text, Modality::Audio).await?;
    Ok(Json(GroupResults { results }))
}

/// Classify the `csv_file` field by its name and header row.
pub async fn classify_csv(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<GroupResults>> {
    let mut form = Form::read(multipart?).await?;
    let upload = form.take("csv_file")?;
    let text = csv_header_text(upload.file_name.as_deref(), &upload.data);
    info!(file = ?upload.file_name, %text, "classifying csv headers");

    let results = orchestrator::classify_groups(&state, text, Modality::Csv).await?;
    Ok(Json(GroupResults { results }))
}
