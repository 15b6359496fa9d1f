//! `zeroshot serve`: fetch and load the models, then run the HTTP API.

use std::net::{IpAddr, SocketAddr};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use tracing::info;
use zeroshot_ai::hub::HUGGINGFACE_URL;
use zeroshot_ai::{
    BlipCaptioner, DEFAULT_HYPOTHESIS_TEMPLATE, DEFAULT_LANGUAGE, HubClient, ModelFile,
    NliClassifier, WhisperTranscriber,
};
use zeroshot_core::Catalog;
use zeroshot_server::{AppState, build_router_with_limit, serve};

const CLASSIFIER_REPO: &str = "Xenova/mDeBERTa-v3-base-xnli-multilingual-nli-2mil7";
const CAPTIONER_REPO: &str = "Xenova/blip-image-captioning-base";
const TRANSCRIBER_REPO: &str = "onnx-community/whisper-small";

#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    #[arg(long, default_value = "0.0.0.0", env = "ZEROSHOT_HOST")]
    host: IpAddr,

    #[arg(long, short = 'p', default_value_t = 8000, env = "ZEROSHOT_PORT")]
    port: u16,

    /// Root of the model directories (`classifier/`, `captioner/`, `transcriber/`)
    #[arg(long, default_value = "models", env = "ZEROSHOT_MODELS_DIR")]
    models_dir: PathBuf,

    #[arg(long, default_value = CLASSIFIER_REPO, env = "ZEROSHOT_CLASSIFIER_REPO")]
    classifier_repo: String,

    #[arg(long, default_value = CAPTIONER_REPO, env = "ZEROSHOT_CAPTIONER_REPO")]
    captioner_repo: String,

    #[arg(long, default_value = TRANSCRIBER_REPO, env = "ZEROSHOT_TRANSCRIBER_REPO")]
    transcriber_repo: String,

    /// Hugging Face access token for gated or private repositories
    #[arg(long, env = "HF_TOKEN", hide_env_values = true)]
    hf_token: Option<String>,

    #[arg(long, default_value = HUGGINGFACE_URL, env = "HF_ENDPOINT")]
    hub_url: String,

    /// Never download; fail if a model file is missing
    #[arg(long)]
    offline: bool,

    /// Where audio uploads are spooled (system temp dir by default)
    #[arg(long, env = "ZEROSHOT_UPLOAD_DIR")]
    upload_dir: Option<PathBuf>,

    /// Request body limit in MiB
    #[arg(long, default_value_t = 50)]
    body_limit_mb: usize,

    /// NLI hypothesis; `{}` is replaced by each candidate label
    #[arg(long, default_value = DEFAULT_HYPOTHESIS_TEMPLATE)]
    hypothesis_template: String,

    /// Transcription language code
    #[arg(long, default_value = DEFAULT_LANGUAGE)]
    language: String,

    /// Maximum caption length in tokens
    #[arg(long)]
    caption_max_length: Option<usize>,

    /// Maximum transcription tokens per 30 s window
    #[arg(long)]
    transcribe_max_tokens: Option<usize>,
}

pub async fn run(args: ServeArgs, catalog: Catalog) -> anyhow::Result<()> {
    let s = catalog.summary();
    info!(
        labels = s.labels,
        security_categories = s.security_categories,
        "catalog ready"
    );

    let hub = HubClient::with_base_url(args.hub_url.clone(), args.hf_token.clone());
    let classifier_dir = args.models_dir.join("classifier");
    let captioner_dir = args.models_dir.join("captioner");
    let transcriber_dir = args.models_dir.join("transcriber");

    if !args.offline {
        fetch(&hub, &classifier_dir, &args.classifier_repo, NliClassifier::FILES).await?;
        fetch(&hub, &captioner_dir, &args.captioner_repo, BlipCaptioner::FILES).await?;
        fetch(&hub, &transcriber_dir, &args.transcriber_repo, WhisperTranscriber::FILES).await?;
    }

    let start = Instant::now();
    let template = args.hypothesis_template.clone();
    let classifier = tokio::task::spawn_blocking(move || {
        NliClassifier::load(&classifier_dir, &template)
    })
    .await?
    .context("loading classifier")?;

    let caption_max_length = args.caption_max_length;
    let captioner = tokio::task::spawn_blocking(move || {
        BlipCaptioner::load(&captioner_dir).map(|c| match caption_max_length {
            Some(n) => c.with_max_length(n),
            None => c,
        })
    })
    .await?
    .context("loading captioner")?;

    let language = args.language.clone();
    let max_tokens = args.transcribe_max_tokens;
    let transcriber = tokio::task::spawn_blocking(move || {
        WhisperTranscriber::load(&transcriber_dir, &language).map(|t| match max_tokens {
            Some(n) => t.with_max_new_tokens(n),
            None => t,
        })
    })
    .await?
    .context("loading transcriber")?;
    info!(elapsed_ms = start.elapsed().as_millis() as u64, "models loaded");

    let upload_dir = args.upload_dir.unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&upload_dir)
        .with_context(|| format!("creating upload dir {}", upload_dir.display()))?;

    let state = AppState::new(
        catalog,
        Arc::new(classifier),
        Arc::new(captioner),
        Arc::new(transcriber),
        upload_dir,
    );
    let router = build_router_with_limit(state, args.body_limit_mb * 1024 * 1024);
    serve(SocketAddr::new(args.host, args.port), router).await
}

async fn fetch(hub: &HubClient, dir: &Path, repo: &str, files: &[ModelFile]) -> anyhow::Result<()> {
    hub.ensure_model(dir, repo, files)
        .await
        .with_context(|| format!("fetching {repo} into {}", dir.display()))
}
