//! Speech transcription with Whisper encoder/decoder ONNX graphs.
//!
//! Audio is decoded, resampled to 16 kHz and split into 30 s windows. Each
//! window is encoded once and decoded greedily from the forced prompt
//! `<|startoftranscript|><|lang|><|transcribe|><|notimestamps|>` until
//! `<|endoftext|>` or the token budget runs out.

use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::audio::{self, LogMel, N_FRAMES, N_MELS, N_SAMPLES, SAMPLE_RATE};
use crate::util::{load_session, load_tokenizer, next_token};
use crate::{ModelFile, SpeechTranscriber};

pub const DEFAULT_LANGUAGE: &str = "zh";
const DEFAULT_MAX_NEW_TOKENS: usize = 128;

/// Whisper speech-to-text (e.g. whisper-small).
pub struct WhisperTranscriber {
    encoder: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
    mel: LogMel,
    prompt: Vec<i64>,
    eot: i64,
    max_new_tokens: usize,
}

impl WhisperTranscriber {
    pub const FILES: &'static [ModelFile] = &[
        ModelFile::new("onnx/encoder_model.onnx", "encoder_model.onnx"),
        ModelFile::new("onnx/decoder_model.onnx", "decoder_model.onnx"),
        ModelFile::new("tokenizer.json", "tokenizer.json"),
    ];

    /// Load the model, transcribing in `language` (an ISO code such as `zh`).
    pub fn load(model_dir: &Path, language: &str) -> anyhow::Result<Self> {
        let encoder = load_session(model_dir, "encoder_model.onnx")?;
        let decoder = load_session(model_dir, "decoder_model.onnx")?;
        let tokenizer = load_tokenizer(model_dir)?;

        let prompt = [
            "<|startoftranscript|>".to_string(),
            format!("<|{language}|>"),
            "<|transcribe|>".to_string(),
            "<|notimestamps|>".to_string(),
        ]
        .iter()
        .map(|t| special_token(&tokenizer, t))
        .collect::<anyhow::Result<Vec<_>>>()?;
        let eot = special_token(&tokenizer, "<|endoftext|>")?;

        info!(language, model = %model_dir.display(), "loaded transcription model");
        Ok(Self {
            encoder: Mutex::new(encoder),
            decoder: Mutex::new(decoder),
            tokenizer,
            mel: LogMel::new(),
            prompt,
            eot,
            max_new_tokens: DEFAULT_MAX_NEW_TOKENS,
        })
    }

    pub fn with_max_new_tokens(mut self, max_new_tokens: usize) -> Self {
        self.max_new_tokens = max_new_tokens;
        self
    }

    fn encode(&self, features: Vec<f32>) -> anyhow::Result<(Vec<f32>, [i64; 3])> {
        let input = Tensor::from_array((
            [1, N_MELS as i64, N_FRAMES as i64],
            features.into_boxed_slice(),
        ))?;
        let mut encoder = self.encoder.lock();
        let outputs = encoder.run(ort::inputs!["input_features" => input])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1,
            "unexpected encoder output shape: {dims:?}"
        );
        Ok((data.to_vec(), [dims[0], dims[1], dims[2]]))
    }

    /// Greedy decode; returns generated tokens without the prompt.
    fn decode(&self, hidden: &[f32], hidden_shape: [i64; 3]) -> anyhow::Result<Vec<u32>> {
        let mut ids = self.prompt.clone();
        let mut decoder = self.decoder.lock();

        for _ in 0..self.max_new_tokens {
            let len = ids.len() as i64;
            let ids_tensor = Tensor::from_array(([1, len], ids.clone().into_boxed_slice()))?;
            let hidden_tensor =
                Tensor::from_array((hidden_shape, hidden.to_vec().into_boxed_slice()))?;
            let outputs = decoder.run(ort::inputs![
                "input_ids" => ids_tensor,
                "encoder_hidden_states" => hidden_tensor,
            ])?;

            let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
            let next = next_token(shape, logits)?;
            if next == self.eot {
                break;
            }
            ids.push(next);
        }

        Ok(ids[self.prompt.len()..].iter().map(|&id| id as u32).collect())
    }

    fn transcribe_window(&self, window: &[f32]) -> anyhow::Result<String> {
        let features = self.mel.compute(window);
        let (hidden, hidden_shape) = self.encode(features)?;
        let tokens = self.decode(&hidden, hidden_shape)?;
        let text = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| anyhow::anyhow!("detokenize: {e}"))?;
        Ok(text.trim().to_string())
    }
}

impl SpeechTranscriber for WhisperTranscriber {
    fn transcribe(&self, audio_file: &Path) -> anyhow::Result<String> {
        anyhow::ensure!(
            audio_file.is_file(),
            "audio file not found: {}",
            audio_file.display()
        );
        let pcm = audio::read_audio(audio_file)?;
        let samples = audio::resample(&pcm.samples, pcm.sample_rate, SAMPLE_RATE)?;

        let mut parts = Vec::new();
        for (i, window) in samples.chunks(N_SAMPLES).enumerate() {
            let text = self.transcribe_window(window)?;
            debug!(window = i, chars = text.chars().count(), "transcribed window");
            if !text.is_empty() {
                parts.push(text);
            }
        }
        Ok(join_segments(&parts))
    }
}

fn special_token(tokenizer: &Tokenizer, token: &str) -> anyhow::Result<i64> {
    tokenizer
        .token_to_id(token)
        .map(i64::from)
        .ok_or_else(|| anyhow::anyhow!("tokenizer has no {token} token"))
}

/// Concatenate window transcripts. CJK text is joined directly, anything
/// else with a single space.
fn join_segments(parts: &[String]) -> String {
    let mut out = String::new();
    for part in parts {
        let needs_space = match (out.chars().last(), part.chars().next()) {
            (Some(a), Some(b)) => !(is_cjk(a) || is_cjk(b)),
            _ => false,
        };
        if needs_space {
            out.push(' ');
        }
        out.push_str(part);
    }
    out
}

fn is_cjk(c: char) -> bool {
    matches!(c as u32,
        0x3000..=0x303F | 0x3400..=0x4DBF | 0x4E00..=0x9FFF | 0xF900..=0xFAFF | 0xFF00..=0xFFEF)
}
