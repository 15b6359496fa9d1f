//! Image captioning with BLIP, exported as separate vision encoder and text
//! decoder ONNX graphs.
//!
//! The image is resized to the processor's square input size (bicubic),
//! normalized with the processor's mean/std, encoded once, and the caption
//! is decoded greedily from the BOS token until SEP or `max_length`.

use std::path::Path;

use image::imageops::FilterType;
use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::util::{has_input, load_json, load_session, load_tokenizer, next_token};
use crate::{ImageCaptioner, ModelFile};

const DEFAULT_MAX_LENGTH: usize = 20;

// ── Model configuration ──

#[derive(Deserialize)]
struct PreprocessorConfig {
    #[serde(default = "default_mean")]
    image_mean: [f32; 3],
    #[serde(default = "default_std")]
    image_std: [f32; 3],
    #[serde(default)]
    size: Option<ImageSize>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ImageSize {
    Square(u32),
    Dims { height: u32, width: u32 },
}

impl ImageSize {
    fn side(&self) -> u32 {
        match self {
            Self::Square(s) => *s,
            Self::Dims { height, width } => (*height).max(*width),
        }
    }
}

fn default_mean() -> [f32; 3] {
    [0.481_454_66, 0.457_827_5, 0.408_210_73]
}

fn default_std() -> [f32; 3] {
    [0.268_629_54, 0.261_302_58, 0.275_777_11]
}

#[derive(Deserialize, Default)]
struct BlipConfig {
    #[serde(default)]
    text_config: TextConfig,
}

#[derive(Deserialize)]
struct TextConfig {
    #[serde(default = "default_bos")]
    bos_token_id: i64,
    #[serde(default = "default_sep")]
    sep_token_id: i64,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            bos_token_id: default_bos(),
            sep_token_id: default_sep(),
        }
    }
}

fn default_bos() -> i64 {
    30522
}

fn default_sep() -> i64 {
    102
}

// ── Captioner ──

/// BLIP image captioner (e.g. blip-image-captioning-base).
pub struct BlipCaptioner {
    vision: Mutex<Session>,
    decoder: Mutex<Session>,
    tokenizer: Tokenizer,
    image_size: u32,
    mean: [f32; 3],
    std: [f32; 3],
    bos_token_id: i64,
    sep_token_id: i64,
    encoder_attention_mask: bool,
    max_length: usize,
}

impl BlipCaptioner {
    pub const FILES: &'static [ModelFile] = &[
        ModelFile::new("onnx/vision_model.onnx", "vision_model.onnx"),
        ModelFile::new("onnx/text_decoder_model.onnx", "text_decoder_model.onnx"),
        ModelFile::new("tokenizer.json", "tokenizer.json"),
        ModelFile::new("preprocessor_config.json", "preprocessor_config.json"),
        ModelFile::new("config.json", "config.json"),
    ];

    pub fn load(model_dir: &Path) -> anyhow::Result<Self> {
        let vision = load_session(model_dir, "vision_model.onnx")?;
        let decoder = load_session(model_dir, "text_decoder_model.onnx")?;
        let encoder_attention_mask = has_input(&decoder, "encoder_attention_mask");
        let tokenizer = load_tokenizer(model_dir)?;

        let pre: PreprocessorConfig = load_json(model_dir, "preprocessor_config.json")?;
        let config: BlipConfig = load_json(model_dir, "config.json")?;
        let image_size = pre.size.as_ref().map_or(384, ImageSize::side);

        info!(
            image_size,
            bos = config.text_config.bos_token_id,
            sep = config.text_config.sep_token_id,
            model = %model_dir.display(),
            "loaded captioning model"
        );
        Ok(Self {
            vision: Mutex::new(vision),
            decoder: Mutex::new(decoder),
            tokenizer,
            image_size,
            mean: pre.image_mean,
            std: pre.image_std,
            bos_token_id: config.text_config.bos_token_id,
            sep_token_id: config.text_config.sep_token_id,
            encoder_attention_mask,
            max_length: DEFAULT_MAX_LENGTH,
        })
    }

    /// Maximum number of generated tokens.
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = max_length;
        self
    }

    /// Run the vision encoder: returns hidden states and their shape.
    fn encode(&self, pixels: Vec<f32>) -> anyhow::Result<(Vec<f32>, [i64; 3])> {
        let side = self.image_size as i64;
        let pixel_tensor = Tensor::from_array(([1, 3, side, side], pixels.into_boxed_slice()))?;

        let mut vision = self.vision.lock();
        let outputs = vision.run(ort::inputs!["pixel_values" => pixel_tensor])?;
        let (shape, data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = shape;
        anyhow::ensure!(
            dims.len() == 3 && dims[0] == 1,
            "unexpected vision output shape: {dims:?}"
        );
        Ok((data.to_vec(), [dims[0], dims[1], dims[2]]))
    }

    fn decode(&self, hidden: &[f32], hidden_shape: [i64; 3]) -> anyhow::Result<Vec<i64>> {
        let mut ids = vec![self.bos_token_id];
        let mut decoder = self.decoder.lock();

        for _ in 0..self.max_length {
            let len = ids.len() as i64;
            let ids_tensor = Tensor::from_array(([1, len], ids.clone().into_boxed_slice()))?;
            let mask_tensor = Tensor::from_array(([1, len], vec![1i64; ids.len()].into_boxed_slice()))?;
            let hidden_tensor =
                Tensor::from_array((hidden_shape, hidden.to_vec().into_boxed_slice()))?;

            let outputs = if self.encoder_attention_mask {
                let enc_len = hidden_shape[1];
                let enc_mask = Tensor::from_array((
                    [1, enc_len],
                    vec![1i64; enc_len as usize].into_boxed_slice(),
                ))?;
                decoder.run(ort::inputs![
                    "input_ids" => ids_tensor,
                    "attention_mask" => mask_tensor,
                    "encoder_hidden_states" => hidden_tensor,
                    "encoder_attention_mask" => enc_mask,
                ])?
            } else {
                decoder.run(ort::inputs![
                    "input_ids" => ids_tensor,
                    "attention_mask" => mask_tensor,
                    "encoder_hidden_states" => hidden_tensor,
                ])?
            };

            // Logits: [1, seq_len, vocab].
            let (shape, logits) = outputs[0].try_extract_tensor::<f32>()?;
            let next = next_token(shape, logits)?;
            if next == self.sep_token_id {
                break;
            }
            ids.push(next);
        }
        Ok(ids)
    }
}

impl ImageCaptioner for BlipCaptioner {
    fn caption(&self, image: &[u8]) -> anyhow::Result<String> {
        let pixels = preprocess(image, self.image_size, self.mean, self.std)?;
        let (hidden, hidden_shape) = self.encode(pixels)?;
        let ids = self.decode(&hidden, hidden_shape)?;

        let tokens: Vec<u32> = ids[1..].iter().map(|&id| id as u32).collect();
        let caption = self
            .tokenizer
            .decode(&tokens, true)
            .map_err(|e| anyhow::anyhow!("detokenize: {e}"))?;
        let caption = caption.trim().to_string();
        debug!(tokens = tokens.len(), %caption, "captioned image");
        Ok(caption)
    }
}

/// Decode, resize to `side`×`side` and normalize into CHW floats.
fn preprocess(bytes: &[u8], side: u32, mean: [f32; 3], std: [f32; 3]) -> anyhow::Result<Vec<f32>> {
    let img = image::load_from_memory(bytes).map_err(|e| anyhow::anyhow!("decode image: {e}"))?;
    let rgb = img
        .resize_exact(side, side, FilterType::CatmullRom)
        .to_rgb8();

    let plane = (side * side) as usize;
    let mut out = vec![0.0f32; 3 * plane];
    for (i, pixel) in rgb.pixels().enumerate() {
        for c in 0..3 {
            let v = pixel.0[c] as f32 / 255.0;
            out[c * plane + i] = (v - mean[c]) / std[c];
        }
    }
    Ok(out)
}
