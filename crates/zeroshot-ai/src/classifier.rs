//! Zero-shot classification with an NLI cross-encoder.
//!
//! Each candidate label becomes a hypothesis ("This example is {label}.")
//! paired with the input text as premise. The entailment logits of all
//! pairs are softmaxed across labels, so scores sum to one per request.
//!
//! The model directory must contain `model.onnx`, `tokenizer.json` and the
//! model's `config.json` (for the `id2label` mapping).

use std::collections::HashMap;
use std::path::Path;

use ort::session::Session;
use ort::value::Tensor;
use parking_lot::Mutex;
use serde::Deserialize;
use tokenizers::Tokenizer;
use tracing::{debug, info};
use zeroshot_core::Ranking;

use crate::util::{has_input, load_json, load_session, load_tokenizer, softmax};
use crate::{ModelFile, ZeroShotClassifier};

/// Hypothesis template; `{}` is replaced by the candidate label.
pub const DEFAULT_HYPOTHESIS_TEMPLATE: &str = "This example is {}.";

/// Premise/hypothesis pairs per forward pass.
const BATCH_SIZE: usize = 16;
const MAX_LENGTH: usize = 512;

#[derive(Deserialize)]
struct NliConfig {
    #[serde(default)]
    id2label: HashMap<String, String>,
}

/// NLI-based zero-shot classifier (e.g. multilingual mDeBERTa-v3 XNLI).
pub struct NliClassifier {
    session: Mutex<Session>,
    tokenizer: Tokenizer,
    template: String,
    entailment: usize,
    token_type_ids: bool,
}

impl NliClassifier {
    /// Files expected in the model directory, with their hub locations.
    pub const FILES: &'static [ModelFile] = &[
        ModelFile::new("onnx/model.onnx", "model.onnx"),
        ModelFile::new("tokenizer.json", "tokenizer.json"),
        ModelFile::new("config.json", "config.json"),
    ];

    /// Load the model from `model_dir` using `template` as hypothesis.
    pub fn load(model_dir: &Path, template: &str) -> anyhow::Result<Self> {
        anyhow::ensure!(
            template.contains("{}"),
            "hypothesis template must contain '{{}}': {template:?}"
        );

        let session = load_session(model_dir, "model.onnx")?;
        let token_type_ids = has_input(&session, "token_type_ids");

        let config: NliConfig = load_json(model_dir, "config.json")?;
        let entailment = entailment_index(&config.id2label)?;

        let mut tokenizer = load_tokenizer(model_dir)?;
        tokenizer
            .with_truncation(Some(tokenizers::TruncationParams {
                max_length: MAX_LENGTH,
                strategy: tokenizers::TruncationStrategy::OnlyFirst,
                ..Default::default()
            }))
            .map_err(|e| anyhow::anyhow!("set truncation: {e}"))?;
        tokenizer.with_padding(Some(tokenizers::PaddingParams {
            ..Default::default()
        }));

        info!(
            entailment,
            token_type_ids,
            model = %model_dir.display(),
            "loaded zero-shot classifier"
        );
        Ok(Self {
            session: Mutex::new(session),
            tokenizer,
            template: template.to_string(),
            entailment,
            token_type_ids,
        })
    }

    fn hypothesis(&self, label: &str) -> String {
        hypothesis(&self.template, label)
    }

    /// Entailment logit of `text` against every label, in label order.
    fn entailment_logits(&self, text: &str, labels: &[String]) -> anyhow::Result<Vec<f32>> {
        let mut logits = Vec::with_capacity(labels.len());
        for chunk in labels.chunks(BATCH_SIZE) {
            let pairs: Vec<(String, String)> = chunk
                .iter()
                .map(|label| (text.to_string(), self.hypothesis(label)))
                .collect();
            logits.extend(self.run_pairs(pairs)?);
        }
        Ok(logits)
    }

    fn run_pairs(&self, pairs: Vec<(String, String)>) -> anyhow::Result<Vec<f32>> {
        let batch_size = pairs.len();
        let encodings = self
            .tokenizer
            .encode_batch(pairs, true)
            .map_err(|e| anyhow::anyhow!("tokenize: {e}"))?;

        let seq_len = encodings
            .iter()
            .map(|e| e.get_ids().len())
            .max()
            .unwrap_or(0);

        let mut input_ids = vec![0i64; batch_size * seq_len];
        let mut attention_mask = vec![0i64; batch_size * seq_len];
        let mut token_type_ids = vec![0i64; batch_size * seq_len];

        for (i, encoding) in encodings.iter().enumerate() {
            let offset = i * seq_len;
            for (j, &id) in encoding.get_ids().iter().enumerate() {
                input_ids[offset + j] = id as i64;
            }
            for (j, &mask) in encoding.get_attention_mask().iter().enumerate() {
                attention_mask[offset + j] = mask as i64;
            }
            for (j, &tid) in encoding.get_type_ids().iter().enumerate() {
                token_type_ids[offset + j] = tid as i64;
            }
        }

        let shape = [batch_size as i64, seq_len as i64];
        let ids_tensor = Tensor::from_array((shape, input_ids.into_boxed_slice()))?;
        let mask_tensor = Tensor::from_array((shape, attention_mask.into_boxed_slice()))?;

        let mut session = self.session.lock();
        let outputs = if self.token_type_ids {
            let type_tensor = Tensor::from_array((shape, token_type_ids.into_boxed_slice()))?;
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
                "token_type_ids" => type_tensor,
            ])?
        } else {
            session.run(ort::inputs![
                "input_ids" => ids_tensor,
                "attention_mask" => mask_tensor,
            ])?
        };

        // Logits: [batch_size, num_classes].
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;
        let dims: &[i64] = output_shape;
        anyhow::ensure!(
            dims.len() == 2 && dims[0] as usize == batch_size,
            "unexpected output shape: {dims:?}, expected [{batch_size}, num_classes]"
        );
        let num_classes = dims[1] as usize;
        anyhow::ensure!(
            self.entailment < num_classes,
            "entailment index {} out of range for {num_classes} classes",
            self.entailment
        );

        Ok((0..batch_size)
            .map(|i| output_data[i * num_classes + self.entailment])
            .collect())
    }
}

impl ZeroShotClassifier for NliClassifier {
    fn classify(
        &self,
        text: &str,
        labels: &[String],
        num: Option<usize>,
    ) -> anyhow::Result<Ranking> {
        if text.trim().is_empty() || labels.is_empty() {
            return Ok(Ranking::empty());
        }

        let logits = self.entailment_logits(text, labels)?;
        let scores = softmax(&logits);
        let mut ranking = Ranking::from_pairs(labels.iter().cloned().zip(scores).collect());
        if let Some(n) = num {
            ranking.truncate(n);
        }
        debug!(labels = labels.len(), top = ?ranking.top(), "classified");
        Ok(ranking)
    }
}

fn hypothesis(template: &str, label: &str) -> String {
    template.replacen("{}", label, 1)
}

/// Find the class whose name starts with "entail" (case-insensitive).
fn entailment_index(id2label: &HashMap<String, String>) -> anyhow::Result<usize> {
    id2label
        .iter()
        .find(|(_, name)| name.to_lowercase().starts_with("entail"))
        .map(|(id, _)| id.parse::<usize>())
        .transpose()?
        .ok_or_else(|| anyhow::anyhow!("config.json id2label has no entailment class"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn id2label(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn hypothesis_fills_template() {
        assert_eq!(
            hypothesis(DEFAULT_HYPOTHESIS_TEMPLATE, "旅游"),
            "This example is 旅游."
        );
        assert_eq!(hypothesis("关于{}的内容", "财经"), "关于财经的内容");
    }

    #[test]
    fn entailment_index_from_mnli_config() {
        let map = id2label(&[("0", "entailment"), ("1", "neutral"), ("2", "contradiction")]);
        assert_eq!(entailment_index(&map).unwrap(), 0);

        let map = id2label(&[("0", "CONTRADICTION"), ("1", "NEUTRAL"), ("2", "ENTAILMENT")]);
        assert_eq!(entailment_index(&map).unwrap(), 2);
    }

    #[test]
    fn entailment_index_missing() {
        let map = id2label(&[("0", "LABEL_0"), ("1", "LABEL_1")]);
        assert!(entailment_index(&map).is_err());
    }

    #[test]
    fn template_without_placeholder_rejected() {
        let err = NliClassifier::load(Path::new("/nonexistent"), "no placeholder").err();
        assert!(err.unwrap().to_string().contains("template"));
    }

    fn model_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("models")
            .join("classifier")
    }

    #[test]
    fn classify_with_model() {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            eprintln!("skipping: no classifier model in {}", dir.display());
            return;
        }
        let classifier = NliClassifier::load(&dir, DEFAULT_HYPOTHESIS_TEMPLATE).unwrap();
        let labels: Vec<String> = ["旅游", "故事", "游戏"].map(String::from).to_vec();
        let ranking = classifier
            .classify("世界那么大，我想去看看", &labels, None)
            .unwrap();

        assert_eq!(ranking.len(), 3);
        let sum: f32 = ranking.scores.iter().sum();
        assert!((sum - 1.0).abs() < 1e-3);
        assert!(ranking.scores.windows(2).all(|w| w[0] >= w[1]));

        let top1 = classifier
            .classify("世界那么大，我想去看看", &labels, Some(1))
            .unwrap();
        assert_eq!(top1.len(), 1);
        assert_eq!(top1.labels[0], ranking.labels[0]);
    }

    #[test]
    fn empty_input_needs_no_inference() {
        let dir = model_dir();
        if !dir.join("model.onnx").exists() {
            eprintln!("skipping: no classifier model in {}", dir.display());
            return;
        }
        let classifier = NliClassifier::load(&dir, DEFAULT_HYPOTHESIS_TEMPLATE).unwrap();
        assert!(classifier.classify("", &["a".into()], None).unwrap().is_empty());
        assert!(classifier.classify("text", &[], None).unwrap().is_empty());
    }
}
