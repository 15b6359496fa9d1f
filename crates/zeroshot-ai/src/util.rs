//! Small numeric and session helpers shared by the ONNX adapters.

use std::path::Path;

use ort::session::Session;
use serde::de::DeserializeOwned;
use tokenizers::Tokenizer;

/// Numerically stable softmax.
pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&x| (x - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    if sum > 0.0 {
        exps.iter().map(|e| e / sum).collect()
    } else {
        exps
    }
}

/// Index of the largest value (first one on ties).
fn argmax(values: &[f32]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate() {
        if v > values[best] {
            best = i;
        }
    }
    best
}

/// Greedy pick from `[1, seq_len, vocab]` decoder logits: the argmax of
/// the last position.
pub(crate) fn next_token(dims: &[i64], logits: &[f32]) -> anyhow::Result<i64> {
    anyhow::ensure!(dims.len() == 3, "unexpected decoder output shape: {dims:?}");
    let seq_len = usize::try_from(dims[1])?;
    let vocab = usize::try_from(dims[2])?;
    let last = seq_len
        .checked_sub(1)
        .map(|i| i * vocab)
        .ok_or_else(|| anyhow::anyhow!("decoder returned an empty sequence"))?;
    let row = logits
        .get(last..last + vocab)
        .filter(|row| !row.is_empty())
        .ok_or_else(|| anyhow::anyhow!("decoder logits do not match shape {dims:?}"))?;
    Ok(argmax(row) as i64)
}

/// Whether the model declares an input with this name.
pub(crate) fn has_input(session: &Session, name: &str) -> bool {
    session.inputs().iter().any(|input| input.name() == name)
}

pub(crate) fn load_session(model_dir: &Path, file: &str) -> anyhow::Result<Session> {
    let path = model_dir.join(file);
    anyhow::ensure!(path.exists(), "{file} not found in {model_dir:?}");
    Ok(Session::builder()?.commit_from_file(&path)?)
}

pub(crate) fn load_tokenizer(model_dir: &Path) -> anyhow::Result<Tokenizer> {
    let path = model_dir.join("tokenizer.json");
    anyhow::ensure!(path.exists(), "tokenizer.json not found in {model_dir:?}");
    Tokenizer::from_file(&path).map_err(|e| anyhow::anyhow!("load tokenizer: {e}"))
}

/// Parse a JSON config file from the model directory.
pub(crate) fn load_json<T: DeserializeOwned>(model_dir: &Path, file: &str) -> anyhow::Result<T> {
    let path = model_dir.join(file);
    let text = std::fs::read_to_string(&path)
        .map_err(|e| anyhow::anyhow!("read {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| anyhow::anyhow!("parse {}: {e}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn softmax_sums_to_one_and_keeps_order() {
        let p = softmax(&[2.0, 1.0, 0.1]);
        let sum: f32 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        assert!(p[0] > p[1] && p[1] > p[2]);
    }

    #[test]
    fn softmax_handles_large_logits() {
        let p = softmax(&[1000.0, 1000.0]);
        assert!((p[0] - 0.5).abs() < 1e-5);
        assert!(p.iter().all(|x| x.is_finite()));
    }

    #[test]
    fn softmax_empty() {
        assert!(softmax(&[]).is_empty());
    }

    #[test]
    fn next_token_reads_last_position() {
        let logits = [0.9, 0.1, 0.0, 0.2, 0.1, 0.7];
        assert_eq!(next_token(&[1, 2, 3], &logits).unwrap(), 2);
        assert_eq!(next_token(&[1, 1, 3], &logits[..3]).unwrap(), 0);
    }

    #[test]
    fn next_token_rejects_degenerate_output() {
        let err = next_token(&[1, 0, 3], &[]).unwrap_err();
        assert!(err.to_string().contains("empty sequence"));
        assert!(next_token(&[1, 3], &[0.0; 3]).is_err());
        assert!(next_token(&[1, 2, 3], &[0.0; 4]).is_err());
        assert!(next_token(&[1, 1, 0], &[]).is_err());
        assert!(next_token(&[1, -1, 3], &[0.0; 3]).is_err());
    }

    #[test]
    fn argmax_prefers_first_on_tie() {
        assert_eq!(argmax(&[0.1, 0.9, 0.9, 0.2]), 1);
        assert_eq!(argmax(&[-3.0]), 0);
    }
}
