//! Audio front end for Whisper: decoding any container symphonia knows
//! (WAV, FLAC, MP3, Ogg Vorbis, M4A/AAC, ...), band-limited resampling and
//! the 80-bin log-mel spectrogram.

use std::f32::consts::PI;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use rubato::{FftFixedIn, Resampler};
use rustfft::num_complex::Complex;
use rustfft::{Fft, FftPlanner};
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as DecodeError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use tracing::{debug, warn};

pub const SAMPLE_RATE: u32 = 16_000;
pub const N_FFT: usize = 400;
pub const HOP_LENGTH: usize = 160;
pub const N_MELS: usize = 80;
pub const CHUNK_SECONDS: usize = 30;
/// Samples in one 30 s window.
pub const N_SAMPLES: usize = CHUNK_SECONDS * SAMPLE_RATE as usize;
/// Mel frames in one 30 s window.
pub const N_FRAMES: usize = N_SAMPLES / HOP_LENGTH;

const N_FREQS: usize = N_FFT / 2 + 1;

/// Input frames per resampler call.
const RESAMPLE_CHUNK: usize = 1024;

/// Decoded mono audio.
#[derive(Debug, Clone)]
pub struct Pcm {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

/// Decode the first audio track of `path`, averaging channels to mono.
///
/// The file extension is only a hint; the container is detected from its
/// content. Corrupt packets are skipped with a warning.
pub fn read_audio(path: &Path) -> anyhow::Result<Pcm> {
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }
    let detected = symphonia::default::get_probe()
        .format(&hint, stream, &FormatOptions::default(), &MetadataOptions::default())
        .with_context(|| format!("unrecognized audio format: {}", path.display()))?;
    let mut format = detected.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .with_context(|| format!("{} has no audio track", path.display()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;
    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .context("unsupported audio codec")?;

    let mut samples = Vec::new();
    let mut buffer: Option<SampleBuffer<f32>> = None;
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(DecodeError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
            Err(DecodeError::ResetRequired) => break,
            Err(e) => return Err(e).context("reading audio packet"),
        };
        if packet.track_id() != track_id {
            continue;
        }
        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(DecodeError::DecodeError(e)) => {
                warn!(error = e, "skipping corrupt audio packet");
                continue;
            }
            Err(e) => return Err(e).context("decoding audio"),
        };

        let spec = *decoded.spec();
        let channels = spec.channels.count();
        let frames = decoded.capacity();
        sample_rate = sample_rate.or(Some(spec.rate));
        let buf = buffer.get_or_insert_with(|| SampleBuffer::new(frames as u64, spec));
        if buf.capacity() < frames * channels {
            *buf = SampleBuffer::new(frames as u64, spec);
        }
        buf.copy_interleaved_ref(decoded);
        samples.extend(downmix(buf.samples(), channels));
    }

    let sample_rate = sample_rate.with_context(|| format!("{} has no sample rate", path.display()))?;
    debug!(samples = samples.len(), sample_rate, "decoded audio");
    Ok(Pcm {
        samples,
        sample_rate,
    })
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

/// Resample mono audio with rubato's FFT resampler, which low-pass filters
/// at the lower Nyquist frequency. The output is aligned with the input
/// (the filter delay is removed) and has `len * to / from` samples.
pub fn resample(samples: &[f32], from: u32, to: u32) -> anyhow::Result<Vec<f32>> {
    if from == to || samples.is_empty() {
        return Ok(samples.to_vec());
    }
    let mut resampler = FftFixedIn::<f32>::new(from as usize, to as usize, RESAMPLE_CHUNK, 2, 1)
        .context("building resampler")?;
    let delay = resampler.output_delay();
    let expected = (samples.len() as u64 * u64::from(to) / u64::from(from)) as usize;

    let mut out = Vec::with_capacity(expected + delay + RESAMPLE_CHUNK);
    let mut pos = 0;
    while pos < samples.len() || out.len() < delay + expected {
        let need = resampler.input_frames_next();
        let end = (pos + need).min(samples.len());
        let mut chunk = samples[pos..end].to_vec();
        chunk.resize(need, 0.0);
        pos = end;
        let block = resampler.process(&[chunk], None).context("resampling")?;
        out.extend_from_slice(&block[0]);
    }
    out.drain(..delay);
    out.truncate(expected);
    Ok(out)
}

/// Log-mel spectrogram extractor matching Whisper's feature pipeline.
pub struct LogMel {
    filters: Vec<f32>,
    window: Vec<f32>,
    fft: Arc<dyn Fft<f32>>,
}

impl Default for LogMel {
    fn default() -> Self {
        Self::new()
    }
}

impl LogMel {
    pub fn new() -> Self {
        let mut planner = FftPlanner::<f32>::new();
        Self {
            filters: mel_filters(SAMPLE_RATE, N_FFT, N_MELS),
            window: hann_window(N_FFT),
            fft: planner.plan_fft_forward(N_FFT),
        }
    }

    /// Features for one window: `[N_MELS, N_FRAMES]` row-major.
    ///
    /// Input longer than 30 s is cut, shorter input is zero-padded.
    pub fn compute(&self, samples: &[f32]) -> Vec<f32> {
        let mut audio = samples[..samples.len().min(N_SAMPLES)].to_vec();
        audio.resize(N_SAMPLES, 0.0);
        let padded = reflect_pad(&audio, N_FFT / 2);

        let mut buffer = vec![Complex::new(0.0f32, 0.0); N_FFT];
        let mut scratch = vec![Complex::new(0.0f32, 0.0); self.fft.get_inplace_scratch_len()];
        let mut power = vec![0.0f32; N_FREQS];
        let mut mel = vec![0.0f32; N_MELS * N_FRAMES];

        // The STFT yields N_FRAMES + 1 frames; the last one is dropped.
        for t in 0..N_FRAMES {
            let start = t * HOP_LENGTH;
            for (i, b) in buffer.iter_mut().enumerate() {
                *b = Complex::new(padded[start + i] * self.window[i], 0.0);
            }
            self.fft.process_with_scratch(&mut buffer, &mut scratch);
            for (k, p) in power.iter_mut().enumerate() {
                *p = buffer[k].norm_sqr();
            }
            for m in 0..N_MELS {
                let row = &self.filters[m * N_FREQS..(m + 1) * N_FREQS];
                let energy: f32 = row.iter().zip(&power).map(|(w, p)| w * p).sum();
                mel[m * N_FRAMES + t] = energy.max(1e-10).log10();
            }
        }

        let max = mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        for v in &mut mel {
            *v = ((*v).max(max - 8.0) + 4.0) / 4.0;
        }
        mel
    }
}

/// Periodic Hann window.
fn hann_window(n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| 0.5 - 0.5 * (2.0 * PI * i as f32 / n as f32).cos())
        .collect()
}

/// Reflect-pad (edge sample excluded) by `pad` on both sides.
fn reflect_pad(samples: &[f32], pad: usize) -> Vec<f32> {
    let n = samples.len();
    let mut out = Vec::with_capacity(n + 2 * pad);
    out.extend((1..=pad).rev().map(|i| samples[i.min(n - 1)]));
    out.extend_from_slice(samples);
    out.extend((0..pad).map(|i| samples[n.saturating_sub(2 + i)]));
    out
}

fn hz_to_mel(hz: f32) -> f32 {
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = 15.0;
    let logstep = 6.4f32.ln() / 27.0;
    if hz >= MIN_LOG_HZ {
        MIN_LOG_MEL + (hz / MIN_LOG_HZ).ln() / logstep
    } else {
        3.0 * hz / 200.0
    }
}

fn mel_to_hz(mel: f32) -> f32 {
    const MIN_LOG_HZ: f32 = 1000.0;
    const MIN_LOG_MEL: f32 = 15.0;
    let logstep = 6.4f32.ln() / 27.0;
    if mel >= MIN_LOG_MEL {
        MIN_LOG_HZ * (logstep * (mel - MIN_LOG_MEL)).exp()
    } else {
        200.0 * mel / 3.0
    }
}

/// Slaney-style mel filterbank, `[n_mels, n_fft / 2 + 1]` row-major.
pub fn mel_filters(sample_rate: u32, n_fft: usize, n_mels: usize) -> Vec<f32> {
    let n_freqs = n_fft / 2 + 1;
    let fft_freqs: Vec<f32> = (0..n_freqs)
        .map(|i| i as f32 * sample_rate as f32 / n_fft as f32)
        .collect();

    let mel_max = hz_to_mel(sample_rate as f32 / 2.0);
    let mel_points: Vec<f32> = (0..n_mels + 2)
        .map(|i| mel_to_hz(mel_max * i as f32 / (n_mels + 1) as f32))
        .collect();

    let mut filters = vec![0.0f32; n_mels * n_freqs];
    for m in 0..n_mels {
        let (lower, center, upper) = (mel_points[m], mel_points[m + 1], mel_points[m + 2]);
        let enorm = 2.0 / (upper - lower);
        for (k, &f) in fft_freqs.iter().enumerate() {
            let rising = (f - lower) / (center - lower);
            let falling = (upper - f) / (upper - center);
            filters[m * n_freqs + k] = rising.min(falling).max(0.0) * enorm;
        }
    }
    filters
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_constants() {
        assert_eq!(N_SAMPLES, 480_000);
        assert_eq!(N_FRAMES, 3000);
    }

    #[test]
    fn hann_is_periodic() {
        let w = hann_window(4);
        assert!(w[0].abs() < 1e-6);
        assert!((w[2] - 1.0).abs() < 1e-6);
        assert!((w[1] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn reflect_pad_mirrors_without_edge() {
        let out = reflect_pad(&[1.0, 2.0, 3.0, 4.0], 2);
        assert_eq!(out, [3.0, 2.0, 1.0, 2.0, 3.0, 4.0, 3.0, 2.0]);
    }

    #[test]
    fn mel_scale_round_trips() {
        for hz in [0.0, 440.0, 1000.0, 4000.0, 8000.0] {
            assert!((mel_to_hz(hz_to_mel(hz)) - hz).abs() < 0.5, "{hz}");
        }
    }

    #[test]
    fn filterbank_shape_and_coverage() {
        let filters = mel_filters(SAMPLE_RATE, N_FFT, N_MELS);
        assert_eq!(filters.len(), N_MELS * N_FREQS);
        assert!(filters.iter().all(|&w| w >= 0.0));
        for m in 0..N_MELS {
            let row = &filters[m * N_FREQS..(m + 1) * N_FREQS];
            assert!(row.iter().any(|&w| w > 0.0), "mel bin {m} is empty");
        }
    }

    fn tone(freq: f32, rate: u32, len: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f32 / rate as f32).sin())
            .collect()
    }

    fn rms(samples: &[f32]) -> f32 {
        (samples.iter().map(|s| s * s).sum::<f32>() / samples.len() as f32).sqrt()
    }

    #[test]
    fn resample_keeps_duration_and_passband() {
        let input = tone(1_000.0, 48_000, 48_000);
        let out = resample(&input, 48_000, SAMPLE_RATE).unwrap();
        assert_eq!(out.len(), 16_000);
        // Away from the edges a 1 kHz tone passes at full level.
        let level = rms(&out[1_000..15_000]);
        assert!((level - std::f32::consts::FRAC_1_SQRT_2).abs() < 0.05, "{level}");
    }

    #[test]
    fn resample_filters_above_target_nyquist() {
        // 12 kHz folds to 4 kHz at 16 kHz unless it is filtered first.
        let input = tone(12_000.0, 48_000, 48_000);
        let out = resample(&input, 48_000, SAMPLE_RATE).unwrap();
        assert_eq!(out.len(), 16_000);
        assert!(rms(&out[1_000..15_000]) < 0.05);
    }

    #[test]
    fn resample_odd_ratio() {
        let input = tone(440.0, 44_100, 22_050);
        let out = resample(&input, 44_100, SAMPLE_RATE).unwrap();
        assert_eq!(out.len(), 8_000);
    }

    #[test]
    fn resample_same_rate_is_identity() {
        let input = vec![0.1, 0.2, 0.3];
        assert_eq!(resample(&input, 16_000, 16_000).unwrap(), input);
    }

    #[test]
    fn downmix_averages_channels() {
        assert_eq!(downmix(&[1.0, 0.0, 0.5, 0.5], 2), [0.5, 0.5]);
    }

    #[test]
    fn log_mel_of_silence_is_flat() {
        let mel = LogMel::new().compute(&[]);
        assert_eq!(mel.len(), N_MELS * N_FRAMES);
        let first = mel[0];
        assert!(mel.iter().all(|&v| (v - first).abs() < 1e-6));
        // log10(1e-10) = -10, normalized to (-10 + 4) / 4.
        assert!((first + 1.5).abs() < 1e-5);
    }

    #[test]
    fn log_mel_dynamic_range_is_clamped() {
        let tone: Vec<f32> = (0..SAMPLE_RATE as usize)
            .map(|i| (2.0 * PI * 440.0 * i as f32 / SAMPLE_RATE as f32).sin())
            .collect();
        let mel = LogMel::new().compute(&tone);
        let max = mel.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let min = mel.iter().copied().fold(f32::INFINITY, f32::min);
        assert!(max - min <= 2.0 + 1e-4);
    }

    fn fixture(name: &str) -> std::path::PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn read_audio_wav_stereo_int16() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 8_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut writer = hound::WavWriter::create(&path, spec).unwrap();
        for _ in 0..100 {
            writer.write_sample(i16::MAX).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let pcm = read_audio(&path).unwrap();
        assert_eq!(pcm.sample_rate, 8_000);
        assert_eq!(pcm.samples.len(), 100);
        assert!((pcm.samples[0] - 0.5).abs() < 1e-3);
    }

    #[test]
    fn read_audio_flac() {
        // 0.25 s of a 440 Hz tone at half scale on the left channel only.
        let pcm = read_audio(&fixture("tone_440hz_8k_stereo.flac")).unwrap();
        assert_eq!(pcm.sample_rate, 8_000);
        assert_eq!(pcm.samples.len(), 2_000);
        let peak = pcm.samples.iter().fold(0.0f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.25).abs() < 0.01, "{peak}");
    }

    #[test]
    fn read_audio_detects_format_despite_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("upload.mp3");
        std::fs::copy(fixture("tone_440hz_8k_stereo.flac"), &path).unwrap();
        let pcm = read_audio(&path).unwrap();
        assert_eq!(pcm.samples.len(), 2_000);

        let bare = dir.path().join("upload");
        std::fs::copy(fixture("tone_440hz_8k_stereo.flac"), &bare).unwrap();
        assert_eq!(read_audio(&bare).unwrap().sample_rate, 8_000);
    }

    #[test]
    fn read_audio_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.ogg");
        std::fs::write(&path, b"not an audio file").unwrap();
        let err = read_audio(&path).unwrap_err();
        assert!(format!("{err:#}").contains("unrecognized audio format"));
        assert!(read_audio(&dir.path().join("missing.wav")).is_err());
    }
}
