//! Embedding provider: owns the pretrained model's lifecycle and exposes
//! single-text inference behind the `Embedder` trait.
//!
//! The model is resolved from a local cache and loaded exactly once; the
//! returned handle is passed explicitly to every call site. A deterministic
//! `FakeEmbedder` is available behind `APP_USE_FAKE_EMBEDDINGS=1` so tests
//! and development never need weights on disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use candle_core::{Device, Tensor};
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config as BertConfig, DTYPE};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use textvec_core::config::{expand_path, Config};
use textvec_core::error::Error;
use textvec_core::traits::Embedder;

mod device;
mod pool;
mod tokenize;

pub const DEFAULT_MODEL_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";
pub const DEFAULT_MAX_LEN: usize = 256;

/// Dimensionality of the fake embedder; matches the MiniLM family.
const FAKE_DIM: usize = 384;

/// Resolved model configuration, fixed at process start.
#[derive(Debug, Clone)]
pub struct ModelSpec {
    pub id: String,
    pub dir: Option<PathBuf>,
    pub max_len: usize,
}

impl ModelSpec {
    pub fn from_config(config: &Config) -> Self {
        let id = config
            .get::<String>("model.id")
            .unwrap_or_else(|_| DEFAULT_MODEL_ID.to_string());
        let dir = config.get::<String>("model.dir").ok().map(expand_path);
        let max_len = config.get::<usize>("model.max_len").unwrap_or(DEFAULT_MAX_LEN);
        Self { id, dir, max_len }
    }

    /// Short model name: the last segment of the identifier.
    pub fn name(&self) -> &str {
        self.id.rsplit('/').next().unwrap_or(&self.id)
    }
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self { id: DEFAULT_MODEL_ID.to_string(), dir: None, max_len: DEFAULT_MAX_LEN }
    }
}

/// MiniLM sentence embedder on a candle BERT backbone.
///
/// Loaded once per process; `embed` tokenizes with truncation, runs the
/// forward pass, then applies attention-masked mean pooling and L2
/// normalization, which is this model family's documented pipeline.
pub struct MiniLmEmbedder {
    model: BertModel,
    tokenizer: Tokenizer,
    device: Device,
    dim: usize,
    max_len: usize,
}

impl std::fmt::Debug for MiniLmEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniLmEmbedder")
            .field("device", &self.device)
            .field("dim", &self.dim)
            .field("max_len", &self.max_len)
            .finish_non_exhaustive()
    }
}

impl MiniLmEmbedder {
    pub fn load(spec: &ModelSpec) -> Result<Self> {
        let device = device::select_device();
        let model_dir = resolve_model_dir(spec)?;
        info!(model = %spec.id, dir = %model_dir.display(), "loading embedding model");

        let tokenizer_path = model_dir.join("tokenizer.json");
        let tokenizer = Tokenizer::from_file(&tokenizer_path).map_err(|e| {
            Error::ModelUnavailable(format!(
                "failed to load tokenizer from {}: {}",
                tokenizer_path.display(),
                e
            ))
        })?;

        let config_path = model_dir.join("config.json");
        let config_text = std::fs::read_to_string(&config_path).map_err(|e| {
            Error::ModelUnavailable(format!("failed to read {}: {}", config_path.display(), e))
        })?;
        let config: BertConfig = serde_json::from_str(&config_text).map_err(|e| {
            Error::ModelUnavailable(format!("invalid model config {}: {}", config_path.display(), e))
        })?;
        // The candle config keeps its fields private; read D from the raw JSON.
        let raw: serde_json::Value = serde_json::from_str(&config_text)?;
        let dim = raw
            .get("hidden_size")
            .and_then(serde_json::Value::as_u64)
            .map(|v| v as usize)
            .ok_or_else(|| {
                Error::ModelUnavailable(format!("missing hidden_size in {}", config_path.display()))
            })?;

        let vb = load_weights(&model_dir, &device)?;
        let model = BertModel::load(vb, &config)
            .map_err(|e| Error::ModelUnavailable(format!("failed to build model graph: {e}")))?;

        info!(dim, max_len = spec.max_len, "model ready");
        Ok(Self { model, tokenizer, device, dim, max_len: spec.max_len })
    }

    fn embed_text(&self, text: &str) -> Result<Vec<f32>> {
        let start = Instant::now();
        let (input_ids, attention_mask) =
            tokenize::tokenize_on_device(&self.tokenizer, text, self.max_len, &self.device)?;
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = self
            .model
            .forward(&input_ids, &token_type_ids, Some(&attention_mask))
            .map_err(|e| Error::Inference(format!("forward pass failed: {e}")))?;
        let pooled = pool::masked_mean(&hidden, &attention_mask)?;
        let normalized = pool::l2_normalize(&pooled)?;
        let vector: Vec<f32> = normalized.to_device(&Device::Cpu)?.squeeze(0)?.to_vec1()?;
        debug!(
            elapsed_ms = start.elapsed().as_millis() as u64,
            dim = vector.len(),
            "embedded input"
        );
        Ok(vector)
    }
}

impl Embedder for MiniLmEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }
    fn max_len(&self) -> usize {
        self.max_len
    }
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.embed_text(text)
    }
}

fn load_weights(model_dir: &Path, device: &Device) -> Result<VarBuilder<'static>> {
    let safetensors = model_dir.join("model.safetensors");
    if safetensors.exists() {
        let vb = unsafe { VarBuilder::from_mmaped_safetensors(&[safetensors], DTYPE, device)? };
        return Ok(vb);
    }
    let pickle = model_dir.join("pytorch_model.bin");
    if pickle.exists() {
        let weights = candle_core::pickle::read_all(&pickle)?;
        let weights_map: HashMap<String, Tensor> = weights.into_iter().collect();
        return Ok(VarBuilder::from_tensors(weights_map, DTYPE, device));
    }
    Err(Error::ModelUnavailable(format!(
        "no model.safetensors or pytorch_model.bin under {}",
        model_dir.display()
    ))
    .into())
}

/// Locate the model directory: env overrides first, then the configured
/// directory, then conventional `models/<name>` locations. Missing
/// everywhere is fatal; the diagnostic names every location tried.
fn resolve_model_dir(spec: &ModelSpec) -> Result<PathBuf> {
    let mut tried: Vec<String> = Vec::new();
    for var in ["APP_MODEL_DIR", "MODEL_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            let p = expand_path(&dir);
            if p.exists() {
                info!(dir = %p.display(), "using model dir from {}", var);
                return Ok(p);
            }
            tried.push(format!("{}={}", var, p.display()));
        }
    }
    if let Some(dir) = &spec.dir {
        if dir.exists() {
            return Ok(dir.clone());
        }
        tried.push(dir.display().to_string());
    }
    for candidate in [
        Path::new("models").join(spec.name()),
        Path::new("../models").join(spec.name()),
    ] {
        if candidate.exists() {
            return Ok(candidate);
        }
        tried.push(candidate.display().to_string());
    }
    Err(Error::ModelUnavailable(format!(
        "could not locate model '{}'; tried: {}",
        spec.id,
        tried.join(", ")
    ))
    .into())
}

/// Deterministic hash-based embedder for tests and development. Vectors
/// are L2-normalized and depend only on the input tokens.
pub struct FakeEmbedder {
    dim: usize,
}

impl FakeEmbedder {
    pub fn new(dim: usize) -> Self {
        Self { dim }
    }
}

impl Embedder for FakeEmbedder {
    fn dim(&self) -> usize {
        self.dim
    }
    fn max_len(&self) -> usize {
        DEFAULT_MAX_LEN
    }
    fn embed(&self, text: &str) -> Result<Vec<f32>> {
        use std::hash::{Hash, Hasher};
        use twox_hash::XxHash64;
        let mut v = vec![0f32; self.dim];
        for (i, token) in text.split_whitespace().enumerate() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let h = hasher.finish();
            let idx = (h as usize) % self.dim;
            let val = (((h >> 32) as u32) as f32) / (u32::MAX as f32);
            v[idx] += val + (i as f32 % 3.0) * 0.01;
        }
        let norm = (v.iter().map(|x| x * x).sum::<f32>()).sqrt().max(1e-6);
        for x in &mut v {
            *x /= norm;
        }
        Ok(v)
    }
}

/// Build the process-wide embedder handle. Called once from `main`;
/// `APP_USE_FAKE_EMBEDDINGS=1` selects the fake provider.
pub fn get_default_embedder(spec: &ModelSpec) -> Result<Box<dyn Embedder>> {
    let use_fake = std::env::var("APP_USE_FAKE_EMBEDDINGS")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    if use_fake {
        info!("using FakeEmbedder");
        return Ok(Box::new(FakeEmbedder::new(FAKE_DIM)));
    }
    Ok(Box::new(MiniLmEmbedder::load(spec)?))
}
