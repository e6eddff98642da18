//! Sentence embeddings for semantic result deduplication.
//!
//! Uses `all-MiniLM-L6-v2` (384-dim) via ONNX Runtime. The model is
//! downloaded from HuggingFace Hub on first use and cached by `hf-hub`.
//!
//! # Pipeline
//!
//! ```text
//! comparison text → tokenizer → ONNX model → mean-pool → L2-normalize → 384-dim f32
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

use ort::session::{Session, SessionInputValue, SessionInputs};
use ort::value::Tensor;

use crate::error::{CurateError, Result};

/// HuggingFace repo for the all-MiniLM-L6-v2 ONNX model.
const REPO_ID: &str = "sentence-transformers/all-MiniLM-L6-v2";

/// ONNX model filename inside the repo.
const MODEL_FILE: &str = "onnx/model.onnx";

/// Tokenizer filename inside the repo.
const TOKENIZER_FILE: &str = "tokenizer.json";

/// Output embedding dimensions.
pub const EMBEDDING_DIM: usize = 384;

/// Maximum token sequence length per encode.
const MAX_TOKENS: usize = 256;

/// Process-wide engine handle, created on first use.
static SHARED: OnceLock<Option<Mutex<EmbeddingEngine>>> = OnceLock::new();

/// Returns the process-wide embedding engine, loading it on first call.
///
/// The first caller pays the download-and-load cost; concurrent first calls
/// are serialised by the `OnceLock` so the model is loaded at most once. A
/// load failure is remembered for the process lifetime and every call then
/// returns `None`, which routes the deduplicator to its lexical fallback.
pub fn shared() -> Option<&'static Mutex<EmbeddingEngine>> {
    SHARED
        .get_or_init(|| match EmbeddingEngine::download_and_load() {
            Ok(engine) => Some(Mutex::new(engine)),
            Err(err) => {
                tracing::warn!(error = %err, "embedding engine unavailable, falling back to lexical dedup");
                None
            }
        })
        .as_ref()
}

/// Sentence embedding engine backed by `all-MiniLM-L6-v2`.
///
/// Not thread-safe: [`embed`](Self::embed) requires `&mut self` because
/// `tokenizers::Tokenizer` needs exclusive access during encoding. For
/// shared concurrent use go through [`shared`], which wraps the engine in a
/// `Mutex`.
pub struct EmbeddingEngine {
    session: Session,
    tokenizer: tokenizers::Tokenizer,
}

impl std::fmt::Debug for EmbeddingEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingEngine")
            .field("dim", &EMBEDDING_DIM)
            .finish_non_exhaustive()
    }
}

impl EmbeddingEngine {
    /// Load an embedding engine from pre-downloaded model files.
    ///
    /// `model_path` must point to the ONNX model file, `tokenizer_path` to
    /// the `tokenizer.json` beside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the ONNX model or tokenizer cannot be loaded.
    pub fn new(model_path: &Path, tokenizer_path: &Path) -> Result<Self> {
        tracing::info!("loading embedding model: {}", model_path.display());
        let session = Session::builder()
            .and_then(|b| b.with_intra_threads(2))
            .and_then(|b| b.commit_from_file(model_path))
            .map_err(|e| CurateError::Embedding(format!("model load failed: {e}")))?;

        let mut tokenizer = tokenizers::Tokenizer::from_file(tokenizer_path)
            .map_err(|e| CurateError::Embedding(format!("tokenizer load failed: {e}")))?;

        // Cap sequence length so oversized snippets don't blow up inference.
        let truncation = tokenizers::TruncationParams {
            max_length: MAX_TOKENS,
            ..Default::default()
        };
        tokenizer
            .with_truncation(Some(truncation))
            .map_err(|e| CurateError::Embedding(format!("truncation config failed: {e}")))?;

        // Single-text encoding, no padding needed.
        tokenizer.with_padding(None);

        tracing::info!("embedding engine ready (dim={EMBEDDING_DIM})");

        Ok(Self { session, tokenizer })
    }

    /// Embed one text into a 384-dim unit-length f32 vector.
    ///
    /// # Errors
    ///
    /// Returns an error if tokenization or ONNX inference fails.
    pub fn embed(&mut self, text: &str) -> Result<Vec<f32>> {
        let encoding = self
            .tokenizer
            .encode(text, true)
            .map_err(|e| CurateError::Embedding(format!("tokenization failed: {e}")))?;

        let input_ids: Vec<i64> = encoding.get_ids().iter().map(|&id| id as i64).collect();
        let attention_mask: Vec<i64> = encoding
            .get_attention_mask()
            .iter()
            .map(|&m| m as i64)
            .collect();
        let token_type_ids: Vec<i64> = encoding.get_type_ids().iter().map(|&t| t as i64).collect();

        let seq_len = input_ids.len();

        let ids_tensor = Tensor::from_array(([1, seq_len], input_ids))
            .map_err(|e| CurateError::Embedding(format!("input_ids tensor failed: {e}")))?;
        let mask_tensor = Tensor::from_array(([1, seq_len], attention_mask.clone()))
            .map_err(|e| CurateError::Embedding(format!("attention_mask tensor failed: {e}")))?;
        let type_tensor = Tensor::from_array(([1, seq_len], token_type_ids))
            .map_err(|e| CurateError::Embedding(format!("token_type_ids tensor failed: {e}")))?;

        let mut feed: HashMap<String, SessionInputValue> = HashMap::new();
        feed.insert("input_ids".to_owned(), ids_tensor.into());
        feed.insert("attention_mask".to_owned(), mask_tensor.into());
        feed.insert("token_type_ids".to_owned(), type_tensor.into());

        let outputs = self
            .session
            .run(SessionInputs::from(feed))
            .map_err(|e| CurateError::Embedding(format!("inference failed: {e}")))?;

        // Output shape: [1, seq_len, 384], token-level embeddings.
        let (_shape, data) = outputs[0_usize]
            .try_extract_tensor::<f32>()
            .map_err(|e| CurateError::Embedding(format!("output extraction failed: {e}")))?;

        let pooled = mean_pool(data, &attention_mask, EMBEDDING_DIM);

        Ok(l2_normalize(&pooled))
    }

    /// Download the all-MiniLM-L6-v2 model files from HuggingFace Hub.
    ///
    /// Returns `(model_path, tokenizer_path)`. Files are cached by `hf-hub`
    /// and only downloaded on first call.
    ///
    /// # Errors
    ///
    /// Returns an error if the download fails.
    pub fn download_model() -> Result<(PathBuf, PathBuf)> {
        tracing::info!("fetching embedding model: {REPO_ID}");
        let api = hf_hub::api::sync::Api::new()
            .map_err(|e| CurateError::Embedding(format!("HF Hub API init failed: {e}")))?;
        let repo = api.model(REPO_ID.to_owned());

        let model_path = repo
            .get(MODEL_FILE)
            .map_err(|e| CurateError::Embedding(format!("failed to download {MODEL_FILE}: {e}")))?;

        let tokenizer_path = repo.get(TOKENIZER_FILE).map_err(|e| {
            CurateError::Embedding(format!("failed to download {TOKENIZER_FILE}: {e}"))
        })?;

        Ok((model_path, tokenizer_path))
    }

    /// Download the model and create an engine in one step.
    ///
    /// # Errors
    ///
    /// Returns an error if download or loading fails.
    pub fn download_and_load() -> Result<Self> {
        let (model_path, tokenizer_path) = Self::download_model()?;
        Self::new(&model_path, &tokenizer_path)
    }
}

/// Mean-pool token embeddings using the attention mask.
///
/// `flat` is shape `[mask.len(), dim]` stored row-major. `mask` holds 1 for
/// real tokens and 0 for padding.
fn mean_pool(flat: &[f32], mask: &[i64], dim: usize) -> Vec<f32> {
    let mut pooled = vec![0.0f32; dim];
    let mut count = 0.0f32;

    for (t, &m) in mask.iter().enumerate() {
        if m != 0 {
            let offset = t * dim;
            for (p, &f) in pooled.iter_mut().zip(&flat[offset..offset + dim]) {
                *p += f;
            }
            count += 1.0;
        }
    }

    if count > 0.0 {
        for p in &mut pooled {
            *p /= count;
        }
    }

    pooled
}

/// L2-normalize a vector. A zero-norm vector is returned unchanged.
fn l2_normalize(vec: &[f32]) -> Vec<f32> {
    let norm: f32 = vec.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm < 1e-12 {
        return vec.to_vec();
    }
    vec.iter().map(|x| x / norm).collect()
}

/// Compute cosine similarity between two equal-length vectors.
///
/// Returns a value in `[-1.0, 1.0]`; a zero-norm pair is defined as 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have equal length");
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    let denom = norm_a * norm_b;
    if denom < 1e-12 {
        return 0.0;
    }
    dot / denom
}
