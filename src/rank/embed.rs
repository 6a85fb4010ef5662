//! Text embedding backends and vector similarity.

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;

/// Default dimension of [`HashingEmbedder`] vectors.
pub const DEFAULT_DIMENSION: usize = 384;

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// Turns text into fixed-length vectors.
///
/// Implement this trait to plug in a neural sentence encoder. All vectors
/// produced by one embedder must share [`Embedder::dimension`].
pub trait Embedder {
    /// Embed a section of document text.
    fn embed_document(&mut self, text: &str) -> Result<Vec<f32>>;

    /// Embed a search query.
    ///
    /// Defaults to the document embedding; override for asymmetric models.
    fn embed_query(&mut self, text: &str) -> Result<Vec<f32>> {
        self.embed_document(text)
    }

    /// Embed several documents.
    ///
    /// Default implementation calls `embed_document` in a loop.
    /// Override for backends with native batch support.
    fn embed_batch(&mut self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|text| self.embed_document(text)).collect()
    }

    /// Length of every produced vector.
    fn dimension(&self) -> usize;
}

/// Bag-of-words embedder using the hashing trick.
///
/// Text is NFKC-normalised and lowercased, split into alphanumeric
/// tokens, and each token adds its term frequency to one of `dimension`
/// buckets. Vectors are L2-normalised. Buckets come from 64-bit FNV-1a
/// over the token's UTF-8 bytes, so the same text maps to the same vector
/// on every platform and toolchain, and ranking works without a model
/// runtime.
#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    /// Create an embedder with the given number of buckets (at least 1).
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, token: &str) -> usize {
        (fnv1a(token.as_bytes()) % self.dimension as u64) as usize
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_DIMENSION)
    }
}

impl Embedder for HashingEmbedder {
    fn embed_document(&mut self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; self.dimension];
        for token in tokenize(text) {
            vector[self.bucket(&token)] += 1.0;
        }
        l2_normalize(&mut vector);
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// 64-bit FNV-1a hash.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &b| {
        (hash ^ u64::from(b)).wrapping_mul(FNV_PRIME)
    })
}

/// Lowercased alphanumeric tokens of NFKC-normalised text.
pub fn tokenize(text: &str) -> Vec<String> {
    let normalized: String = text.nfkc().collect::<String>().to_lowercase();
    normalized
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Scale a vector to unit length in place; zero vectors are left as is.
pub fn l2_normalize(vector: &mut [f32]) {
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in vector.iter_mut() {
            *x /= norm;
        }
    }
}

/// Cosine similarity of two vectors.
///
/// Returns 0.0 for vectors of different length, empty vectors, a
/// zero-norm operand, or a non-finite result (NaN or infinite components).
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    let similarity = dot / (norm_a * norm_b);
    if similarity.is_finite() {
        similarity
    } else {
        0.0
    }
}
