//! Text embedding behind a narrow seam, so ranking and detection logic can
//! be tested with a deterministic stub instead of a real model.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),
    #[error("malformed embedding response: {0}")]
    Response(String),
    #[error("embedding service returned an empty vector")]
    Empty,
}

/// Maps any string to a fixed-length numeric vector. Implementations are
/// expected to be deterministic for a given input.
pub trait Embedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}

/// Cosine similarity between two vectors. Zero-norm input yields 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;

    for i in 0..a.len().min(b.len()) {
        dot += a[i] * b[i];
        norm_a += a[i] * a[i];
        norm_b += b[i] * b[i];
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom < 1e-10 { 0.0 } else { dot / denom }
}

/// Client for an HTTP embedding service (e.g. a sentence-transformers
/// sidecar). POSTs `{"text": ...}` and expects `{"embedding": [...]}`.
pub struct HttpEmbedder {
    agent: ureq::Agent,
    endpoint: String,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct EmbedResponse {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self {
            agent,
            endpoint: endpoint.into(),
        }
    }
}

impl Embedder for HttpEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let resp: EmbedResponse = self
            .agent
            .post(&self.endpoint)
            .send_json(&EmbedRequest { text })
            .map_err(|e| EmbedError::Request(e.to_string()))?
            .body_mut()
            .read_json()
            .map_err(|e| EmbedError::Response(e.to_string()))?;

        if resp.embedding.is_empty() {
            return Err(EmbedError::Empty);
        }
        Ok(resp.embedding)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_identical() {
        let a = vec![1.0, 2.0, 3.0];
        let sim = cosine_similarity(&a, &a);
        assert!((sim - 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_orthogonal() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-6);
    }

    #[test]
    fn cosine_opposite() {
        let a = vec![1.0, 2.0, 3.0];
        let b = vec![-1.0, -2.0, -3.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn cosine_zero_norm_is_zero() {
        let a = vec![0.0, 0.0];
        let b = vec![1.0, 1.0];
        assert_eq!(cosine_similarity(&a, &b), 0.0);
    }

    #[test]
    fn unreachable_endpoint_fails_within_the_timeout() {
        // Discard port: nothing listens there, and the global timeout bounds
        // the call even if the connection just hangs.
        let embedder = HttpEmbedder::new("http://127.0.0.1:9/embed", Duration::from_millis(250));
        let start = std::time::Instant::now();
        match embedder.embed("rainy afternoon") {
            Err(EmbedError::Request(_)) => {}
            other => panic!("expected a request error, got {other:?}"),
        }
        assert!(start.elapsed() < Duration::from_secs(5));
    }
}
