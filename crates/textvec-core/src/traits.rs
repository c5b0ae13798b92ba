pub trait Embedder: Send + Sync {
    /// Embedding dimensionality (D), fixed for the lifetime of the handle.
    fn dim(&self) -> usize;
    /// Maximum token length; longer inputs are truncated inside `embed`.
    fn max_len(&self) -> usize;
    /// Map one text to a D-length vector. Accepts the empty string.
    fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Convenience over `embed`; no batching semantics beyond a loop.
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}
