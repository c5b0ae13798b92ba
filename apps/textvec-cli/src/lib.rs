//! The adapter: connects the process's stdin/stdout to an embedding
//! provider. One document in, one JSON line out.

use std::io::{Read, Write};

use anyhow::Result;
use textvec_core::error::Error;
use textvec_core::traits::Embedder;
use textvec_core::types::EmbeddingRecord;

/// Read the input channel to EOF and strip surrounding whitespace.
/// Trailing newlines from interactive input are not semantic content.
pub fn read_input<R: Read>(mut reader: R) -> Result<String> {
    let mut buf = String::new();
    reader
        .read_to_string(&mut buf)
        .map_err(|e| Error::Input(format!("failed to read input: {e}")))?;
    Ok(buf.trim().to_string())
}

/// One pass through the pipeline: read, embed once, emit one JSON line.
///
/// The record is serialized in full before the output channel is touched,
/// so stdout carries either the whole object or nothing.
pub fn run<R: Read, W: Write>(input: R, mut output: W, embedder: &dyn Embedder) -> Result<()> {
    let text = read_input(input)?;
    let vector = embedder.embed(&text)?;
    let record = EmbeddingRecord::new(vector);
    let line = serde_json::to_string(&record)?;
    output.write_all(line.as_bytes())?;
    output.write_all(b"\n")?;
    output.flush()?;
    Ok(())
}
