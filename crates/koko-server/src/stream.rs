//! Frame chunking and pacing for the event stream.

use koko_config::StreamingConfig;
use koko_protocol::StreamFrame;
use std::time::Duration;
use tokio::sync::mpsc;

/// Slice text into delta-frame chunks on character boundaries.
pub fn chunk_text(text: &str, chunk_chars: usize) -> Vec<String> {
    if text.is_empty() || chunk_chars == 0 {
        return Vec::new();
    }
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(chunk_chars)
        .map(|chunk| chunk.iter().collect())
        .collect()
}

/// Emit the final text as delta frames followed by the done marker.
///
/// Pacing is cosmetic and defaults to zero delay; a dropped receiver stops
/// the emission early (the done marker is then unobservable anyway).
pub async fn emit_frames(tx: mpsc::Sender<StreamFrame>, text: &str, pacing: &StreamingConfig) {
    if pacing.initial_delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(pacing.initial_delay_ms)).await;
    }
    for chunk in chunk_text(text, pacing.chunk_chars) {
        if tx.send(StreamFrame::delta(chunk)).await.is_err() {
            return;
        }
        if pacing.inter_chunk_delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(pacing.inter_chunk_delay_ms)).await;
        }
    }
    let _ = tx.send(StreamFrame::done()).await;
}
