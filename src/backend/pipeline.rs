//! Backend fragments to display chunks.

use crate::backend::{Backend, FragmentStream, GenerateRequest};
use crate::core::Chunk;
use crate::error::{Error, Result};
use crate::segment::{SegmentConfig, StreamSegmenter};
use crate::stream::encode_line;
use futures_util::StreamExt;
use std::collections::VecDeque;

/// Re-chunks a fragment stream.
///
/// When the backend fails midway, the text received so far is still
/// emitted, followed by exactly one error; the stream then ends.
///
/// [`next_chunk`](Self::next_chunk) and [`next_line`](Self::next_line) are
/// cancel-safe and can be used inside `tokio::select!`.
pub struct ChunkStream {
    fragments: FragmentStream,
    segmenter: StreamSegmenter,
    ready: VecDeque<Chunk>,
    failure: Option<Error>,
    finished: bool,
}

impl std::fmt::Debug for ChunkStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("segmenter", &self.segmenter)
            .field("ready", &self.ready.len())
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

impl ChunkStream {
    /// Wraps a fragment stream.
    #[must_use]
    pub fn new(fragments: FragmentStream, config: SegmentConfig) -> Self {
        let segmenter = StreamSegmenter::new(config).unwrap_or_else(|err| {
            tracing::warn!(error = %err, "invalid segment config, using streaming rules");
            StreamSegmenter::streaming()
        });
        Self {
            fragments,
            segmenter,
            ready: VecDeque::new(),
            failure: None,
            finished: false,
        }
    }

    /// Returns the next chunk, the terminal error, or `None` at the end.
    pub async fn next_chunk(&mut self) -> Option<Result<Chunk>> {
        loop {
            if let Some(chunk) = self.ready.pop_front() {
                return Some(Ok(chunk));
            }
            if let Some(err) = self.failure.take() {
                return Some(Err(err));
            }
            if self.finished {
                return None;
            }

            match self.fragments.next().await {
                Some(Ok(fragment)) => {
                    let chunks = self.segmenter.push_str(&fragment);
                    self.ready.extend(chunks);
                }
                Some(Err(err)) => {
                    tracing::warn!(error = %err, "generation failed midway");
                    self.flush();
                    self.failure = Some(err);
                    self.finished = true;
                }
                None => {
                    self.flush();
                    self.finished = true;
                }
            }
        }
    }

    /// Returns the next chunk encoded as a wire line.
    pub async fn next_line(&mut self) -> Option<Result<String>> {
        loop {
            match self.next_chunk().await? {
                Ok(chunk) => {
                    if let Some(line) = encode_line(&chunk.content) {
                        return Some(Ok(line));
                    }
                }
                Err(err) => return Some(Err(err)),
            }
        }
    }

    /// Drains the stream into a vector.
    ///
    /// # Errors
    ///
    /// Returns the terminal error, discarding the chunks received before it.
    pub async fn collect(mut self) -> Result<Vec<Chunk>> {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            chunks.push(chunk?);
        }
        Ok(chunks)
    }

    /// Drains the stream, keeping the chunks that arrived before a failure.
    pub async fn collect_partial(mut self) -> (Vec<Chunk>, Option<Error>) {
        let mut chunks = Vec::new();
        while let Some(chunk) = self.next_chunk().await {
            match chunk {
                Ok(chunk) => chunks.push(chunk),
                Err(err) => return (chunks, Some(err)),
            }
        }
        (chunks, None)
    }

    fn flush(&mut self) {
        match self.segmenter.finish() {
            Ok(chunk) => self.ready.extend(chunk),
            Err(err) => self.failure = Some(err),
        }
    }
}

/// Starts a generation and re-chunks its output.
///
/// # Errors
///
/// Returns an error if the request is invalid or the backend fails to start.
pub async fn generate_chunks(backend: &dyn Backend, request: &GenerateRequest) -> Result<ChunkStream> {
    request.validate()?;
    tracing::info!(
        backend = backend.name(),
        category = %request.category,
        "generating caption"
    );
    let fragments = backend.generate(request).await?;
    Ok(ChunkStream::new(fragments, backend.segment_config()))
}
