//! Terminal playback of a caption.

use crate::backend::ChunkStream;
use crate::error::{Error, Result};
use crate::render::delay::DelayPolicy;
use crate::render::scheduler::TokioScheduler;
use crate::render::session::TypingSession;
use crate::stream::{MessageAssembler, NdjsonDecoder};
use std::io::Write;

fn emit<W: Write>(out: &mut W, text: &str) -> Result<()> {
    if !text.is_empty() {
        out.write_all(text.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}

/// A caption typed out by [`render_stream`].
#[derive(Debug)]
pub struct TypedCaption {
    /// Everything that arrived and was typed out.
    pub message: String,
    /// Error that ended the stream early.
    pub failure: Option<Error>,
}

impl TypedCaption {
    /// Returns the message, or the error that cut it short.
    ///
    /// # Errors
    ///
    /// Returns the upstream failure, if there was one.
    pub fn into_result(self) -> Result<String> {
        match self.failure {
            Some(err) => Err(err),
            None => Ok(self.message),
        }
    }
}

/// Types a generated caption while it is still arriving.
///
/// Chunks travel through the wire format exactly as a remote client would
/// see them: each is encoded as a line, decoded and appended to the message,
/// and the growing message becomes the typing target. Returns the message
/// once it has been typed out; a backend failure is reported alongside
/// everything that arrived before it.
///
/// # Errors
///
/// Returns an I/O error from `out`.
pub async fn render_stream<W: Write>(
    stream: &mut ChunkStream,
    policy: DelayPolicy,
    out: &mut W,
) -> Result<TypedCaption> {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut session = TypingSession::new(policy, scheduler);
    let mut decoder = NdjsonDecoder::new();
    let mut assembler = MessageAssembler::new();
    let mut upstream_done = false;
    let mut failure = None;

    while !(upstream_done && session.is_complete()) {
        tokio::select! {
            line = stream.next_line(), if !upstream_done => match line {
                Some(Ok(line)) => {
                    assembler.extend(decoder.push_bytes(line.as_bytes()));
                    let revealed = session.update_target(assembler.message());
                    emit(out, &revealed)?;
                }
                Some(Err(err)) => {
                    failure = Some(err);
                    upstream_done = true;
                }
                None => {
                    assembler.extend(decoder.finish());
                    let revealed = session.update_target(assembler.message());
                    emit(out, &revealed)?;
                    upstream_done = true;
                }
            },
            Some(generation) = fired.recv() => {
                if let Some(revealed) = session.on_fire(generation) {
                    emit(out, &revealed)?;
                }
            }
            else => break,
        }
    }

    tracing::debug!(
        parts = assembler.parts(),
        skipped = decoder.skipped(),
        "caption typed"
    );

    Ok(TypedCaption {
        message: assembler.into_message(),
        failure,
    })
}

/// Types `text` to `out` with the given delays.
///
/// # Errors
///
/// Returns an I/O error from `out`.
pub async fn type_text<W: Write>(text: &str, policy: DelayPolicy, out: &mut W) -> Result<()> {
    let (scheduler, mut fired) = TokioScheduler::new();
    let mut session = TypingSession::new(policy, scheduler);
    emit(out, &session.start(text))?;

    while !session.is_complete() {
        let Some(generation) = fired.recv().await else {
            break;
        };
        if let Some(revealed) = session.on_fire(generation) {
            emit(out, &revealed)?;
        }
    }
    Ok(())
}
