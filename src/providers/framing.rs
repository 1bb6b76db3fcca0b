//! Decoding of streamed chat-completion bodies.
//!
//! The body is split into lines by [`LineBuffer`], and every complete line is
//! turned into a [`Frame`] by the configured [`StreamFormat`].

use crate::core::error::AppError;
use serde::{Deserialize, Serialize};

const DATA_PREFIX: &str = "data: ";
const DONE_SENTINEL: &str = "[DONE]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StreamFormat {
    /// `data: {json}` frames ended by `data: [DONE]`, served at `/v1/chat/completions`.
    #[default]
    Sse,
    /// One JSON object per line with a `done` flag, served at `/api/chat`.
    NdJson,
}

/// One decoded protocol event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamedChunk {
    pub delta: String,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Delimiter, comment, keepalive, or a chunk without choices.
    Skip,
    Chunk(StreamedChunk),
    /// Clean end of stream, possibly carrying a last chunk.
    End(Option<StreamedChunk>),
}

#[derive(Deserialize)]
struct SseChunk {
    #[serde(default)]
    choices: Option<Vec<SseChoice>>,
}

#[derive(Deserialize)]
struct SseChoice {
    #[serde(default)]
    delta: Option<SseDelta>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct SseDelta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct NdJsonChunk {
    #[serde(default)]
    message: Option<NdJsonMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    done_reason: Option<String>,
}

#[derive(Deserialize)]
struct NdJsonMessage {
    #[serde(default)]
    content: Option<String>,
}

impl StreamFormat {
    pub fn path(&self) -> &'static str {
        match self {
            StreamFormat::Sse => "v1/chat/completions",
            StreamFormat::NdJson => "api/chat",
        }
    }

    pub fn decode_line(&self, line: &str) -> Result<Frame, AppError> {
        match self {
            StreamFormat::Sse => decode_sse(line),
            StreamFormat::NdJson => decode_ndjson(line),
        }
    }
}

fn decode_sse(line: &str) -> Result<Frame, AppError> {
    if line.trim().is_empty() {
        return Ok(Frame::Skip);
    }
    let Some(payload) = line.strip_prefix(DATA_PREFIX) else {
        return Ok(Frame::Skip);
    };
    if payload.trim() == DONE_SENTINEL {
        return Ok(Frame::End(None));
    }

    let chunk: SseChunk = serde_json::from_str(payload)?;

    // null `choices` or `delta` decodes as an empty frame.
    Ok(match chunk.choices.unwrap_or_default().into_iter().next() {
        Some(choice) => Frame::Chunk(StreamedChunk {
            delta: choice.delta.and_then(|d| d.content).unwrap_or_default(),
            finish_reason: choice.finish_reason,
        }),
        None => Frame::Skip,
    })
}

fn decode_ndjson(line: &str) -> Result<Frame, AppError> {
    if line.trim().is_empty() {
        return Ok(Frame::Skip);
    }

    let chunk: NdJsonChunk = serde_json::from_str(line)?;
    let decoded = StreamedChunk {
        delta: chunk.message.and_then(|m| m.content).unwrap_or_default(),
        finish_reason: chunk
            .done_reason
            .or_else(|| chunk.done.then(|| "stop".to_string())),
    };

    if chunk.done {
        Ok(Frame::End(Some(decoded)))
    } else {
        Ok(Frame::Chunk(decoded))
    }
}

/// Splits a byte stream into lines, holding partial lines between reads.
#[derive(Debug, Default)]
pub struct LineBuffer {
    pending: Vec<u8>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, bytes: &[u8]) {
        self.pending.extend_from_slice(bytes);
    }

    /// Next complete line without its terminator.
    pub fn next_line(&mut self) -> Result<Option<String>, AppError> {
        let Some(pos) = self.pending.iter().position(|b| *b == b'\n') else {
            return Ok(None);
        };
        let raw: Vec<u8> = self.pending.drain(..=pos).collect();
        decode_utf8(&raw[..pos]).map(Some)
    }

    /// Whatever is left once the body has ended.
    pub fn finish(&mut self) -> Result<Option<String>, AppError> {
        if self.pending.is_empty() {
            return Ok(None);
        }
        let raw = std::mem::take(&mut self.pending);
        decode_utf8(&raw).map(Some)
    }
}

fn decode_utf8(raw: &[u8]) -> Result<String, AppError> {
    let line = std::str::from_utf8(raw)
        .map_err(|e| AppError::Parse(format!("invalid UTF-8 in stream: {}", e)))?;
    Ok(line.strip_suffix('\r').unwrap_or(line).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(delta: &str, finish: Option<&str>) -> StreamedChunk {
        StreamedChunk {
            delta: delta.to_string(),
            finish_reason: finish.map(str::to_string),
        }
    }

    #[test]
    fn sse_decodes_content_and_finish_reason() {
        let frame = StreamFormat::Sse
            .decode_line(r#"data: {"choices":[{"delta":{"content":"Hello"},"finish_reason":null}]}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("Hello", None)));

        let frame = StreamFormat::Sse
            .decode_line(r#"data: {"choices":[{"delta":{},"finish_reason":"stop"}]}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("", Some("stop"))));
    }

    #[test]
    fn sse_only_consumes_first_choice() {
        let frame = StreamFormat::Sse
            .decode_line(r#"data: {"choices":[{"delta":{"content":"a"}},{"delta":{"content":"b"}}]}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("a", None)));
    }

    #[test]
    fn sse_skips_blank_and_unprefixed_lines() {
        for line in ["", "   ", ": keepalive", "event: message", "id: 7"] {
            assert_eq!(StreamFormat::Sse.decode_line(line).unwrap(), Frame::Skip, "{line:?}");
        }
    }

    #[test]
    fn sse_skips_chunks_without_choices() {
        let frame = StreamFormat::Sse.decode_line(r#"data: {"choices":[]}"#).unwrap();
        assert_eq!(frame, Frame::Skip);
    }

    #[test]
    fn sse_null_choices_or_delta_are_empty_frames() {
        let frame = StreamFormat::Sse.decode_line(r#"data: {"choices":null}"#).unwrap();
        assert_eq!(frame, Frame::Skip);

        let frame = StreamFormat::Sse
            .decode_line(r#"data: {"choices":[{"delta":null,"finish_reason":null}]}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("", None)));

        let frame = StreamFormat::Sse
            .decode_line(r#"data: {"choices":[{"delta":{"content":null}}]}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("", None)));
    }

    #[test]
    fn ndjson_null_content_is_empty_delta() {
        let frame = StreamFormat::NdJson
            .decode_line(r#"{"message":{"role":"assistant","content":null},"done":false}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("", None)));
    }

    #[test]
    fn sse_done_sentinel_ends_stream() {
        assert_eq!(
            StreamFormat::Sse.decode_line("data: [DONE]").unwrap(),
            Frame::End(None)
        );
    }

    #[test]
    fn sse_malformed_payload_is_parse_error() {
        let err = StreamFormat::Sse.decode_line("data: {not json").unwrap_err();
        assert!(matches!(err, AppError::Parse(_)));
    }

    #[test]
    fn ndjson_done_carries_last_delta() {
        let frame = StreamFormat::NdJson
            .decode_line(r#"{"message":{"role":"assistant","content":"Hi"},"done":false}"#)
            .unwrap();
        assert_eq!(frame, Frame::Chunk(chunk("Hi", None)));

        let frame = StreamFormat::NdJson
            .decode_line(r#"{"message":{"role":"assistant","content":"!"},"done":true}"#)
            .unwrap();
        assert_eq!(frame, Frame::End(Some(chunk("!", Some("stop")))));
    }

    #[test]
    fn ndjson_malformed_line_is_parse_error() {
        assert!(matches!(
            StreamFormat::NdJson.decode_line("garbage"),
            Err(AppError::Parse(_))
        ));
    }

    #[test]
    fn line_buffer_joins_split_lines() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"data: one\r\nda");
        assert_eq!(buffer.next_line().unwrap().as_deref(), Some("data: one"));
        assert_eq!(buffer.next_line().unwrap(), None);

        buffer.push(b"ta: two\n\n");
        assert_eq!(buffer.next_line().unwrap().as_deref(), Some("data: two"));
        assert_eq!(buffer.next_line().unwrap().as_deref(), Some(""));
        assert_eq!(buffer.finish().unwrap(), None);
    }

    #[test]
    fn line_buffer_keeps_multibyte_chars_split_across_reads() {
        let text = "data: héllo\n".as_bytes();
        let (a, b) = text.split_at(8);
        let mut buffer = LineBuffer::new();
        buffer.push(a);
        assert_eq!(buffer.next_line().unwrap(), None);
        buffer.push(b);
        assert_eq!(buffer.next_line().unwrap().as_deref(), Some("data: héllo"));
    }

    #[test]
    fn line_buffer_returns_unterminated_tail() {
        let mut buffer = LineBuffer::new();
        buffer.push(b"data: [DONE]");
        assert_eq!(buffer.next_line().unwrap(), None);
        assert_eq!(buffer.finish().unwrap().as_deref(), Some("data: [DONE]"));
    }
}
