//! Server-Sent Events line buffering.
//!
//! Network chunks do not line up with SSE event boundaries: one chunk may
//! carry several events, and one JSON payload may be split across two
//! chunks. `SseLineBuffer` accumulates bytes and hands back only complete
//! `data:` payloads.
//!
//! Used both for the completion backend's stream and, on the client side,
//! for this service's own `/messages/stream` endpoint.

use std::mem;

/// A parsed SSE data line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// A `data:` payload with the prefix stripped.
    Data(String),
    /// The `[DONE]` terminator used by OpenAI-compatible backends.
    Done,
    /// A complete line that is not valid UTF-8.
    Malformed(String),
}

/// Line buffer that survives partial lines across chunk boundaries.
///
/// Bytes are held undecoded until their newline arrives, so a multi-byte
/// character split between two chunks is decoded whole.
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends raw bytes and returns every event completed by them.
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<SseEvent> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=newline).collect();
            events.extend(decode_line(line));
        }
        events
    }

    /// Parses whatever is left once the byte stream has ended.
    pub fn flush(&mut self) -> Vec<SseEvent> {
        decode_line(mem::take(&mut self.buffer)).into_iter().collect()
    }
}

fn decode_line(line: Vec<u8>) -> Option<SseEvent> {
    match String::from_utf8(line) {
        Ok(line) => parse_line(&line),
        Err(e) => Some(SseEvent::Malformed(format!("invalid UTF-8 in SSE line: {}", e))),
    }
}

fn parse_line(line: &str) -> Option<SseEvent> {
    let line = line.trim_end_matches(['\r', '\n']);

    // Blank separators, comments, and event:/id:/retry: fields carry no payload.
    let data = line.strip_prefix("data:")?;
    let data = data.strip_prefix(' ').unwrap_or(data);

    if data.trim().is_empty() {
        return None;
    }
    if data.trim() == "[DONE]" {
        return Some(SseEvent::Done);
    }
    Some(SseEvent::Data(data.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emits_every_event_in_one_chunk() {
        let mut buffer = SseLineBuffer::new();
        let events = buffer.feed(b"data: {\"a\":1}\n\ndata: {\"b\":2}\n\n");

        assert_eq!(
            events,
            vec![
                SseEvent::Data("{\"a\":1}".to_string()),
                SseEvent::Data("{\"b\":2}".to_string()),
            ]
        );
    }

    #[test]
    fn joins_payload_split_across_chunks() {
        let mut buffer = SseLineBuffer::new();

        assert!(buffer.feed(b"data: {\"text\":\"hel").is_empty());

        let events = buffer.feed(b"lo\"}\n\n");
        assert_eq!(events, vec![SseEvent::Data("{\"text\":\"hello\"}".to_string())]);
        assert!(buffer.flush().is_empty());
    }

    #[test]
    fn joins_character_split_across_chunks() {
        let line = "data: {\"text\":\"café ☕\"}\n\n".as_bytes();
        let split = line.iter().position(|b| *b == 0xC3).unwrap() + 1;
        let mut buffer = SseLineBuffer::new();

        assert!(buffer.feed(&line[..split]).is_empty());
        let events = buffer.feed(&line[split..]);

        assert_eq!(
            events,
            vec![SseEvent::Data("{\"text\":\"café ☕\"}".to_string())]
        );
    }

    #[test]
    fn invalid_utf8_line_is_malformed() {
        let mut buffer = SseLineBuffer::new();
        let events = buffer.feed(b"data: \xff\xfe\n");
        assert!(matches!(events.as_slice(), [SseEvent::Malformed(_)]));
    }

    #[test]
    fn recognises_done_marker() {
        let mut buffer = SseLineBuffer::new();
        assert_eq!(buffer.feed(b"data: [DONE]\n"), vec![SseEvent::Done]);
    }

    #[test]
    fn accepts_data_without_space_and_crlf() {
        let mut buffer = SseLineBuffer::new();
        assert_eq!(
            buffer.feed(b"data:{\"x\":1}\r\n"),
            vec![SseEvent::Data("{\"x\":1}".to_string())]
        );
    }

    #[test]
    fn ignores_comments_and_other_fields() {
        let mut buffer = SseLineBuffer::new();
        let events = buffer.feed(b": keep-alive\nevent: message\nid: 7\nretry: 1000\n\n");
        assert!(events.is_empty());
    }

    #[test]
    fn flush_parses_unterminated_tail() {
        let mut buffer = SseLineBuffer::new();
        assert!(buffer.feed(b"data: {\"tail\":true}").is_empty());
        assert_eq!(
            buffer.flush(),
            vec![SseEvent::Data("{\"tail\":true}".to_string())]
        );
        assert!(buffer.flush().is_empty());
    }
}
