use crate::error::{Result, SambaError};
use crate::models::{ApiResponse, Usage};

const DONE_SENTINEL: &str = "[DONE]";

/// Incremental decoder for the upstream event-stream body.
///
/// Bytes are fed in with [`push`](Self::push) as they arrive; complete
/// `data:` frames are split off on the blank-line boundary and parsed as
/// JSON, and the extracted text deltas accumulate until the `[DONE]`
/// sentinel. A frame that fails to decode is skipped with a warning rather
/// than aborting the stream; if nothing decodable arrived at all, closing
/// the decoder reports a decode error instead of an empty result.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buf: Vec<u8>,
    content: String,
    usage: Option<Usage>,
    finish_reason: Option<String>,
    done: bool,
    skipped_frames: usize,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one chunk of the response body. Returns the text deltas
    /// completed by this chunk, in arrival order. Chunks arriving after the
    /// termination sentinel are ignored.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.done {
            return deltas;
        }
        self.buf.extend_from_slice(bytes);
        while let Some(frame) = self.take_frame() {
            if let Some(delta) = self.handle_frame(&frame) {
                self.content.push_str(&delta);
                deltas.push(delta);
            }
            if self.done {
                break;
            }
        }
        deltas
    }

    /// True once the `[DONE]` sentinel has been seen.
    pub fn is_done(&self) -> bool {
        self.done
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn finish_reason(&self) -> Option<&str> {
        self.finish_reason.as_deref()
    }

    pub fn skipped_frames(&self) -> usize {
        self.skipped_frames
    }

    /// Close the decoder and assemble the response. Fails when the stream
    /// ended without a single decodable text delta.
    pub fn finish(self, model: impl Into<String>) -> Result<ApiResponse> {
        if self.content.is_empty() {
            return Err(SambaError::DecodeError(format!(
                "no content parsed from stream ({} frame(s) skipped)",
                self.skipped_frames
            )));
        }
        Ok(ApiResponse {
            content: self.content,
            model: model.into(),
            usage: self.usage,
            finish_reason: self.finish_reason,
        })
    }

    /// Split the next complete frame off the buffer, exclusive of its
    /// blank-line terminator.
    fn take_frame(&mut self) -> Option<String> {
        let (pos, sep_len) = find_frame_boundary(&self.buf)?;
        let frame: Vec<u8> = self.buf.drain(..pos + sep_len).collect();
        Some(String::from_utf8_lossy(&frame[..pos]).into_owned())
    }

    fn handle_frame(&mut self, frame: &str) -> Option<String> {
        let mut data_lines = Vec::new();
        for line in frame.lines() {
            if let Some(rest) = line.strip_prefix("data:") {
                data_lines.push(rest.trim());
            }
        }
        // Comment and keep-alive frames carry no data segment.
        if data_lines.is_empty() {
            return None;
        }
        if data_lines.len() == 1 && data_lines[0] == DONE_SENTINEL {
            self.done = true;
            return None;
        }
        let data = data_lines.join("\n");
        if data.is_empty() {
            return None;
        }

        let value: serde_json::Value = match serde_json::from_str(&data) {
            Ok(value) => value,
            Err(e) => {
                self.skipped_frames += 1;
                log::warn!("Skipping undecodable stream frame: {}", e);
                return None;
            }
        };

        if let Some(reason) = value["choices"][0]["finish_reason"].as_str() {
            self.finish_reason = Some(reason.to_string());
        }
        if let Some(usage) = value.get("usage") {
            if !usage.is_null() {
                match serde_json::from_value::<Usage>(usage.clone()) {
                    Ok(parsed) => self.usage = Some(parsed),
                    Err(e) => log::warn!("Ignoring unreadable usage block: {}", e),
                }
            }
        }

        let delta = value["choices"][0]["delta"]["content"].as_str()?;
        if delta.is_empty() {
            return None;
        }
        Some(delta.to_string())
    }
}

/// Position and length of the next event boundary (`\n\n` or `\r\n\r\n`),
/// whichever comes first.
fn find_frame_boundary(buf: &[u8]) -> Option<(usize, usize)> {
    let crlf = buf.windows(4).position(|w| w == b"\r\n\r\n");
    let lf = buf.windows(2).position(|w| w == b"\n\n");
    match (crlf, lf) {
        (Some(c), Some(l)) => {
            if c < l {
                Some((c, 4))
            } else {
                Some((l, 2))
            }
        }
        (Some(c), None) => Some((c, 4)),
        (None, Some(l)) => Some((l, 2)),
        (None, None) => None,
    }
}
