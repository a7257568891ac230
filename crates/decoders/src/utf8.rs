use core_types::{DecodedLine, Decoder, Frame};

/// Converts line frames to trimmed UTF-8 text.
///
/// Decoding is permissive: invalid byte sequences become U+FFFD instead of
/// failing. Lines that are blank after trimming are swallowed.
pub struct Utf8Decoder;

impl Utf8Decoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for Utf8Decoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for Utf8Decoder {
    fn ingest(&mut self, frame: &Frame) -> Option<DecodedLine> {
        let text = String::from_utf8_lossy(&frame.bytes);
        let text = text.trim();
        if text.is_empty() {
            return None;
        }

        Some(DecodedLine {
            timestamp_us: frame.timestamp_us,
            protocol: "UTF-8",
            text: text.to_string(),
        })
    }

    fn id(&self) -> &'static str {
        "utf8"
    }

    fn name(&self) -> &'static str {
        "UTF-8 Lines"
    }
}
