use thiserror::Error;

/// Byte reserved to mark the start and end of a script on the wire (`$`).
pub const SCRIPT_DELIMITER: u8 = b'$';

/// A delimiter-wrapped payload ready for the wire.
///
/// There is no escaping: a forced frame may carry the delimiter inside its
/// payload, which the receiver cannot tell apart from the frame end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WireFrame {
    pub delimiter: u8,
    pub payload: Vec<u8>,
}

impl WireFrame {
    /// `delimiter + payload + delimiter`, byte for byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.payload.len() + 2);
        out.push(self.delimiter);
        out.extend_from_slice(&self.payload);
        out.push(self.delimiter);
        out
    }

    /// Lossy text form, used for the transcript.
    pub fn to_text(&self) -> String {
        String::from_utf8_lossy(&self.to_bytes()).into_owned()
    }
}

/// The payload contains the delimiter byte and would corrupt framing.
///
/// This is a warning: callers may retry with `force` to send it anyway.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error(
    "Script contains '{}' characters which are used for wrapping ({occurrences} found). This may cause issues.",
    as_char(.delimiter)
)]
pub struct CollisionWarning {
    pub delimiter: u8,
    pub payload: String,
    pub occurrences: usize,
}

fn as_char(byte: &u8) -> char {
    char::from(*byte)
}

/// Count delimiter bytes in a payload.
pub fn collisions(payload: &str, delimiter: u8) -> usize {
    payload.bytes().filter(|&b| b == delimiter).count()
}

/// Wrap a payload in `delimiter` on both sides.
///
/// Returns a [`CollisionWarning`] when the payload contains the delimiter,
/// unless `force` is set, in which case the colliding bytes are kept as-is.
pub fn frame(payload: &str, delimiter: u8, force: bool) -> Result<WireFrame, CollisionWarning> {
    let occurrences = collisions(payload, delimiter);
    if occurrences > 0 && !force {
        return Err(CollisionWarning {
            delimiter,
            payload: payload.to_string(),
            occurrences,
        });
    }

    Ok(WireFrame {
        delimiter,
        payload: payload.as_bytes().to_vec(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wraps_payload() {
        let framed = frame("print(1)", SCRIPT_DELIMITER, false).unwrap();
        let bytes = framed.to_bytes();
        assert_eq!(bytes, b"$print(1)$");
        assert_eq!(bytes[0], SCRIPT_DELIMITER);
        assert_eq!(bytes[bytes.len() - 1], SCRIPT_DELIMITER);
        assert_eq!(&bytes[1..bytes.len() - 1], b"print(1)");
    }

    #[test]
    fn test_frame_empty_payload() {
        let framed = frame("", SCRIPT_DELIMITER, false).unwrap();
        assert_eq!(framed.to_bytes(), b"$$");
    }

    #[test]
    fn test_frame_collision_warns() {
        let warning = frame("print('$5')", SCRIPT_DELIMITER, false).unwrap_err();
        assert_eq!(warning.payload, "print('$5')");
        assert_eq!(warning.occurrences, 1);
        assert!(warning.to_string().contains("'$'"));
    }

    #[test]
    fn test_frame_forced_keeps_delimiter() {
        let framed = frame("a$b$c", SCRIPT_DELIMITER, true).unwrap();
        assert_eq!(framed.to_bytes(), b"$a$b$c$");
        assert_eq!(framed.payload, b"a$b$c");
        assert_eq!(framed.to_text(), "$a$b$c$");
    }

    #[test]
    fn test_frame_custom_delimiter() {
        let framed = frame("x=1", b'#', false).unwrap();
        assert_eq!(framed.to_bytes(), b"#x=1#");
        // The default delimiter is ordinary content here.
        assert!(frame("cost $1", b'#', false).is_ok());
    }
}
