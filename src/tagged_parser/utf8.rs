/// Incremental UTF-8 decoder for chunked byte streams.
///
/// A character split across two chunks is held until its remaining bytes arrive, so
/// split characters never surface as U+FFFD. Bytes that can never form valid UTF-8 are
/// replaced with U+FFFD and decoding carries on.
#[derive(Debug, Clone, Default)]
pub struct Utf8StreamDecoder {
    pending: Vec<u8>,
}

impl Utf8StreamDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode the next chunk, returning every complete character seen so far.
    pub fn decode(&mut self, chunk: &[u8]) -> String {
        let mut bytes = std::mem::take(&mut self.pending);
        bytes.extend_from_slice(chunk);

        let mut out = String::with_capacity(bytes.len());
        let mut rest: &[u8] = &bytes;

        loop {
            match std::str::from_utf8(rest) {
                Ok(valid) => {
                    out.push_str(valid);
                    break;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    // from_utf8 already validated this prefix
                    out.push_str(std::str::from_utf8(valid).unwrap_or_default());

                    match err.error_len() {
                        Some(bad) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end of the chunk
                            self.pending.extend_from_slice(after);
                            break;
                        }
                    }
                }
            }
        }

        out
    }

    /// Flush at end of stream. A dangling partial character becomes U+FFFD.
    pub fn finish(&mut self) -> String {
        if self.pending.is_empty() {
            return String::new();
        }
        let tail = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        tail
    }

    /// Number of bytes waiting for the rest of their character.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_passthrough() {
        let mut decoder = Utf8StreamDecoder::new();
        assert_eq!(decoder.decode(b"hello"), "hello");
        assert_eq!(decoder.pending_len(), 0);
        assert_eq!(decoder.finish(), "");
    }

    #[test]
    fn test_split_multibyte_character() {
        let bytes = "é日😀".as_bytes();
        for split in 0..=bytes.len() {
            let mut decoder = Utf8StreamDecoder::new();
            let mut out = decoder.decode(&bytes[..split]);
            out.push_str(&decoder.decode(&bytes[split..]));
            out.push_str(&decoder.finish());
            assert_eq!(out, "é日😀", "split at {}", split);
            assert!(!out.contains(char::REPLACEMENT_CHARACTER));
        }
    }

    #[test]
    fn test_byte_by_byte() {
        let text = "[EXPLANATION]\n数据 📊";
        let mut decoder = Utf8StreamDecoder::new();
        let mut out = String::new();
        for byte in text.as_bytes() {
            out.push_str(&decoder.decode(std::slice::from_ref(byte)));
        }
        assert_eq!(out, text);
    }

    #[test]
    fn test_invalid_bytes_are_replaced() {
        let mut decoder = Utf8StreamDecoder::new();
        let out = decoder.decode(b"ok\xffok");
        assert_eq!(out, "ok\u{FFFD}ok");
    }

    #[test]
    fn test_dangling_partial_on_finish() {
        let mut decoder = Utf8StreamDecoder::new();
        let out = decoder.decode(&"日".as_bytes()[..2]);
        assert_eq!(out, "");
        assert_eq!(decoder.pending_len(), 2);
        assert_eq!(decoder.finish(), "\u{FFFD}");
        assert_eq!(decoder.pending_len(), 0);
    }
}
