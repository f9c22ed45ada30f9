//! gzip body compression.

use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::io::{self, Read, Write};

/// Compress `text`. Returns `None` when compression would not save space.
pub fn compress(text: &str) -> io::Result<Option<Vec<u8>>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(text.len() / 2), Compression::fast());
    encoder.write_all(text.as_bytes())?;
    let bytes = encoder.finish()?;
    Ok((bytes.len() < text.len()).then_some(bytes))
}

/// Decompress bytes produced by [`compress`]. `len_hint` is the original size.
pub fn decompress(bytes: &[u8], len_hint: usize) -> io::Result<String> {
    let mut text = String::with_capacity(len_hint);
    GzDecoder::new(bytes).read_to_string(&mut text)?;
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compress_repetitive_text() {
        let text = "markdown body ".repeat(200);
        let bytes = compress(&text).unwrap().unwrap();

        assert!(bytes.len() < text.len());
        assert_eq!(decompress(&bytes, text.len()).unwrap(), text);
    }

    #[test]
    fn test_tiny_input_not_worth_it() {
        assert!(compress("hi").unwrap().is_none());
    }

    #[test]
    fn test_corrupt_input_is_error() {
        assert!(decompress(b"definitely not gzip", 10).is_err());
    }

    #[test]
    fn test_unicode_preserved() {
        let text = "Grüße, 世界! ".repeat(100);
        let bytes = compress(&text).unwrap().unwrap();
        assert_eq!(decompress(&bytes, 0).unwrap(), text);
    }
}
