//! Conversion between CSV text and outlook records.
//!
//! - [`decode_csv`] - column-major upload (or row-major export) to raw records
//! - [`encode_csv`] - validated dataset to canonical row-major CSV
//! - [`decode_upload_bytes`] - request body bytes to text, detecting encoding
//!
//! Spreadsheet exports of the outlook tables are often Windows-1252 or
//! Latin-1 rather than UTF-8, so upload bytes go through encoding detection
//! before they reach the CSV reader.

mod decode;
mod encode;

pub use decode::{coerce_token, decode_csv};
pub use encode::{encode_csv, format_number};

use crate::error::{CodecError, CodecResult};

/// Decode request body bytes to text.
///
/// Valid UTF-8 is used as-is (minus a byte order mark); anything else goes
/// through charset detection.
pub fn decode_upload_bytes(bytes: &[u8]) -> CodecResult<String> {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return Ok(strip_bom(text).to_string());
    }

    let encoding = detect_encoding(bytes);
    decode_content(bytes, &encoding)
}

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let charset = chardet::detect(bytes).0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to a string using the named encoding.
pub fn decode_content(bytes: &[u8], encoding: &str) -> CodecResult<String> {
    let label = match encoding.to_lowercase().as_str() {
        // Latin-1 uploads are decoded as its Windows-1252 superset.
        "iso-8859-1" | "latin-1" | "latin1" => "windows-1252".to_string(),
        other => other.to_string(),
    };

    let codec = encoding_rs::Encoding::for_label(label.as_bytes())
        .ok_or_else(|| CodecError::Encoding(format!("unsupported encoding '{}'", encoding)))?;

    let (text, _, had_errors) = codec.decode(bytes);
    if had_errors {
        return Err(CodecError::Encoding(format!(
            "body is not valid {}",
            codec.name()
        )));
    }

    Ok(strip_bom(&text).to_string())
}

fn strip_bom(text: &str) -> &str {
    text.strip_prefix('\u{feff}').unwrap_or(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utf8_passthrough() {
        let text = decode_upload_bytes(",2023/24\nYield (t/ha),6.1".as_bytes()).unwrap();
        assert_eq!(text, ",2023/24\nYield (t/ha),6.1");
    }

    #[test]
    fn test_bom_stripped() {
        let bytes = b"\xEF\xBB\xBF,2023/24";
        assert_eq!(decode_upload_bytes(bytes).unwrap(), ",2023/24");
    }

    #[test]
    fn test_latin1_decoding() {
        // "Société" in ISO-8859-1
        let bytes: &[u8] = &[0x53, 0x6F, 0x63, 0x69, 0xE9, 0x74, 0xE9];
        let decoded = decode_content(bytes, "iso-8859-1").unwrap();
        assert_eq!(decoded, "Société");
    }

    #[test]
    fn test_unknown_encoding_rejected() {
        let err = decode_content(b"abc", "klingon-8").unwrap_err();
        assert!(err.to_string().contains("klingon-8"));
    }
}
