//! Base64 image payloads as sent by the web client.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};

use crate::domain::error::DomainError;

const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// A decoded image ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

impl DecodedImage {
    /// Accepts `data:image/<type>;base64,<payload>` or bare base64.
    /// `field` names the request field in validation errors.
    pub fn from_base64(raw: &str, field: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(DomainError::validation(field, "Image must not be empty."));
        }

        let (declared, payload) = match raw.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest
                    .split_once(',')
                    .ok_or_else(|| DomainError::validation(field, "Malformed data URI."))?;
                let mime = header
                    .strip_suffix(";base64")
                    .ok_or_else(|| DomainError::validation(field, "Image must be base64 encoded."))?;
                let ext = extension_for_mime(mime).ok_or_else(|| {
                    DomainError::validation(field, format!("Unsupported image type '{mime}'."))
                })?;
                (Some(ext), payload)
            }
            None => (None, raw),
        };

        let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
        let bytes = LENIENT_BASE64
            .decode(compact.as_bytes())
            .map_err(|_| DomainError::validation(field, "Invalid base64 image data."))?;
        if bytes.is_empty() {
            return Err(DomainError::validation(field, "Image must not be empty."));
        }

        let extension = declared
            .or_else(|| sniff_extension(&bytes))
            .ok_or_else(|| DomainError::validation(field, "Upload a valid image."))?;

        Ok(Self { extension, bytes })
    }
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime.trim().to_ascii_lowercase().as_str() {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        "image/bmp" => Some("bmp"),
        _ => None,
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else if bytes.starts_with(b"BM") {
        Some("bmp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // 1x1 transparent PNG
    const PNG_B64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    #[test]
    fn data_uri_uses_declared_type() {
        let img =
            DecodedImage::from_base64(&format!("data:image/jpeg;base64,{PNG_B64}"), "image")
                .unwrap();
        assert_eq!(img.extension, "jpg");
        assert!(img.bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn bare_base64_is_sniffed() {
        let img = DecodedImage::from_base64(PNG_B64, "image").unwrap();
        assert_eq!(img.extension, "png");
    }

    #[test]
    fn missing_padding_is_tolerated() {
        let unpadded = PNG_B64.trim_end_matches('=');
        assert!(DecodedImage::from_base64(unpadded, "image").is_ok());
    }

    #[test]
    fn empty_and_garbage_are_rejected() {
        for raw in ["", "   ", "data:image/png;base64,", "!!!not base64!!!"] {
            let err = DecodedImage::from_base64(raw, "avatar").unwrap_err();
            assert!(
                matches!(err, DomainError::Validation { ref field, .. } if field == "avatar"),
                "{raw:?} -> {err:?}"
            );
        }
    }

    #[test]
    fn unsupported_or_unknown_types_are_rejected() {
        assert!(DecodedImage::from_base64("data:text/plain;base64,aGVsbG8=", "image").is_err());
        // "hello" decodes fine but is not an image
        assert!(DecodedImage::from_base64("aGVsbG8=", "image").is_err());
    }
}
