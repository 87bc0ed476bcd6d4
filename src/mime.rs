//! Content sniffing from leading bytes.
//!
//! Only the signature is inspected; the client's file name and declared
//! content type are never trusted for the stored extension.

/// Extension used when no signature matches.
pub const FALLBACK_EXTENSION: &str = "bin";

/// Bytes scanned for a Matroska doctype.
const MATROSKA_SCAN_LEN: usize = 64;

pub fn detect_extension(bytes: &[u8]) -> Option<&'static str> {
    let ext = match bytes {
        [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, ..] => "png",
        [0xFF, 0xD8, 0xFF, ..] => "jpg",
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => "gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "webp",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'A', b'V', b'E', ..] => "wav",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'A', b'V', b'I', b' ', ..] => "avi",
        [_, _, _, _, b'f', b't', b'y', b'p', brand @ ..] => iso_media_extension(brand),
        [0x1A, 0x45, 0xDF, 0xA3, ..] => matroska_extension(bytes),
        [b'%', b'P', b'D', b'F', ..] => "pdf",
        [b'P', b'K', 0x03, 0x04, ..] => "zip",
        [0x1F, 0x8B, 0x08, ..] => "gz",
        [b'B', b'Z', b'h', ..] => "bz2",
        [b'7', b'z', 0xBC, 0xAF, 0x27, 0x1C, ..] => "7z",
        [b'R', b'a', b'r', b'!', 0x1A, 0x07, ..] => "rar",
        [0xFD, b'7', b'z', b'X', b'Z', 0x00, ..] => "xz",
        [b'I', b'D', b'3', ..] | [0xFF, 0xFB | 0xF3 | 0xF2, ..] => "mp3",
        [b'O', b'g', b'g', b'S', ..] => "ogg",
        [b'f', b'L', b'a', b'C', ..] => "flac",
        [b'M', b'T', b'h', b'd', ..] => "mid",
        [b'8', b'B', b'P', b'S', ..] => "psd",
        [0x00, b'a', b's', b'm', ..] => "wasm",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "tif",
        [0x00, 0x00, 0x01, 0x00, ..] => "ico",
        _ if bytes.starts_with(b"SQLite format 3\0") => "sqlite",
        [b'B', b'M', ..] => "bmp",
        [b'M', b'Z', ..] => "exe",
        _ => return None,
    };
    Some(ext)
}

/// Sniffed extension, or [`FALLBACK_EXTENSION`] for unrecognised content.
pub fn extension_for(bytes: &[u8]) -> &'static str {
    detect_extension(bytes).unwrap_or_else(|| {
        tracing::debug!(
            "Unrecognized file signature (first 4 bytes: {:02X?}), falling back to {}",
            &bytes[..bytes.len().min(4)],
            FALLBACK_EXTENSION
        );
        FALLBACK_EXTENSION
    })
}

fn iso_media_extension(brand: &[u8]) -> &'static str {
    match brand {
        [b'q', b't', b' ', b' ', ..] => "mov",
        [b'a', b'v', b'i', b'f', ..] => "avif",
        [b'h', b'e', b'i', b'c' | b'x', ..] => "heic",
        [b'M', b'4', b'A', b' ', ..] => "m4a",
        [b'3', b'g', b'p', ..] => "3gp",
        _ => "mp4",
    }
}

fn matroska_extension(bytes: &[u8]) -> &'static str {
    let head = &bytes[..bytes.len().min(MATROSKA_SCAN_LEN)];
    if head.windows(4).any(|window| window == b"webm") {
        "webm"
    } else {
        "mkv"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_png() {
        assert_eq!(
            detect_extension(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00]),
            Some("png")
        );
    }

    #[test]
    fn test_truncated_png_signature_is_not_png() {
        assert_eq!(detect_extension(&[0x89, 0x50, 0x4E, 0x47]), None);
    }

    #[test]
    fn test_detect_jpeg() {
        assert_eq!(detect_extension(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("jpg"));
    }

    #[test]
    fn test_detect_riff_family() {
        assert_eq!(detect_extension(b"RIFF\0\0\0\0WEBPVP8 "), Some("webp"));
        assert_eq!(detect_extension(b"RIFF\0\0\0\0WAVEfmt "), Some("wav"));
        assert_eq!(detect_extension(b"RIFF\0\0\0\0AVI LIST"), Some("avi"));
    }

    #[test]
    fn test_detect_iso_media() {
        assert_eq!(detect_extension(b"\0\0\0\x18ftypisom"), Some("mp4"));
        assert_eq!(detect_extension(b"\0\0\0\x14ftypqt  "), Some("mov"));
        assert_eq!(detect_extension(b"\0\0\0\x1cftypavif"), Some("avif"));
    }

    #[test]
    fn test_detect_matroska() {
        let mut webm = vec![0x1A, 0x45, 0xDF, 0xA3, 0x9F, 0x42, 0x82, 0x84];
        webm.extend_from_slice(b"webm");
        assert_eq!(detect_extension(&webm), Some("webm"));
        assert_eq!(
            detect_extension(&[0x1A, 0x45, 0xDF, 0xA3, 0x42, 0x82, 0x88]),
            Some("mkv")
        );
    }

    #[test]
    fn test_detect_documents_and_archives() {
        assert_eq!(detect_extension(b"%PDF-1.7\n"), Some("pdf"));
        assert_eq!(detect_extension(b"PK\x03\x04\x14\x00"), Some("zip"));
        assert_eq!(detect_extension(&[0x1F, 0x8B, 0x08, 0x00]), Some("gz"));
        assert_eq!(detect_extension(b"SQLite format 3\0\x10\x00"), Some("sqlite"));
    }

    #[test]
    fn test_text_falls_back_to_bin() {
        assert_eq!(detect_extension(b"hello, world"), None);
        assert_eq!(extension_for(b"hello, world"), "bin");
    }

    #[test]
    fn test_empty_falls_back_to_bin() {
        assert_eq!(extension_for(&[]), "bin");
    }
}
