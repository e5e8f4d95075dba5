//! Content-based MIME detection.
//!
//! The declared content type of an upload is never trusted; the type stored
//! as `file_type` comes from the leading bytes of the content.

/// MIME type reported for zero-length content.
pub const EMPTY_MIME: &str = "application/x-empty";
/// Fallback for content no signature or text heuristic recognises.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Bytes examined by the text heuristic.
const TEXT_PROBE_LEN: usize = 8192;

/// Fixed-offset signatures: `(offset, magic, mime)`.
const SIGNATURES: &[(usize, &[u8], &str)] = &[
    (0, b"%PDF-", "application/pdf"),
    (0, b"\x89PNG\r\n\x1a\n", "image/png"),
    (0, b"\xFF\xD8\xFF", "image/jpeg"),
    (0, b"GIF87a", "image/gif"),
    (0, b"GIF89a", "image/gif"),
    (0, b"II*\x00", "image/tiff"),
    (0, b"MM\x00*", "image/tiff"),
    (0, b"PK\x03\x04", "application/zip"),
    (0, b"PK\x05\x06", "application/zip"),
    (0, b"\x1F\x8B", "application/gzip"),
    (0, b"\xD0\xCF\x11\xE0\xA1\xB1\x1A\xE1", "application/x-ole-storage"),
    (0, b"ID3", "audio/mpeg"),
    (0, b"OggS", "audio/ogg"),
    (4, b"ftyp", "video/mp4"),
];

/// Detect the MIME type of `data` from its content.
pub fn sniff_mime(data: &[u8]) -> &'static str {
    if data.is_empty() {
        return EMPTY_MIME;
    }

    if let Some(mime) = riff_mime(data) {
        return mime;
    }

    for (offset, magic, mime) in SIGNATURES {
        if data.len() >= offset + magic.len() && &data[*offset..offset + magic.len()] == *magic {
            return *mime;
        }
    }

    if looks_like_text(data) {
        return text_mime(data);
    }

    OCTET_STREAM
}

/// RIFF containers carry their real type at offset 8.
fn riff_mime(data: &[u8]) -> Option<&'static str> {
    if data.len() < 12 || &data[0..4] != b"RIFF" {
        return None;
    }
    match &data[8..12] {
        b"WEBP" => Some("image/webp"),
        b"WAVE" => Some("audio/x-wav"),
        b"AVI " => Some("video/x-msvideo"),
        _ => None,
    }
}

/// Printable UTF-8 (allowing common whitespace and ESC) within the probe window.
fn looks_like_text(data: &[u8]) -> bool {
    let probe = &data[..data.len().min(TEXT_PROBE_LEN)];
    let text = match std::str::from_utf8(probe) {
        Ok(text) => text,
        // A multi-byte sequence may be cut at the probe boundary.
        Err(err) if err.error_len().is_none() && probe.len() < data.len() => {
            match std::str::from_utf8(&probe[..err.valid_up_to()]) {
                Ok(text) => text,
                Err(_) => return false,
            }
        }
        Err(_) => return false,
    };

    text.chars()
        .all(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r' | '\x0C' | '\x1B'))
}

/// Refine a text payload into a more specific text type where obvious.
fn text_mime(data: &[u8]) -> &'static str {
    let head = String::from_utf8_lossy(&data[..data.len().min(512)]);
    let trimmed = head.trim_start_matches('\u{FEFF}').trim_start();
    let lower = trimmed.to_ascii_lowercase();

    if lower.starts_with("<?xml") {
        "text/xml"
    } else if lower.starts_with("<!doctype html") || lower.starts_with("<html") {
        "text/html"
    } else if (trimmed.starts_with('{') || trimmed.starts_with('['))
        && serde_json::from_slice::<serde_json::Value>(data).is_ok()
    {
        "application/json"
    } else {
        "text/plain"
    }
}
