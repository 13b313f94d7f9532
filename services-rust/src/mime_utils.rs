use base64::Engine as _;
use regex::Regex;
use std::sync::OnceLock;

fn essence(mime_type: &str) -> String {
    mime_type
        .split(';')
        .next()
        .unwrap_or(mime_type)
        .trim()
        .to_lowercase()
}

pub(crate) fn is_image(mime_type: &str) -> bool {
    essence(mime_type).starts_with("image/")
}

pub(crate) fn is_audio(mime_type: &str) -> bool {
    essence(mime_type).starts_with("audio/")
}

/// Remove a leading `data:<mime>;base64,` prefix, if any.
pub(crate) fn strip_data_uri_prefix(data: &str) -> &str {
    static PREFIX: OnceLock<Regex> = OnceLock::new();
    let prefix = PREFIX.get_or_init(|| {
        Regex::new(r"(?i)^data:[a-z]+/[a-z0-9.+-]+;base64,")
            .expect("data URI prefix regex is valid")
    });
    match prefix.find(data) {
        Some(found) => &data[found.end()..],
        None => data,
    }
}

pub(crate) fn to_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime_type};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// The conventional file extension for a MIME type, e.g. "mp3" for
/// "audio/mpeg".
pub(crate) fn extension_for_mime_type(mime_type: &str) -> Option<&'static str> {
    Some(match essence(mime_type).as_str() {
        "audio/mpeg" | "audio/mp3" => "mp3",
        "audio/wav" | "audio/x-wav" | "audio/wave" => "wav",
        "audio/aac" => "aac",
        "audio/ogg" => "ogg",
        "audio/flac" => "flac",
        "audio/midi" => "mid",
        "audio/x-ms-wma" => "wma",
        "audio/x-matroska" => "mka",
        "image/jpeg" => "jpg",
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/avif" => "avif",
        _ => return None,
    })
}
