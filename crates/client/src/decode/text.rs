//! Base64 text normalization and decoding.

use base64::Engine as _;
use base64::alphabet;
use base64::engine::general_purpose::{self, GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;

use super::DecodeError;

/// Explicit data-URI marker.
const BASE64_MARKER: &str = ";base64,";

/// How far into the payload the explicit marker is looked for.
const MARKER_SCAN_LIMIT: usize = 256;

/// A bare comma only counts as a prefix separator this close to the start.
const COMMA_SCAN_LIMIT: usize = 100;

const LENIENT: GeneralPurposeConfig = GeneralPurposeConfig::new()
    .with_decode_padding_mode(DecodePaddingMode::Indifferent)
    .with_decode_allow_trailing_bits(true);

const STANDARD_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::STANDARD, LENIENT);
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(&alphabet::URL_SAFE, LENIENT);

struct Strategy {
    name: &'static str,
    engine: &'static GeneralPurpose,
}

/// Tried in order until one yields a non-empty buffer.
const STRATEGIES: [Strategy; 3] = [
    Strategy { name: "standard", engine: &general_purpose::STANDARD },
    Strategy { name: "standard_lenient", engine: &STANDARD_LENIENT },
    Strategy { name: "url_safe_lenient", engine: &URL_SAFE_LENIENT },
];

fn strip_data_uri_prefix(text: &str) -> &str {
    let head = &text.as_bytes()[..text.len().min(MARKER_SCAN_LIMIT + BASE64_MARKER.len())];
    if let Some(pos) = head.windows(BASE64_MARKER.len()).position(|w| w == BASE64_MARKER.as_bytes()) {
        return &text[pos + BASE64_MARKER.len()..];
    }

    match text.bytes().take(COMMA_SCAN_LIMIT).position(|b| b == b',') {
        Some(pos) => &text[pos + 1..],
        None => text,
    }
}

/// Stage A: drop a data-URI prefix, then every whitespace character.
pub fn normalize_text(text: &str) -> String {
    strip_data_uri_prefix(text.trim()).chars().filter(|c| !c.is_whitespace()).collect()
}

/// Stage B: decode normalized text with the first strategy that produces bytes.
pub fn decode_base64(normalized: &str) -> Result<Vec<u8>, DecodeError> {
    if normalized.is_empty() {
        return Err(DecodeError::Empty);
    }

    for strategy in &STRATEGIES {
        match strategy.engine.decode(normalized) {
            Ok(bytes) if !bytes.is_empty() => {
                tracing::debug!(strategy = strategy.name, bytes = bytes.len(), "base64 decoded");
                return Ok(bytes);
            }
            Ok(_) => tracing::debug!(strategy = strategy.name, "base64 strategy produced no bytes"),
            Err(e) => tracing::debug!(strategy = strategy.name, error = %e, "base64 strategy failed"),
        }
    }

    Err(DecodeError::Base64Exhausted)
}
