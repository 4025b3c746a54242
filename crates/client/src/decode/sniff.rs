//! Magic-byte format hints. Diagnostic only.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FormatHint {
    Png,
    Jpeg,
    Gif,
    Bmp,
    Webp,
}

impl FormatHint {
    pub fn as_str(self) -> &'static str {
        match self {
            FormatHint::Png => "png",
            FormatHint::Jpeg => "jpeg",
            FormatHint::Gif => "gif",
            FormatHint::Bmp => "bmp",
            FormatHint::Webp => "webp",
        }
    }
}

pub fn sniff_format(bytes: &[u8]) -> Option<FormatHint> {
    match bytes {
        [0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, ..] => Some(FormatHint::Png),
        [0xff, 0xd8, 0xff, ..] => Some(FormatHint::Jpeg),
        [b'G', b'I', b'F', b'8', b'7' | b'9', b'a', ..] => Some(FormatHint::Gif),
        [b'B', b'M', ..] => Some(FormatHint::Bmp),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some(FormatHint::Webp),
        _ => None,
    }
}
