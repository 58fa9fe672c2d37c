//! Image format detection from magic bytes and declared MIME types.

/// Image formats the providers understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    WebP,
    Bmp,
    Tiff,
    Heif,
}

impl ImageFormat {
    /// Detect the format from the first bytes of a file.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.len() < 4 {
            return None;
        }

        // JPEG: FF D8 FF
        if bytes[..3] == [0xFF, 0xD8, 0xFF] {
            return Some(Self::Jpeg);
        }

        // PNG: 89 50 4E 47
        if bytes[..4] == [0x89, b'P', b'N', b'G'] {
            return Some(Self::Png);
        }

        // GIF: GIF8
        if &bytes[..4] == b"GIF8" {
            return Some(Self::Gif);
        }

        // WebP: RIFF....WEBP
        if &bytes[..4] == b"RIFF" {
            return (bytes.len() >= 12 && &bytes[8..12] == b"WEBP").then_some(Self::WebP);
        }

        // BMP: BM
        if &bytes[..2] == b"BM" {
            return Some(Self::Bmp);
        }

        // TIFF: II*\0 (little-endian) or MM\0* (big-endian)
        if bytes[..4] == [b'I', b'I', 0x2A, 0x00] || bytes[..4] == [b'M', b'M', 0x00, 0x2A] {
            return Some(Self::Tiff);
        }

        // HEIC/HEIF/AVIF: ftyp box at offset 4
        if bytes.len() >= 12 && &bytes[4..8] == b"ftyp" {
            return Some(Self::Heif);
        }

        None
    }

    /// Parse a declared MIME type (`image/jpeg`, `image/jpg`, ...).
    pub fn from_mime(mime: &str) -> Option<Self> {
        let subtype = mime.trim().to_ascii_lowercase();
        let subtype = subtype.strip_prefix("image/")?;
        Self::from_name(subtype)
    }

    /// Parse a short format name or file extension.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "jpeg" | "jpg" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            "webp" => Some(Self::WebP),
            "bmp" => Some(Self::Bmp),
            "tif" | "tiff" => Some(Self::Tiff),
            "heic" | "heif" | "avif" => Some(Self::Heif),
            _ => None,
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
            Self::WebP => "image/webp",
            Self::Bmp => "image/bmp",
            Self::Tiff => "image/tiff",
            Self::Heif => "image/heif",
        }
    }

    /// Whether `name` (as written in config, e.g. "jpg") refers to this format.
    pub fn matches_name(self, name: &str) -> bool {
        Self::from_name(name) == Some(self)
    }
}
