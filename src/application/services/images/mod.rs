/// Image format detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageKind {
    pub extension: &'static str,
    pub content_type: &'static str,
}

const PNG: ImageKind = ImageKind {
    extension: "png",
    content_type: "image/png",
};
const JPEG: ImageKind = ImageKind {
    extension: "jpg",
    content_type: "image/jpeg",
};
const GIF: ImageKind = ImageKind {
    extension: "gif",
    content_type: "image/gif",
};
const WEBP: ImageKind = ImageKind {
    extension: "webp",
    content_type: "image/webp",
};

/// Identifies an uploaded image by its magic bytes. Uploads that do not
/// start like one of the accepted formats are rejected regardless of the
/// filename they were sent with.
pub fn sniff_image(bytes: &[u8]) -> Option<ImageKind> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        return Some(PNG);
    }
    if bytes.starts_with(b"\xff\xd8\xff") {
        return Some(JPEG);
    }
    if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        return Some(GIF);
    }
    if bytes.len() >= 12 && bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
        return Some(WEBP);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognizes_the_accepted_formats() {
        assert_eq!(sniff_image(b"\x89PNG\r\n\x1a\n rest").unwrap().extension, "png");
        assert_eq!(
            sniff_image(&[0xff, 0xd8, 0xff, 0xe0, 0x00]).unwrap().content_type,
            "image/jpeg"
        );
        assert_eq!(sniff_image(b"GIF89a....").unwrap().extension, "gif");
        assert_eq!(
            sniff_image(b"RIFF\x24\x00\x00\x00WEBPVP8 ").unwrap().extension,
            "webp"
        );
    }

    #[test]
    fn rejects_everything_else() {
        assert!(sniff_image(b"").is_none());
        assert!(sniff_image(b"<?php echo 1; ?>").is_none());
        assert!(sniff_image(b"RIFF\x24\x00\x00\x00WAVE").is_none());
        assert!(sniff_image(b"GIF").is_none());
    }
}
