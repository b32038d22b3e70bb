//! Conversions between files, data URLs and [`ImagePayload`]s.

use crate::error::{Result, StudioError};
use crate::image::types::{ImageFormat, ImagePayload};
use std::path::Path;

/// Reads an image file and encodes it as a payload.
///
/// Any `image/*` type the extension declares is accepted as is. Unknown
/// extensions fall back to the content's magic bytes.
pub async fn encode_upload(path: impl AsRef<Path>) -> Result<ImagePayload> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|e| {
        tracing::warn!(path = %path.display(), "failed to read upload: {e}");
        StudioError::Decode(format!("{}: {e}", path.display()))
    })?;

    let declared = mime_guess::from_path(path)
        .iter()
        .find(|m| m.type_() == mime_guess::mime::IMAGE)
        .map(|m| m.essence_str().to_string());

    let media_type = match declared {
        Some(media_type) => media_type,
        None => ImageFormat::from_magic_bytes(&bytes)
            .map(|f| f.mime_type().to_string())
            .ok_or_else(|| {
                StudioError::Decode(format!("{} is not a supported image", path.display()))
            })?,
    };

    Ok(encode_bytes(&bytes, &media_type))
}

/// Encodes in-memory bytes with the given media type.
pub fn encode_bytes(bytes: &[u8], media_type: &str) -> ImagePayload {
    ImagePayload::from_bytes(bytes, media_type)
}

/// Splits `data:<mediaType>;base64,<body>` into its parts.
///
/// The media type sits between the first `:` and the first `;`, the body
/// starts after the first `,`.
pub fn decompose_data_url(data_url: &str) -> Result<ImagePayload> {
    let malformed = || StudioError::Decode("malformed data URL".into());

    let colon = data_url.find(':').ok_or_else(malformed)?;
    let semicolon = data_url.find(';').ok_or_else(malformed)?;
    let comma = data_url.find(',').ok_or_else(malformed)?;
    if semicolon <= colon || comma <= semicolon {
        return Err(malformed());
    }

    Ok(ImagePayload::new(
        &data_url[comma + 1..],
        &data_url[colon + 1..semicolon],
    ))
}

/// True for `data:image/<subtype>;base64,<body>` with a non-empty body.
pub fn is_image_data_url(value: &str) -> bool {
    let Some(rest) = value.strip_prefix("data:image/") else {
        return false;
    };
    match rest.split_once(";base64,") {
        Some((subtype, body)) => {
            !subtype.is_empty() && !subtype.contains([',', ';']) && !body.is_empty()
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_BYTES: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    #[tokio::test]
    async fn test_upload_round_trips_through_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&PNG_BYTES)
            .unwrap();

        let payload = encode_upload(&path).await.unwrap();
        assert_eq!(payload.media_type, "image/png");

        let back = decompose_data_url(&payload.to_data_url()).unwrap();
        assert_eq!(back, payload);
        assert_eq!(back.decode_bytes().unwrap(), PNG_BYTES);
    }

    #[tokio::test]
    async fn test_upload_prefers_declared_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpeg");
        std::fs::write(&path, PNG_BYTES).unwrap();

        let payload = encode_upload(&path).await.unwrap();
        assert_eq!(payload.media_type, "image/jpeg");
    }

    #[tokio::test]
    async fn test_upload_accepts_any_declared_image_type() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.gif");
        std::fs::write(&path, b"GIF89a\x01\x00\x01\x00\x80\x00\x00").unwrap();

        let payload = encode_upload(&path).await.unwrap();
        assert_eq!(payload.media_type, "image/gif");
        assert_eq!(payload.decode_bytes().unwrap()[..6], *b"GIF89a");
    }

    #[tokio::test]
    async fn test_upload_sniffs_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("download.bin");
        std::fs::write(&path, PNG_BYTES).unwrap();

        let payload = encode_upload(&path).await.unwrap();
        assert_eq!(payload.media_type, "image/png");
    }

    #[tokio::test]
    async fn test_upload_failures_are_decode_errors() {
        let dir = tempfile::tempdir().unwrap();

        let missing = encode_upload(dir.path().join("missing.png")).await;
        assert!(matches!(missing, Err(StudioError::Decode(_))));

        let text = dir.path().join("notes.txt");
        std::fs::write(&text, b"just some notes, not an image").unwrap();
        assert!(matches!(
            encode_upload(&text).await,
            Err(StudioError::Decode(_))
        ));
    }

    #[test]
    fn test_decompose_data_url() {
        let payload = decompose_data_url("data:image/webp;base64,UklGRg==").unwrap();
        assert_eq!(payload.media_type, "image/webp");
        assert_eq!(payload.data, "UklGRg==");
    }

    #[test]
    fn test_decompose_rejects_missing_delimiters() {
        assert!(decompose_data_url("not a data url").is_err());
        assert!(decompose_data_url("data:image/png,abc").is_err());
    }

    #[test]
    fn test_is_image_data_url() {
        assert!(is_image_data_url("data:image/png;base64,iVBORw0KGgo="));
        assert!(!is_image_data_url("data:image/png;base64,"));
        assert!(!is_image_data_url("data:text/html;base64,PGI+"));
        assert!(!is_image_data_url("javascript:alert(1)"));
        assert!(!is_image_data_url("data:image/;base64,abc"));
    }
}
