//! Byte-level image decoding with EXIF orientation handling.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::{DynamicImage, ImageReader};

use super::{DecodeError, Orientation, PixelBuffer};

/// Decode an image from bytes, applying EXIF orientation correction.
///
/// The container format (PNG, JPEG, BMP) is detected from the leading bytes.
///
/// # Errors
///
/// Returns `DecodeError::EmptyInput` for an empty slice and
/// `DecodeError::CorruptedFile` if the bytes cannot be decoded.
pub fn decode_image(bytes: &[u8]) -> Result<PixelBuffer, DecodeError> {
    let orientation = extract_orientation(bytes);
    let img = read_dynamic(bytes)?;
    Ok(PixelBuffer::from_dynamic_image(apply_orientation(
        img,
        orientation,
    )))
}

/// Decode the first readable image from a sequence of candidate files.
///
/// Candidates that fail to decode, or decode to a zero-sized image, are
/// skipped. This is how a dropped archive is opened: every member is offered
/// in order and the first real image wins.
///
/// # Errors
///
/// Returns `DecodeError::NoDecodableImage` with the number of candidates seen
/// when none of them decode.
pub fn decode_first<'a, I>(candidates: I) -> Result<PixelBuffer, DecodeError>
where
    I: IntoIterator<Item = &'a [u8]>,
{
    let mut seen = 0usize;
    for bytes in candidates {
        seen += 1;
        match decode_image(bytes) {
            Ok(buffer) if !buffer.is_empty() => return Ok(buffer),
            Ok(_) => log::warn!("Skipping candidate {}: zero-sized image", seen),
            Err(e) => log::warn!("Skipping candidate {}: {}", seen, e),
        }
    }
    Err(DecodeError::NoDecodableImage(seen))
}

fn read_dynamic(bytes: &[u8]) -> Result<DynamicImage, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))?;

    reader
        .decode()
        .map_err(|e| DecodeError::CorruptedFile(e.to_string()))
}

/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined.
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let mut cursor = Cursor::new(bytes);

    match Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif
            .get_field(Tag::Orientation, In::PRIMARY)
            .and_then(|field| field.value.get_uint(0))
            .map(Orientation::from)
            .unwrap_or_default(),
        Err(_) => Orientation::Normal,
    }
}

fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}
