use std::io::Cursor;
use image::DynamicImage;

/// Reads the EXIF orientation tag (0x0112) from encoded image bytes.
/// Anything without a readable tag is treated as upright (1).
pub fn read_exif_orientation(bytes: &[u8]) -> u32 {
    let mut cursor = Cursor::new(bytes);
    let exif = match exif::Reader::new().read_from_container(&mut cursor) {
        Ok(exif) => exif,
        Err(_) => return 1,
    };

    exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)
        .and_then(|field| field.value.get_uint(0))
        .unwrap_or(1)
}

/// Rotates/flips a decoded image so it displays upright.
pub fn apply_orientation(image: DynamicImage, orientation: u32) -> DynamicImage {
    match orientation {
        2 => image.fliph(),
        3 => image.rotate180(),
        4 => image.flipv(),
        5 => image.rotate90().fliph(),
        6 => image.rotate90(),
        7 => image.rotate270().fliph(),
        8 => image.rotate270(),
        _ => image,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use image::{GenericImageView, ImageFormat, Rgb, RgbImage};

    /// Encodes `img` as JPEG and splices in an APP1 Exif segment right after
    /// SOI carrying a single big-endian Orientation (0x0112) SHORT entry.
    pub(crate) fn jpeg_with_orientation(img: RgbImage, orientation: u16) -> Vec<u8> {
        let mut jpeg = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut jpeg, ImageFormat::Jpeg)
            .unwrap();
        let jpeg = jpeg.into_inner();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);

        let mut payload = b"Exif\0\0".to_vec();
        payload.extend_from_slice(b"MM\0\x2a\0\0\0\x08");
        payload.extend_from_slice(&1u16.to_be_bytes());
        payload.extend_from_slice(&0x0112u16.to_be_bytes());
        payload.extend_from_slice(&3u16.to_be_bytes());
        payload.extend_from_slice(&1u32.to_be_bytes());
        payload.extend_from_slice(&orientation.to_be_bytes());
        payload.extend_from_slice(&[0, 0]);
        payload.extend_from_slice(&0u32.to_be_bytes());

        let mut out = vec![0xFF, 0xD8, 0xFF, 0xE1];
        out.extend_from_slice(&((payload.len() + 2) as u16).to_be_bytes());
        out.extend_from_slice(&payload);
        out.extend_from_slice(&jpeg[2..]);
        out
    }

    #[test]
    fn test_reads_orientation_from_jpeg_exif() {
        let bytes = jpeg_with_orientation(RgbImage::new(16, 8), 6);
        assert_eq!(read_exif_orientation(&bytes), 6);

        let upright = jpeg_with_orientation(RgbImage::new(16, 8), 1);
        assert_eq!(read_exif_orientation(&upright), 1);
    }

    fn marked_image() -> DynamicImage {
        // 3x2, red marker in the top-left corner.
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 0, Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    #[test]
    fn test_no_exif_is_upright() {
        assert_eq!(read_exif_orientation(b"definitely not an image"), 1);
        assert_eq!(read_exif_orientation(&[]), 1);
    }

    #[test]
    fn test_identity_and_unknown() {
        let img = apply_orientation(marked_image(), 1);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(0, 0)[0], 255);

        let img = apply_orientation(marked_image(), 42);
        assert_eq!(img.dimensions(), (3, 2));
    }

    #[test]
    fn test_rotate90_swaps_dimensions() {
        let img = apply_orientation(marked_image(), 6);
        assert_eq!(img.dimensions(), (2, 3));
        // Clockwise rotation moves the top-left corner to the top-right.
        assert_eq!(img.get_pixel(1, 0)[0], 255);
    }

    #[test]
    fn test_rotate180_moves_marker() {
        let img = apply_orientation(marked_image(), 3);
        assert_eq!(img.dimensions(), (3, 2));
        assert_eq!(img.get_pixel(2, 1)[0], 255);
    }

    #[test]
    fn test_mirror_horizontal() {
        let img = apply_orientation(marked_image(), 2);
        assert_eq!(img.get_pixel(2, 0)[0], 255);
        assert_eq!(img.get_pixel(0, 0)[0], 0);
    }
}
