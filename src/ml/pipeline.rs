use image::{imageops::FilterType, GenericImageView, RgbImage};
use ndarray::{Array3, ArrayView3};
use tracing::debug;

use crate::error::{Error, Result};
use crate::media::orientation;
use crate::ml::round_half_up;

/// Side of the square the decoded image is cover-fitted to.
pub const RESIZE_SIZE: u32 = 256;
/// Side of the square fed to the scorer.
pub const CROP_SIZE: u32 = 224;
pub const CHANNELS: usize = 3;
pub const TENSOR_LEN: usize = CHANNELS * (CROP_SIZE as usize) * (CROP_SIZE as usize);

/// ImageNet statistics, R, G, B.
pub const IMAGENET_MEAN: [f64; 3] = [0.485, 0.456, 0.406];
pub const IMAGENET_STD: [f64; 3] = [0.229, 0.224, 0.225];

const GRAY_WORLD_EPSILON: f64 = 1e-6;

/// Channel-first (3, 224, 224) float tensor of ImageNet z-scores.
///
/// Memory order is planar: every red value, then every green, then every blue.
#[derive(Debug, Clone, PartialEq)]
pub struct PreprocessedTensor {
    data: Array3<f32>,
}

#[allow(clippy::len_without_is_empty)]
impl PreprocessedTensor {
    /// Wraps planar values. Returns `None` unless exactly `TENSOR_LEN` values are given.
    pub fn from_planar(values: Vec<f32>) -> Option<Self> {
        let side = CROP_SIZE as usize;
        Array3::from_shape_vec((CHANNELS, side, side), values)
            .ok()
            .map(|data| Self { data })
    }

    pub fn view(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// Values in canonical planar order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = f32> + '_ {
        self.data.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }
}

/// Runs the full preprocessing chain on encoded image bytes.
pub fn preprocess(bytes: &[u8]) -> Result<PreprocessedTensor> {
    let resized = decode_and_resize(bytes)?;
    let cropped = center_crop(resized.as_raw(), RESIZE_SIZE, CROP_SIZE);
    let balanced = gray_world(&cropped);
    Ok(normalize(&balanced))
}

/// Decodes, applies EXIF orientation, and cover-fits to 256x256 RGB.
pub fn decode_and_resize(bytes: &[u8]) -> Result<RgbImage> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::image_processing(format!(
            "image has empty dimensions {}x{}",
            width, height
        )));
    }

    let orientation = orientation::read_exif_orientation(bytes);
    debug!(width, height, orientation, "decoded image");
    let image = orientation::apply_orientation(image, orientation);

    let resized = image
        .resize_to_fill(RESIZE_SIZE, RESIZE_SIZE, FilterType::Lanczos3)
        .to_rgb8();

    if resized.dimensions() != (RESIZE_SIZE, RESIZE_SIZE) {
        return Err(Error::image_processing(format!(
            "resize produced {}x{}, expected {}x{}",
            resized.width(),
            resized.height(),
            RESIZE_SIZE,
            RESIZE_SIZE
        )));
    }

    Ok(resized)
}

/// Left and top offsets of a centered `dst` square inside a `src` square.
pub(crate) fn crop_offsets(src: u32, dst: u32) -> (u32, u32) {
    debug_assert!(dst <= src, "crop {} larger than source {}", dst, src);
    let offset = (src - dst) / 2;
    (offset, offset)
}

/// Copies the centered `dst`x`dst` region out of an interleaved RGB `src`x`src` buffer.
pub(crate) fn center_crop(raw: &[u8], src: u32, dst: u32) -> Vec<u8> {
    debug_assert_eq!(raw.len(), (src as usize) * (src as usize) * CHANNELS);
    let (left, top) = crop_offsets(src, dst);
    let (src, dst, left, top) = (src as usize, dst as usize, left as usize, top as usize);
    let row_bytes = dst * CHANNELS;

    let mut out = Vec::with_capacity(dst * row_bytes);
    for row in 0..dst {
        let start = ((top + row) * src + left) * CHANNELS;
        out.extend_from_slice(&raw[start..start + row_bytes]);
    }
    out
}

/// Per-channel gray-world gains for an interleaved RGB buffer.
pub fn gray_world_scales(raw: &[u8]) -> [f64; 3] {
    let mut sums = [0.0f64; 3];
    for pixel in raw.chunks_exact(CHANNELS) {
        for c in 0..CHANNELS {
            sums[c] += pixel[c] as f64;
        }
    }

    let pixel_count = (raw.len() / CHANNELS) as f64;
    let means = sums.map(|sum| sum / pixel_count + GRAY_WORLD_EPSILON);
    let overall = (means[0] + means[1] + means[2]) / 3.0;
    means.map(|mean| overall / mean)
}

/// Gray-world color constancy: pulls every channel mean towards the overall mean.
pub fn gray_world(raw: &[u8]) -> Vec<u8> {
    let scales = gray_world_scales(raw);
    raw.chunks_exact(CHANNELS)
        .flat_map(move |pixel| {
            (0..CHANNELS).map(move |c| {
                round_half_up(pixel[c] as f64 * scales[c]).clamp(0.0, 255.0) as u8
            })
        })
        .collect()
}

/// Builds the planar z-score tensor from a balanced 224x224 RGB buffer.
pub fn normalize(balanced: &[u8]) -> PreprocessedTensor {
    let side = CROP_SIZE as usize;
    let data = Array3::from_shape_fn((CHANNELS, side, side), |(c, y, x)| {
        let value = balanced[(y * side + x) * CHANNELS + c] as f64 / 255.0;
        ((value - IMAGENET_MEAN[c]) / IMAGENET_STD[c]) as f32
    });
    PreprocessedTensor { data }
}
