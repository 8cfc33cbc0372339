//! Edge-detection convolution over an intensity plane.
//!
//! Every algorithm reduces the input to one intensity sample per pixel,
//! computes an edge magnitude per pixel, scales it by `strength / 50` with
//! integer math and clamps it to `0..=255`. The magnitude is written to every
//! color channel. Alpha and pixels the kernel cannot reach (the outer ring for
//! Sobel and Laplacian, the last row and column for Roberts) keep their input
//! values.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::kernel::{convolve2, convolve3, LAPLACIAN, ROBERTS_ANTI, ROBERTS_MAIN, SOBEL_X, SOBEL_Y};
use crate::decode::PixelBuffer;
use crate::luminance::intensity_plane;

/// Strength at which the raw edge magnitude is written unscaled.
pub const NEUTRAL_STRENGTH: i32 = 50;

/// Errors that can occur while filtering.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    /// The sample count doesn't match the buffer's dimensions.
    #[error("Malformed pixel buffer: expected {expected} bytes, got {actual}")]
    MalformedBuffer { expected: usize, actual: usize },

    /// Algorithm name not recognized.
    #[error("Unknown edge algorithm: {0}")]
    UnknownAlgorithm(String),

    /// The run was stopped before it finished, or its result was superseded.
    #[error("Filter cancelled")]
    Cancelled,

    /// The worker thread panicked mid-run.
    #[error("Filter worker panicked: {0}")]
    WorkerPanicked(String),

    /// The worker thread could not be started.
    #[error("Failed to start filter worker: {0}")]
    SpawnFailed(String),
}

/// Edge-detection algorithm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeAlgorithm {
    /// 2×2 diagonal differences.
    Roberts,
    /// 3×3 gradient magnitude.
    Sobel,
    /// 3×3 second derivative.
    Laplacian,
}

impl EdgeAlgorithm {
    pub const ALL: [EdgeAlgorithm; 3] = [Self::Roberts, Self::Sobel, Self::Laplacian];

    pub fn name(self) -> &'static str {
        match self {
            Self::Roberts => "roberts",
            Self::Sobel => "sobel",
            Self::Laplacian => "laplacian",
        }
    }

    /// Column and row ranges this algorithm writes for a `width`×`height` image.
    pub(crate) fn interior(self, width: usize, height: usize) -> (Range<usize>, Range<usize>) {
        match self {
            Self::Roberts => (0..width.saturating_sub(1), 0..height.saturating_sub(1)),
            Self::Sobel | Self::Laplacian => {
                (1..width.saturating_sub(1), 1..height.saturating_sub(1))
            }
        }
    }

    /// Unscaled, non-negative edge magnitude at `(x, y)`.
    #[inline]
    fn magnitude(self, plane: &[u8], width: usize, x: usize, y: usize) -> i64 {
        match self {
            Self::Roberts => {
                let main = convolve2(plane, width, x, y, &ROBERTS_MAIN);
                let anti = convolve2(plane, width, x, y, &ROBERTS_ANTI);
                (main.abs() + anti.abs()) as i64
            }
            Self::Sobel => {
                let gx = convolve3(plane, width, x, y, &SOBEL_X) as i64;
                let gy = convolve3(plane, width, x, y, &SOBEL_Y) as i64;
                ((gx * gx + gy * gy) as f64).sqrt() as i64
            }
            Self::Laplacian => convolve3(plane, width, x, y, &LAPLACIAN).abs() as i64,
        }
    }
}

impl fmt::Display for EdgeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EdgeAlgorithm {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|algorithm| algorithm.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| FilterError::UnknownAlgorithm(s.to_string()))
    }
}

/// Scale a magnitude by `strength / 50` and clamp it to a sample.
#[inline]
fn scale_magnitude(magnitude: i64, strength: i32) -> u8 {
    (magnitude * strength as i64 / NEUTRAL_STRENGTH as i64).clamp(0, 255) as u8
}

fn check_buffer(buffer: &PixelBuffer) -> Result<(), FilterError> {
    match buffer.len_mismatch() {
        Some((expected, actual)) => Err(FilterError::MalformedBuffer { expected, actual }),
        None => Ok(()),
    }
}

/// Run an edge filter over the whole buffer.
///
/// The input is never modified; the result has the same size and layout.
///
/// # Errors
///
/// Returns `FilterError::MalformedBuffer` if the sample count doesn't match
/// the buffer's dimensions.
pub fn apply_edge_filter(
    buffer: &PixelBuffer,
    algorithm: EdgeAlgorithm,
    strength: i32,
) -> Result<PixelBuffer, FilterError> {
    apply_edge_filter_until(buffer, algorithm, strength, || false)
}

/// Like [`apply_edge_filter`], but polls `should_stop` before every row and
/// gives up with `FilterError::Cancelled` once it returns `true`.
pub fn apply_edge_filter_until<F>(
    buffer: &PixelBuffer,
    algorithm: EdgeAlgorithm,
    strength: i32,
    should_stop: F,
) -> Result<PixelBuffer, FilterError>
where
    F: Fn() -> bool,
{
    check_buffer(buffer)?;

    let width = buffer.width as usize;
    let height = buffer.height as usize;
    let channels = buffer.layout.channels();
    let color_channels = buffer.layout.color_channels();

    let plane = intensity_plane(buffer);
    let mut output = buffer.clone();
    let (columns, rows) = algorithm.interior(width, height);

    for y in rows {
        if should_stop() {
            return Err(FilterError::Cancelled);
        }
        let row_start = y * width;
        for x in columns.clone() {
            let value = scale_magnitude(algorithm.magnitude(&plane, width, x, y), strength);
            let offset = (row_start + x) * channels;
            output.pixels[offset..offset + color_channels].fill(value);
        }
    }

    Ok(output)
}

/// Filter several buffers with the same settings.
///
/// Results come back in input order; a failing buffer doesn't affect the
/// others. Runs on the rayon pool when the `parallel` feature is enabled.
pub fn apply_batch(
    buffers: &[PixelBuffer],
    algorithm: EdgeAlgorithm,
    strength: i32,
) -> Vec<Result<PixelBuffer, FilterError>> {
    #[cfg(feature = "parallel")]
    {
        use rayon::prelude::*;
        buffers
            .par_iter()
            .map(|buffer| apply_edge_filter(buffer, algorithm, strength))
            .collect()
    }

    #[cfg(not(feature = "parallel"))]
    {
        buffers
            .iter()
            .map(|buffer| apply_edge_filter(buffer, algorithm, strength))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::PixelLayout;
    use std::cell::Cell;

    /// Gray image, black left of `step_at` and white from it on.
    fn step_image(width: u32, height: u32, step_at: u32) -> PixelBuffer {
        let pixels = (0..height)
            .flat_map(|_| (0..width).map(move |x| if x < step_at { 0 } else { 255 }))
            .collect();
        PixelBuffer::gray(width, height, pixels)
    }

    fn sample(buffer: &PixelBuffer, x: u32, y: u32) -> u8 {
        buffer.pixel(x, y)[0]
    }

    #[test]
    fn test_sobel_step_boundary_is_strong() {
        let image = step_image(4, 4, 2);
        let result = apply_edge_filter(&image, EdgeAlgorithm::Sobel, 50).unwrap();

        for y in 1..3 {
            assert!(sample(&result, 1, y) > 200);
            assert!(sample(&result, 2, y) > 200);
        }
    }

    #[test]
    fn test_sobel_flat_regions_are_zero() {
        let image = step_image(8, 4, 4);
        let result = apply_edge_filter(&image, EdgeAlgorithm::Sobel, 50).unwrap();

        for y in 1..3 {
            assert_eq!(sample(&result, 1, y), 0);
            assert_eq!(sample(&result, 2, y), 0);
            assert_eq!(sample(&result, 3, y), 255);
            assert_eq!(sample(&result, 4, y), 255);
            assert_eq!(sample(&result, 5, y), 0);
            assert_eq!(sample(&result, 6, y), 0);
        }
    }

    #[test]
    fn test_border_carries_through() {
        let image = step_image(4, 4, 2);
        for algorithm in [EdgeAlgorithm::Sobel, EdgeAlgorithm::Laplacian] {
            let result = apply_edge_filter(&image, algorithm, 50).unwrap();
            for i in 0..4 {
                assert_eq!(result.pixel(i, 0), image.pixel(i, 0));
                assert_eq!(result.pixel(i, 3), image.pixel(i, 3));
                assert_eq!(result.pixel(0, i), image.pixel(0, i));
                assert_eq!(result.pixel(3, i), image.pixel(3, i));
            }
        }
    }

    #[test]
    fn test_roberts_leaves_last_row_and_column() {
        let image = step_image(4, 4, 2);
        let result = apply_edge_filter(&image, EdgeAlgorithm::Roberts, 50).unwrap();

        for y in 0..3 {
            assert_eq!(sample(&result, 0, y), 0);
            assert_eq!(sample(&result, 1, y), 255);
            assert_eq!(sample(&result, 2, y), 0);
            assert_eq!(sample(&result, 3, y), 255);
        }
        for x in 0..4 {
            assert_eq!(result.pixel(x, 3), image.pixel(x, 3));
        }
    }

    #[test]
    fn test_roberts_integer_scaling() {
        // |40 - 0| + |0 - 0| = 40 at the top-left pixel
        let image = PixelBuffer::gray(2, 2, vec![40, 0, 0, 0]);

        let neutral = apply_edge_filter(&image, EdgeAlgorithm::Roberts, 50).unwrap();
        assert_eq!(sample(&neutral, 0, 0), 40);

        let doubled = apply_edge_filter(&image, EdgeAlgorithm::Roberts, 100).unwrap();
        assert_eq!(sample(&doubled, 0, 0), 80);

        let third = apply_edge_filter(&image, EdgeAlgorithm::Roberts, 17).unwrap();
        assert_eq!(sample(&third, 0, 0), 13); // 40 * 17 / 50 = 13.6
    }

    #[test]
    fn test_laplacian_single_spike() {
        let mut pixels = vec![0u8; 9];
        pixels[4] = 30;
        let image = PixelBuffer::gray(3, 3, pixels);

        let result = apply_edge_filter(&image, EdgeAlgorithm::Laplacian, 50).unwrap();
        assert_eq!(sample(&result, 1, 1), 120);
    }

    #[test]
    fn test_strength_zero_is_black() {
        let image = step_image(6, 6, 3);
        for algorithm in EdgeAlgorithm::ALL {
            let result = apply_edge_filter(&image, algorithm, 0).unwrap();
            let (columns, rows) = algorithm.interior(6, 6);
            for y in rows {
                for x in columns.clone() {
                    assert_eq!(sample(&result, x as u32, y as u32), 0);
                }
            }
        }
    }

    #[test]
    fn test_negative_strength_clamps_to_black() {
        let image = step_image(4, 4, 2);
        let result = apply_edge_filter(&image, EdgeAlgorithm::Sobel, -50).unwrap();
        assert_eq!(sample(&result, 1, 1), 0);
    }

    #[test]
    fn test_color_output_is_gray_with_alpha_kept() {
        let mut pixels = Vec::new();
        for y in 0..3u8 {
            for x in 0..3u8 {
                let v = if x == 2 { 255 } else { 0 };
                pixels.extend_from_slice(&[v, v, v, 10 * (y * 3 + x)]);
            }
        }
        let image = PixelBuffer::new(3, 3, PixelLayout::Rgba8, pixels);
        let result = apply_edge_filter(&image, EdgeAlgorithm::Sobel, 50).unwrap();

        assert_eq!(result.layout, PixelLayout::Rgba8);
        assert_eq!(result.pixel(1, 1), &[255, 255, 255, 40]);
    }

    #[test]
    fn test_input_is_not_modified() {
        let image = step_image(5, 5, 2);
        let copy = image.clone();
        let _ = apply_edge_filter(&image, EdgeAlgorithm::Laplacian, 80).unwrap();
        assert_eq!(image, copy);
    }

    #[test]
    fn test_tiny_images_pass_through() {
        let image = PixelBuffer::gray(1, 1, vec![99]);
        for algorithm in EdgeAlgorithm::ALL {
            assert_eq!(apply_edge_filter(&image, algorithm, 50).unwrap(), image);
        }
    }

    #[test]
    fn test_malformed_buffer_fails() {
        let image = PixelBuffer {
            width: 4,
            height: 4,
            layout: PixelLayout::Rgb8,
            pixels: vec![0; 10],
        };
        assert_eq!(
            apply_edge_filter(&image, EdgeAlgorithm::Sobel, 50),
            Err(FilterError::MalformedBuffer {
                expected: 48,
                actual: 10
            })
        );
    }

    #[test]
    fn test_overflowing_dimensions_fail() {
        let image = PixelBuffer {
            width: u32::MAX,
            height: u32::MAX,
            layout: PixelLayout::Rgba8,
            pixels: Vec::new(),
        };
        for algorithm in EdgeAlgorithm::ALL {
            assert_eq!(
                apply_edge_filter(&image, algorithm, 50),
                Err(FilterError::MalformedBuffer {
                    expected: usize::MAX,
                    actual: 0
                })
            );
        }
    }

    #[test]
    fn test_stop_between_rows() {
        let image = step_image(16, 16, 8);
        let polls = Cell::new(0);
        let result = apply_edge_filter_until(&image, EdgeAlgorithm::Sobel, 50, || {
            polls.set(polls.get() + 1);
            polls.get() > 3
        });

        assert_eq!(result, Err(FilterError::Cancelled));
        assert_eq!(polls.get(), 4);
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("sobel".parse::<EdgeAlgorithm>(), Ok(EdgeAlgorithm::Sobel));
        assert_eq!(" Roberts ".parse::<EdgeAlgorithm>(), Ok(EdgeAlgorithm::Roberts));
        assert_eq!(
            "LAPLACIAN".parse::<EdgeAlgorithm>(),
            Ok(EdgeAlgorithm::Laplacian)
        );
        assert!(matches!(
            "canny".parse::<EdgeAlgorithm>(),
            Err(FilterError::UnknownAlgorithm(_))
        ));
        assert_eq!(EdgeAlgorithm::Laplacian.to_string(), "laplacian");
    }

    #[test]
    fn test_batch_keeps_order_and_isolates_failures() {
        let good = step_image(4, 4, 2);
        let bad = PixelBuffer {
            width: 4,
            height: 4,
            layout: PixelLayout::Gray8,
            pixels: vec![0; 3],
        };
        let flat = PixelBuffer::gray(4, 4, vec![128; 16]);

        let results = apply_batch(&[good.clone(), bad, flat], EdgeAlgorithm::Sobel, 50);
        assert_eq!(results.len(), 3);
        assert_eq!(
            results[0].as_ref().unwrap(),
            &apply_edge_filter(&good, EdgeAlgorithm::Sobel, 50).unwrap()
        );
        assert!(results[1].is_err());
        assert_eq!(sample(results[2].as_ref().unwrap(), 1, 1), 0);
    }
}
