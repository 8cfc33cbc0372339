//! Fixed edge-detection kernels and the neighborhood sums built on them.
//!
//! Kernels are indexed `[dy][dx]`. The 3×3 kernels are centered on the
//! output pixel; the 2×2 Roberts kernels are anchored at its top-left.

/// A 3×3 integer kernel, indexed `[dy][dx]`.
pub type Kernel = [[i32; 3]; 3];

/// A 2×2 integer kernel anchored at the output pixel.
pub type Kernel2 = [[i32; 2]; 2];

/// Sobel horizontal gradient.
pub const SOBEL_X: Kernel = [[-1, 0, 1], [-2, 0, 2], [-1, 0, 1]];

/// Sobel vertical gradient.
pub const SOBEL_Y: Kernel = [[-1, -2, -1], [0, 0, 0], [1, 2, 1]];

/// Four-neighbor Laplacian.
pub const LAPLACIAN: Kernel = [[0, 1, 0], [1, -4, 1], [0, 1, 0]];

/// Roberts cross, main diagonal: `p(x,y) - p(x+1,y+1)`.
pub const ROBERTS_MAIN: Kernel2 = [[1, 0], [0, -1]];

/// Roberts cross, anti-diagonal: `p(x+1,y) - p(x,y+1)`.
pub const ROBERTS_ANTI: Kernel2 = [[0, 1], [-1, 0]];

/// Sum of the 3×3 neighborhood centered at `(x, y)` weighted by `kernel`.
///
/// `plane` is a row-major intensity plane `width` samples wide. The caller
/// keeps `(x, y)` at least one pixel away from every edge.
#[inline]
pub fn convolve3(plane: &[u8], width: usize, x: usize, y: usize, kernel: &Kernel) -> i32 {
    let mut sum = 0;
    for (dy, row) in kernel.iter().enumerate() {
        let base = (y + dy - 1) * width + x - 1;
        for (dx, &weight) in row.iter().enumerate() {
            sum += weight * plane[base + dx] as i32;
        }
    }
    sum
}

/// Sum of the 2×2 neighborhood whose top-left corner is `(x, y)`.
#[inline]
pub fn convolve2(plane: &[u8], width: usize, x: usize, y: usize, kernel: &Kernel2) -> i32 {
    let mut sum = 0;
    for (dy, row) in kernel.iter().enumerate() {
        let base = (y + dy) * width + x;
        for (dx, &weight) in row.iter().enumerate() {
            sum += weight * plane[base + dx] as i32;
        }
    }
    sum
}
