// SPDX-License-Identifier: MIT
//! Training-grid alignment. The backend stores train resolutions rounded up
//! to 64px multiples; these helpers let the client predict that value for
//! display before the server responds.

/// Alignment grid used for training resolutions, in pixels.
pub const GRID_SIZE: u32 = 64;

/// Smallest [`GRID_SIZE`] multiple that fits `value`. Zero maps to one grid
/// cell rather than zero.
pub fn round_up_to_grid(value: u32) -> u32 {
    if value == 0 {
        return GRID_SIZE;
    }
    value.div_ceil(GRID_SIZE) * GRID_SIZE
}

/// Training resolution (`[height, width]`) aligned to the grid.
pub fn aligned_resolution(height: u32, width: u32) -> [u32; 2] {
    [round_up_to_grid(height), round_up_to_grid(width)]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rounds_up_to_next_multiple() {
        assert_eq!(round_up_to_grid(0), 64);
        assert_eq!(round_up_to_grid(1), 64);
        assert_eq!(round_up_to_grid(64), 64);
        assert_eq!(round_up_to_grid(65), 128);
        assert_eq!(round_up_to_grid(1000), 1024);
    }

    #[test]
    fn aligns_both_axes() {
        assert_eq!(aligned_resolution(480, 640), [512, 640]);
        assert_eq!(aligned_resolution(1080, 1920), [1088, 1920]);
    }
}
