//! Bar waveform rasterization
//!
//! Each amplitude becomes one solid bar growing up from the bottom edge of
//! an `image_width x peak_height` canvas. Bars are pixel-exact (no
//! anti-aliasing) and everything outside the canvas is clipped: a bar taller
//! than the canvas is cut at the top edge, bars with a non-positive height
//! draw nothing, and bars starting past the right edge are dropped.

pub use image::{Rgba, RgbaImage};

use crate::params::{BarGeometry, WaveformParameters};

/// Opaque white
pub const DEFAULT_BAR_COLOR: Rgba<u8> = Rgba([255, 255, 255, 255]);

/// A bar's rectangle after clipping to the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BarRect {
    pub left: u32,
    pub top: u32,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformRasterizer {
    image_width: u32,
    peak_height: u32,
    geometry: BarGeometry,
    bar_color: Rgba<u8>,
}

impl WaveformRasterizer {
    pub fn new(image_width: u32, peak_height: u32, geometry: BarGeometry) -> Self {
        Self {
            image_width,
            peak_height,
            geometry,
            bar_color: DEFAULT_BAR_COLOR,
        }
    }

    pub fn for_params(params: &WaveformParameters) -> Self {
        Self::new(params.image_width, params.peak_height, params.geometry())
    }

    pub fn with_color(mut self, color: Rgba<u8>) -> Self {
        self.bar_color = color;
        self
    }

    /// Clipped rectangle of bar `index` with amplitude `value`
    ///
    /// `None` when nothing of the bar is visible.
    pub fn bar_rect(&self, index: usize, value: f32) -> Option<BarRect> {
        let left = self.geometry.bar_left(index);
        if left >= self.image_width as u64 {
            return None;
        }

        let height = (self.peak_height as f32 * value).round();
        // Also rejects NaN
        if !(height >= 1.0) {
            return None;
        }
        let height = (height as u64).min(self.peak_height as u64) as u32;

        let width = (self.geometry.block_size as u64).min(self.image_width as u64 - left) as u32;
        if width == 0 {
            return None;
        }

        Some(BarRect {
            left: left as u32,
            top: self.peak_height - height,
            width,
            height,
        })
    }

    /// Draw `values` onto a fresh transparent canvas
    pub fn render(&self, values: &[f32]) -> RgbaImage {
        let mut image = RgbaImage::new(self.image_width, self.peak_height);

        for (index, &value) in values.iter().enumerate() {
            if self.geometry.bar_left(index) >= self.image_width as u64 {
                log::debug!(
                    "render: {} of {} bars fall past the right edge",
                    values.len() - index,
                    values.len()
                );
                break;
            }

            let Some(rect) = self.bar_rect(index, value) else {
                continue;
            };

            for y in rect.top..rect.top + rect.height {
                for x in rect.left..rect.left + rect.width {
                    image.put_pixel(x, y, self.bar_color);
                }
            }
        }

        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

    fn filled_columns(image: &RgbaImage, y: u32) -> Vec<u32> {
        (0..image.width())
            .filter(|&x| *image.get_pixel(x, y) != TRANSPARENT)
            .collect()
    }

    #[test]
    fn test_empty_values_give_blank_canvas() {
        let image = WaveformRasterizer::new(100, 40, BarGeometry::new(2, 1)).render(&[]);
        assert_eq!(image.dimensions(), (100, 40));
        assert!(image.pixels().all(|p| *p == TRANSPARENT));
    }

    #[test]
    fn test_bar_geometry() {
        let rasterizer = WaveformRasterizer::new(30, 10, BarGeometry::new(2, 1));
        assert_eq!(
            rasterizer.bar_rect(0, 0.5),
            Some(BarRect { left: 0, top: 5, width: 2, height: 5 })
        );
        assert_eq!(
            rasterizer.bar_rect(4, 1.0),
            Some(BarRect { left: 12, top: 0, width: 2, height: 10 })
        );
    }

    #[test]
    fn test_bars_grow_from_bottom() {
        let rasterizer = WaveformRasterizer::new(9, 10, BarGeometry::new(2, 1));
        let image = rasterizer.render(&[1.0, 0.5, 0.2]);

        // Bottom row: every bar, separated by one-pixel gaps
        assert_eq!(filled_columns(&image, 9), vec![0, 1, 3, 4, 6, 7]);
        // Row 5 is within the top half: only bars >= 0.5
        assert_eq!(filled_columns(&image, 5), vec![0, 1, 3, 4]);
        // Top row: only the full-height bar
        assert_eq!(filled_columns(&image, 0), vec![0, 1]);
        assert_eq!(*image.get_pixel(0, 0), DEFAULT_BAR_COLOR);
    }

    #[test]
    fn test_render_is_deterministic() {
        let values: Vec<f32> = (0..40).map(|i| (i as f32 * 0.3).sin().abs()).collect();
        let rasterizer = WaveformRasterizer::new(120, 50, BarGeometry::new(2, 1));
        assert_eq!(rasterizer.render(&values), rasterizer.render(&values));
    }

    #[test]
    fn test_out_of_range_amplitudes_are_clipped() {
        let rasterizer = WaveformRasterizer::new(10, 10, BarGeometry::new(2, 0));
        assert_eq!(
            rasterizer.bar_rect(0, 3.5),
            Some(BarRect { left: 0, top: 0, width: 2, height: 10 })
        );
        assert_eq!(rasterizer.bar_rect(1, -0.5), None);
        assert_eq!(rasterizer.bar_rect(1, 0.0), None);
        assert_eq!(rasterizer.bar_rect(1, f32::NAN), None);

        let image = rasterizer.render(&[3.5, -0.5]);
        assert_eq!(filled_columns(&image, 0), vec![0, 1]);
    }

    #[test]
    fn test_bars_past_right_edge_do_not_panic() {
        let rasterizer = WaveformRasterizer::new(10, 4, BarGeometry::new(3, 1));
        // Bar 2 starts at 8 and is cut to 2 pixels, bars 3+ are off canvas
        assert_eq!(
            rasterizer.bar_rect(2, 1.0),
            Some(BarRect { left: 8, top: 0, width: 2, height: 4 })
        );
        assert_eq!(rasterizer.bar_rect(3, 1.0), None);

        let image = rasterizer.render(&[1.0; 20]);
        assert_eq!(filled_columns(&image, 3), vec![0, 1, 2, 4, 5, 6, 8, 9]);
    }

    #[test]
    fn test_custom_color() {
        let red = Rgba([255, 0, 0, 255]);
        let image = WaveformRasterizer::new(4, 4, BarGeometry::new(4, 0))
            .with_color(red)
            .render(&[1.0]);
        assert!(image.pixels().all(|p| *p == red));
    }
}
