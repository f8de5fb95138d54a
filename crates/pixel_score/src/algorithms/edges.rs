use image::GrayImage;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use crate::{error::Result, traits::EdgeAnalyzer, types::EdgeStatistics};

/// 3x3 Sobel gradient analysis over interior pixels
#[derive(Debug, Clone)]
pub struct SobelEdgeAnalyzer {
    /// Magnitude above which a pixel counts towards edge density
    pub magnitude_threshold: f64,
    /// Side fraction of the central region used for `center_edge`
    pub center_fraction: f64,
}

impl Default for SobelEdgeAnalyzer {
    fn default() -> Self {
        Self {
            magnitude_threshold: 32.0,
            center_fraction: 0.6,
        }
    }
}

impl SobelEdgeAnalyzer {
    pub fn new(magnitude_threshold: f64, center_fraction: f64) -> Self {
        Self {
            magnitude_threshold: magnitude_threshold.max(0.0),
            center_fraction: if center_fraction > 0.0 && center_fraction <= 1.0 {
                center_fraction
            } else {
                0.6
            },
        }
    }

    /// Half-open `[start, end)` bounds of the central region along one axis
    fn center_bounds(&self, len: u32) -> (u32, u32) {
        let margin = (f64::from(len) * (1.0 - self.center_fraction) / 2.0).floor() as u32;
        (margin, len.saturating_sub(margin))
    }
}

impl EdgeAnalyzer for SobelEdgeAnalyzer {
    fn analyze(&self, image: &GrayImage) -> Result<EdgeStatistics> {
        let (width, height) = image.dimensions();
        if width < 3 || height < 3 {
            return Ok(EdgeStatistics::default());
        }

        let gx = horizontal_sobel(image);
        let gy = vertical_sobel(image);
        let (cx0, cx1) = self.center_bounds(width);
        let (cy0, cy1) = self.center_bounds(height);

        let mut total = 0.0;
        let mut count = 0usize;
        let mut strong = 0usize;
        let mut center_total = 0.0;
        let mut center_count = 0usize;

        for y in 1..height - 1 {
            for x in 1..width - 1 {
                let dx = f64::from(gx.get_pixel(x, y)[0]);
                let dy = f64::from(gy.get_pixel(x, y)[0]);
                let magnitude = (dx * dx + dy * dy).sqrt();

                total += magnitude;
                count += 1;
                if magnitude > self.magnitude_threshold {
                    strong += 1;
                }
                if (cx0..cx1).contains(&x) && (cy0..cy1).contains(&y) {
                    center_total += magnitude;
                    center_count += 1;
                }
            }
        }

        let n = count as f64;
        Ok(EdgeStatistics {
            mean_edge: total / n,
            edge_density: strong as f64 / n,
            center_edge: if center_count > 0 {
                center_total / center_count as f64
            } else {
                0.0
            },
        })
    }
}
