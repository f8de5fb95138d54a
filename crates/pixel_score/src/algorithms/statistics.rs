use crate::{
    error::{Result, ScoreError},
    types::ColorStatistics,
};

/// Rec.709 luminance coefficients
pub const LUMA_R: f64 = 0.2126;
pub const LUMA_G: f64 = 0.7152;
pub const LUMA_B: f64 = 0.0722;

pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    LUMA_R * f64::from(r) + LUMA_G * f64::from(g) + LUMA_B * f64::from(b)
}

impl ColorStatistics {
    /// Accumulate luminance and per-channel statistics over interleaved
    /// RGB or RGBA bytes. Alpha is ignored.
    pub fn from_pixels(data: &[u8], channels: usize) -> Result<Self> {
        if !(3..=4).contains(&channels) {
            return Err(ScoreError::UnsupportedChannels(channels));
        }
        let count = data.len() / channels;
        if count == 0 {
            return Err(ScoreError::EmptyImage);
        }

        let mut sum = 0.0;
        let mut sum_sq = 0.0;
        let mut channel_sum = [0.0f64; 3];
        let mut channel_sum_sq = [0.0f64; 3];

        for pixel in data.chunks_exact(channels) {
            let (r, g, b) = (pixel[0], pixel[1], pixel[2]);
            let l = luminance(r, g, b);
            sum += l;
            sum_sq += l * l;

            for (i, value) in [r, g, b].into_iter().enumerate() {
                let v = f64::from(value);
                channel_sum[i] += v;
                channel_sum_sq[i] += v * v;
            }
        }

        let n = count as f64;
        let mean = sum / n;
        let contrast = population_std(sum, sum_sq, n);
        let colorfulness = (0..3)
            .map(|i| population_std(channel_sum[i], channel_sum_sq[i], n))
            .sum::<f64>()
            / 3.0;

        Ok(Self {
            mean_luminance: mean,
            contrast,
            colorfulness,
        })
    }
}

fn population_std(sum: f64, sum_sq: f64, n: f64) -> f64 {
    let mean = sum / n;
    (sum_sq / n - mean * mean).max(0.0).sqrt()
}

/// Linear penalty outside the [40, 220] luminance band, 80 units to full
pub fn brightness_penalty(mean_luminance: f64) -> f64 {
    let penalty = if mean_luminance < 40.0 {
        (40.0 - mean_luminance) / 80.0
    } else if mean_luminance > 220.0 {
        (mean_luminance - 220.0) / 80.0
    } else {
        0.0
    };
    super::clamp01(penalty)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uniform_pixels_have_no_spread() {
        let data = [128u8; 3 * 16];
        let stats = ColorStatistics::from_pixels(&data, 3).unwrap();
        assert!((stats.mean_luminance - 128.0).abs() < 1e-9);
        assert!(stats.contrast.abs() < 1e-6);
        assert!(stats.colorfulness.abs() < 1e-6);
    }

    #[test]
    fn test_black_and_white_spread() {
        let data = [0, 0, 0, 255, 255, 255];
        let stats = ColorStatistics::from_pixels(&data, 3).unwrap();
        assert!((stats.mean_luminance - 127.5).abs() < 1e-9);
        assert!((stats.contrast - 127.5).abs() < 1e-6);
        assert!((stats.colorfulness - 127.5).abs() < 1e-6);
    }

    #[test]
    fn test_alpha_channel_ignored() {
        let rgb = [10, 200, 30, 250, 5, 90];
        let rgba = [10, 200, 30, 0, 250, 5, 90, 255];
        assert_eq!(
            ColorStatistics::from_pixels(&rgb, 3).unwrap(),
            ColorStatistics::from_pixels(&rgba, 4).unwrap()
        );
    }

    #[test]
    fn test_rejects_bad_channel_counts() {
        assert!(matches!(
            ColorStatistics::from_pixels(&[1, 2], 2),
            Err(ScoreError::UnsupportedChannels(2))
        ));
        assert!(matches!(
            ColorStatistics::from_pixels(&[], 3),
            Err(ScoreError::EmptyImage)
        ));
    }

    #[test]
    fn test_brightness_penalty_band() {
        assert_eq!(brightness_penalty(128.0), 0.0);
        assert_eq!(brightness_penalty(40.0), 0.0);
        assert!((brightness_penalty(0.0) - 0.5).abs() < 1e-9);
        assert!((brightness_penalty(240.0) - 0.25).abs() < 1e-9);
        assert!((brightness_penalty(255.0) - 0.4375).abs() < 1e-9);
    }
}
