use image::{DynamicImage, RgbImage, imageops::FilterType};
use crate::{
    error::{Result, ScoreError},
    traits::ThumbnailSampler,
};

/// Resizes so the image fits inside a `max_side` square, keeping aspect ratio.
/// Smaller images are enlarged.
#[derive(Debug, Clone)]
pub struct FitInsideSampler {
    pub max_side: u32,
    pub filter: FilterType,
}

impl Default for FitInsideSampler {
    fn default() -> Self {
        Self {
            max_side: 64,
            filter: FilterType::Lanczos3,
        }
    }
}

impl ThumbnailSampler for FitInsideSampler {
    fn sample(&self, image: &DynamicImage) -> Result<RgbImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScoreError::EmptyImage);
        }
        let side = self.max_side.max(1);
        if image.width() == side && image.height() <= side
            || image.height() == side && image.width() <= side
        {
            return Ok(image.to_rgb8());
        }
        Ok(image.resize(side, side, self.filter).to_rgb8())
    }
}

/// Uses the decoded image as-is
#[derive(Debug, Clone, Default)]
pub struct IdentitySampler;

impl ThumbnailSampler for IdentitySampler {
    fn sample(&self, image: &DynamicImage) -> Result<RgbImage> {
        if image.width() == 0 || image.height() == 0 {
            return Err(ScoreError::EmptyImage);
        }
        Ok(image.to_rgb8())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_fit_inside_keeps_aspect_ratio() {
        let wide = DynamicImage::ImageRgb8(RgbImage::from_pixel(256, 128, Rgb([10, 20, 30])));
        let thumb = FitInsideSampler::default().sample(&wide).unwrap();
        assert_eq!(thumb.dimensions(), (64, 32));
    }

    #[test]
    fn test_fit_inside_enlarges_small_images() {
        let tiny = DynamicImage::ImageRgb8(RgbImage::from_pixel(16, 16, Rgb([200, 0, 0])));
        let thumb = FitInsideSampler::default().sample(&tiny).unwrap();
        assert_eq!(thumb.dimensions(), (64, 64));
    }

    #[test]
    fn test_exact_size_is_untouched() {
        let mut img = RgbImage::from_pixel(64, 64, Rgb([0, 0, 0]));
        img.put_pixel(3, 5, Rgb([255, 255, 255]));
        let thumb = FitInsideSampler::default()
            .sample(&DynamicImage::ImageRgb8(img.clone()))
            .unwrap();
        assert_eq!(thumb, img);
    }

    #[test]
    fn test_empty_image_rejected() {
        let empty = DynamicImage::ImageRgb8(RgbImage::new(0, 0));
        assert!(matches!(
            IdentitySampler.sample(&empty),
            Err(ScoreError::EmptyImage)
        ));
    }
}
