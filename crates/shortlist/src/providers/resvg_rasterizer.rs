use resvg::{tiny_skia, usvg};
use tracing::debug;

use crate::{error::RasterizeError, traits::SvgRasterizer};

/// Renders SVG into a square PNG with `resvg`.
///
/// The drawing is scaled to fit and centred on an opaque backdrop, so
/// transparent regions score as background rather than black.
#[derive(Debug, Clone, Copy)]
pub struct ResvgRasterizer {
    background: [u8; 3],
}

impl Default for ResvgRasterizer {
    fn default() -> Self {
        Self {
            background: [255, 255, 255],
        }
    }
}

impl ResvgRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_background(mut self, rgb: [u8; 3]) -> Self {
        self.background = rgb;
        self
    }
}

impl SvgRasterizer for ResvgRasterizer {
    fn rasterize(&self, svg: &[u8], size: u32) -> Result<Vec<u8>, RasterizeError> {
        if size == 0 {
            return Err(RasterizeError::Failed("raster size must be positive".to_string()));
        }
        let tree = usvg::Tree::from_data(svg, &usvg::Options::default())
            .map_err(|e| RasterizeError::Failed(format!("invalid SVG: {e}")))?;

        let view = tree.size();
        if view.width() <= 0.0 || view.height() <= 0.0 {
            return Err(RasterizeError::Failed("SVG has an empty viewport".to_string()));
        }
        let side = size as f32;
        let scale = (side / view.width()).min(side / view.height());
        let offset_x = (side - view.width() * scale) / 2.0;
        let offset_y = (side - view.height() * scale) / 2.0;

        let mut pixmap = tiny_skia::Pixmap::new(size, size)
            .ok_or_else(|| RasterizeError::Failed(format!("cannot allocate {size}x{size} pixmap")))?;
        let [r, g, b] = self.background;
        pixmap.fill(tiny_skia::Color::from_rgba8(r, g, b, 255));
        let transform = tiny_skia::Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        debug!(size, scale, "rasterized SVG");
        pixmap
            .encode_png()
            .map_err(|e| RasterizeError::Failed(format!("PNG encoding failed: {e}")))
    }
}
