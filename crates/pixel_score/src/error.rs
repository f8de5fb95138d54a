use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScoreError {
    #[error("Failed to decode image: {0}")]
    ImageLoad(#[from] image::ImageError),

    #[error("Image has no pixels")]
    EmptyImage,

    #[error("Unsupported channel count: {0} (expected 3 or 4)")]
    UnsupportedChannels(usize),

    #[error("Pixel buffer of {len} bytes does not match {width}x{height}x{channels}")]
    BufferMismatch {
        len: usize,
        width: u32,
        height: u32,
        channels: usize,
    },
}

pub type Result<T> = std::result::Result<T, ScoreError>;
