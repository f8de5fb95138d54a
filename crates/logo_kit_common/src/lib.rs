//! # Logo Kit Common - Shared Types and Utilities
//!
//! The vocabulary shared by the scoring and shortlisting crates: the creative
//! brief a run is driven by, the logo-type hint, image content types and the
//! references that point at persisted artifacts.
//!
//! ## Example
//!
//! ```rust
//! use logo_kit_common::{ContentType, CreativeBrief, ImagePayload, LogoType};
//!
//! let brief = CreativeBrief::new("Northwind", "flat vector logo for \"Northwind\"")
//!     .with_industry("logistics")
//!     .with_keywords(["compass", "arrow"]);
//! assert_eq!(brief.brand_name, "Northwind");
//!
//! let payload = ImagePayload::from_url("data:image/png;base64,iVBORw0KGgo=").unwrap();
//! assert_eq!(payload.content_type(), Some(ContentType::Png));
//! assert_eq!("wordmark".parse::<LogoType>().unwrap(), LogoType::Wordmark);
//! ```

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoStaticStr, VariantNames};
use thiserror::Error;

/// Result type for logo kit operations
pub type Result<T> = std::result::Result<T, CommonError>;

/// Standard error type for shared logo kit operations
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Invalid data URL: {reason}")]
    InvalidDataUrl { reason: String },

    #[error("Unsupported format: {format}")]
    UnsupportedFormat { format: String },

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },

    #[error("Base64 decode error: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Logo family hint; selects the style-variant pool used for prompt rotation
#[derive(
    Debug, Clone, Copy, Default,
    Serialize, Deserialize, JsonSchema,
    Display, EnumString, EnumIter, VariantNames, IntoStaticStr,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum LogoType {
    /// Icon plus brand name
    Symbol,
    /// Typography-only mark
    Wordmark,
    /// Initials / lettermark
    Monogram,
    /// Contained badge shape
    Emblem,
    /// No preference
    #[default]
    Any,
}

/// The creative brief a pipeline run is driven by.
///
/// `prompt` is opaque to the pipeline: it is built by the caller and only ever
/// extended with a style variant suffix.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreativeBrief {
    pub brand_name: String,
    /// Base generation prompt
    pub prompt: String,
    #[serde(default)]
    pub tagline: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub color_theme: Vec<String>,
    #[serde(default)]
    pub notes: Option<String>,
    /// Reference image for image-to-image generation
    #[serde(default)]
    pub reference_image: Option<String>,
}

impl CreativeBrief {
    pub fn new(brand_name: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            brand_name: brand_name.into(),
            prompt: prompt.into(),
            tagline: None,
            industry: None,
            keywords: Vec::new(),
            color_theme: Vec::new(),
            notes: None,
            reference_image: None,
        }
    }

    pub fn with_tagline(mut self, tagline: impl Into<String>) -> Self {
        self.tagline = Some(tagline.into());
        self
    }

    pub fn with_industry(mut self, industry: impl Into<String>) -> Self {
        self.industry = Some(industry.into());
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_color_theme<I, S>(mut self, colors: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.color_theme = colors.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_reference_image(mut self, reference: impl Into<String>) -> Self {
        self.reference_image = Some(reference.into());
        self
    }
}

/// Image content types the kit understands
#[derive(
    Debug, Clone, Copy,
    Serialize, Deserialize, JsonSchema,
    Display, EnumIter, IntoStaticStr,
    PartialEq, Eq, Hash,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ContentType {
    Png,
    Jpeg,
    Webp,
    Svg,
}

impl ContentType {
    /// Parse a MIME type such as `image/png`. Parameters after `;` are ignored.
    pub fn from_mime(mime: &str) -> Option<Self> {
        let essence = mime.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Some(Self::Png),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/webp" => Some(Self::Webp),
            "image/svg+xml" => Some(Self::Svg),
            _ => None,
        }
    }

    /// Like [`ContentType::from_mime`] but falls back to PNG for unknown types
    pub fn from_mime_or_png(mime: &str) -> Self {
        Self::from_mime(mime).unwrap_or(Self::Png)
    }

    /// Guess from a file extension (case-insensitive)
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "webp" => Some(Self::Webp),
            "svg" => Some(Self::Svg),
            _ => None,
        }
    }

    pub fn mime(&self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Webp => "image/webp",
            Self::Svg => "image/svg+xml",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Webp => "webp",
            Self::Svg => "svg",
        }
    }

    /// Vector payloads must be rasterized before pixel scoring
    pub fn is_vector(&self) -> bool {
        matches!(self, Self::Svg)
    }
}

/// Durable reference to a persisted artifact.
///
/// `storage_key` is `None` when persistence failed and the reference falls
/// back to the generator's original (possibly ephemeral) URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ImageRef {
    pub public_url: String,
    pub storage_key: Option<String>,
}

impl ImageRef {
    pub fn stored(public_url: impl Into<String>, storage_key: impl Into<String>) -> Self {
        Self {
            public_url: public_url.into(),
            storage_key: Some(storage_key.into()),
        }
    }

    pub fn ephemeral(url: impl Into<String>) -> Self {
        Self {
            public_url: url.into(),
            storage_key: None,
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.storage_key.is_some()
    }
}

/// Image as handed back by a generator: raw bytes or a URL to fetch
#[derive(Debug, Clone, PartialEq)]
pub enum ImagePayload {
    Bytes { data: Vec<u8>, content_type: ContentType },
    Url(String),
}

impl ImagePayload {
    pub fn bytes(data: Vec<u8>, content_type: ContentType) -> Self {
        Self::Bytes { data, content_type }
    }

    /// Build a payload from a URL; `data:` URLs are decoded eagerly
    pub fn from_url(url: &str) -> Result<Self> {
        if utils::is_data_url(url) {
            let (content_type, data) = utils::decode_data_url(url)?;
            Ok(Self::Bytes { data, content_type })
        } else {
            Ok(Self::Url(url.to_string()))
        }
    }

    pub fn content_type(&self) -> Option<ContentType> {
        match self {
            Self::Bytes { content_type, .. } => Some(*content_type),
            Self::Url(_) => None,
        }
    }
}

/// Utility functions for image references
pub mod utils {
    use super::*;

    const DATA_PREFIX: &str = "data:";
    const BASE64_MARKER: &str = ";base64,";

    /// Check whether the value is a base64 `data:image/...` URL
    pub fn is_data_url(value: &str) -> bool {
        value.starts_with("data:image/") && value.contains(BASE64_MARKER)
    }

    /// Decode a `data:image/<type>;base64,<payload>` URL
    pub fn decode_data_url(url: &str) -> Result<(ContentType, Vec<u8>)> {
        let rest = url.strip_prefix(DATA_PREFIX).ok_or_else(|| CommonError::InvalidDataUrl {
            reason: "missing data: prefix".to_string(),
        })?;
        let (mime, payload) = rest.split_once(BASE64_MARKER).ok_or_else(|| {
            CommonError::InvalidDataUrl {
                reason: "missing ;base64, marker".to_string(),
            }
        })?;
        let content_type = ContentType::from_mime(mime).ok_or_else(|| {
            CommonError::UnsupportedFormat {
                format: mime.to_string(),
            }
        })?;
        if payload.is_empty() {
            return Err(CommonError::InvalidDataUrl {
                reason: "empty payload".to_string(),
            });
        }
        Ok((content_type, BASE64.decode(payload.trim())?))
    }

    /// Encode bytes as a `data:` URL
    pub fn encode_data_url(content_type: ContentType, data: &[u8]) -> String {
        format!("data:{}{}{}", content_type.mime(), BASE64_MARKER, BASE64.encode(data))
    }

    /// Get the lowercase file extension of a path-like string
    pub fn get_file_extension(filename: &str) -> Option<String> {
        std::path::Path::new(filename)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }

    /// Check if a file name looks like an image the kit can handle
    pub fn is_image_file(filename: &str) -> bool {
        get_file_extension(filename)
            .and_then(|ext| ContentType::from_extension(&ext))
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logo_type_parsing() {
        assert_eq!("symbol".parse::<LogoType>().unwrap(), LogoType::Symbol);
        assert_eq!("Emblem".parse::<LogoType>().unwrap(), LogoType::Emblem);
        assert!("mascot".parse::<LogoType>().is_err());
        assert_eq!(LogoType::default(), LogoType::Any);
        assert_eq!(LogoType::Monogram.to_string(), "monogram");
    }

    #[test]
    fn test_content_type_mapping() {
        assert_eq!(ContentType::from_mime("image/jpg"), Some(ContentType::Jpeg));
        assert_eq!(ContentType::from_mime("IMAGE/PNG; charset=binary"), Some(ContentType::Png));
        assert_eq!(ContentType::from_mime("text/html"), None);
        assert_eq!(ContentType::from_mime_or_png("application/octet-stream"), ContentType::Png);
        assert_eq!(ContentType::Jpeg.extension(), "jpg");
        assert_eq!(ContentType::Svg.mime(), "image/svg+xml");
        assert!(ContentType::Svg.is_vector());
        assert!(!ContentType::Webp.is_vector());
    }

    #[test]
    fn test_data_url_roundtrip() {
        let bytes = vec![0x89, b'P', b'N', b'G', 1, 2, 3];
        let url = utils::encode_data_url(ContentType::Png, &bytes);
        assert!(utils::is_data_url(&url));

        let (content_type, decoded) = utils::decode_data_url(&url).unwrap();
        assert_eq!(content_type, ContentType::Png);
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn test_invalid_data_urls() {
        assert!(utils::decode_data_url("https://example.com/a.png").is_err());
        assert!(utils::decode_data_url("data:image/png,abc").is_err());
        assert!(utils::decode_data_url("data:image/png;base64,").is_err());
        assert!(matches!(
            utils::decode_data_url("data:image/tiff;base64,AAAA"),
            Err(CommonError::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            utils::decode_data_url("data:image/png;base64,@@@"),
            Err(CommonError::Base64(_))
        ));
    }

    #[test]
    fn test_payload_from_url() {
        let remote = ImagePayload::from_url("https://cdn.example.com/logo.png").unwrap();
        assert_eq!(remote, ImagePayload::Url("https://cdn.example.com/logo.png".to_string()));
        assert_eq!(remote.content_type(), None);

        let inline = ImagePayload::from_url("data:image/svg+xml;base64,PHN2Zy8+").unwrap();
        assert_eq!(inline.content_type(), Some(ContentType::Svg));
    }

    #[test]
    fn test_brief_deserializes_with_defaults() {
        let brief: CreativeBrief = serde_json::from_str(
            r#"{ "brandName": "Acme", "prompt": "minimal logo", "colorTheme": ["navy"] }"#,
        )
        .unwrap();
        assert_eq!(brief.brand_name, "Acme");
        assert_eq!(brief.color_theme, vec!["navy".to_string()]);
        assert!(brief.keywords.is_empty());
        assert!(brief.reference_image.is_none());
    }

    #[test]
    fn test_image_ref_constructors() {
        let stored = ImageRef::stored("https://cdn/x.png", "logos/x.png");
        assert!(stored.is_persisted());
        assert!(!ImageRef::ephemeral("https://gen/tmp.png").is_persisted());
    }

    #[test]
    fn test_file_utilities() {
        assert!(utils::is_image_file("mark.SVG"));
        assert!(!utils::is_image_file("notes.txt"));
        assert_eq!(utils::get_file_extension("a/b/logo.Png"), Some("png".to_string()));
    }
}
