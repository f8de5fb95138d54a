use logo_kit_common::LogoType;

const ANY: &[&str] = &[
    "bold geometric mark, strong silhouette",
    "monoline minimal icon, thin strokes",
    "rounded friendly shapes, soft corners",
    "sharp angular forms, tech-forward",
    "luxury premium feel, elegant spacing",
    "playful modern icon, simple shapes",
    "abstract emblem, balanced symmetry",
    "clean wordmark emphasis, minimal icon",
    "negative space concept, clever cutouts",
    "flat vector, ultra-minimal",
];

const SYMBOL: &[&str] = &[
    "bold geometric mark, strong silhouette",
    "negative space concept, clever cutouts",
    "abstract emblem, balanced symmetry",
    "rounded friendly shapes, soft corners",
    "sharp angular forms, tech-forward",
    "flat vector, ultra-minimal",
];

const WORDMARK: &[&str] = &[
    "clean wordmark emphasis, minimal icon",
    "custom letterforms, generous tracking",
    "geometric sans-serif, even stroke weight",
    "luxury premium feel, elegant spacing",
    "monoline lettering, thin strokes",
];

const MONOGRAM: &[&str] = &[
    "interlocking initials, tight lockup",
    "monoline minimal icon, thin strokes",
    "bold geometric mark, strong silhouette",
    "negative space concept, clever cutouts",
];

const EMBLEM: &[&str] = &[
    "contained badge shape, balanced symmetry",
    "abstract emblem, balanced symmetry",
    "luxury premium feel, elegant spacing",
    "flat vector, ultra-minimal",
];

/// Style variants cycled through for a logo type
pub fn style_pool(logo_type: LogoType) -> &'static [&'static str] {
    match logo_type {
        LogoType::Symbol => SYMBOL,
        LogoType::Wordmark => WORDMARK,
        LogoType::Monogram => MONOGRAM,
        LogoType::Emblem => EMBLEM,
        LogoType::Any => ANY,
    }
}

/// Deterministic style rotation keyed by the attempt's issue index
#[derive(Debug, Clone, Copy)]
pub struct StyleRotation {
    pool: &'static [&'static str],
}

impl StyleRotation {
    pub fn for_logo_type(logo_type: LogoType) -> Self {
        Self {
            pool: style_pool(logo_type),
        }
    }

    pub fn variant(&self, index: usize) -> &'static str {
        self.pool[index % self.pool.len()]
    }

    /// `<base>, style: <variant>`
    pub fn prompt(&self, base: &str, index: usize) -> String {
        format!("{}, style: {}", base.trim_end(), self.variant(index))
    }

    pub fn len(&self) -> usize {
        self.pool.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}
