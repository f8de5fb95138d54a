pub mod thumbnail;
pub mod statistics;
pub mod edges;

pub use thumbnail::*;
pub use statistics::*;
pub use edges::*;

/// Clamp to the unit interval
pub(crate) fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}
