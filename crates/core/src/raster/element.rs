//! Raster element trait for generic cell values

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Trait for types that can be stored in a raster cell.
///
/// Covers the sample types a TIFF band can carry plus the class-id and
/// floating point types produced by the analysis stages. Every element must
/// convert to `f32` without precision-critical loss, since spectral math is
/// done in single precision.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// Whether this type is a floating point type
    fn is_float() -> bool;

    /// Whether this value is a valid sample (NaN is not)
    fn is_valid(&self) -> bool;

    /// Convert self to f32, falling back to NaN when not representable
    fn to_f32_lossy(self) -> f32 {
        num_traits::cast(self).unwrap_or(f32::NAN)
    }

    /// Convert self to f64
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_raster_element_int {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_float() -> bool {
                    false
                }

                fn is_valid(&self) -> bool {
                    true
                }
            }
        )*
    };
}

macro_rules! impl_raster_element_float {
    ($($t:ty),*) => {
        $(
            impl RasterElement for $t {
                fn is_float() -> bool {
                    true
                }

                fn is_valid(&self) -> bool {
                    !self.is_nan()
                }
            }
        )*
    };
}

impl_raster_element_int!(i8, i16, i32, i64, u8, u16, u32, u64);
impl_raster_element_float!(f32, f64);
