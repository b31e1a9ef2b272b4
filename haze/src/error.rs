use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("filter radius must be finite and non-negative, got {0}")]
    InvalidFilterRadius(f32),

    #[error("EVSM exponents must be positive, got {positive} and {negative}")]
    InvalidEvsmExponents { positive: f32, negative: f32 },

    #[error("cascade {cascade} is out of range, shadow map has {cascades}")]
    CascadeOutOfRange { cascade: u32, cascades: u32 },

    #[error("image dimensions must be non-zero, got {width}x{height}x{layers}")]
    EmptyImage { width: u32, height: u32, layers: u32 },

    #[error("image of size {width}x{height}x{layers} needs {expected} texels, got {actual}")]
    TexelCountMismatch {
        width: u32,
        height: u32,
        layers: u32,
        expected: usize,
        actual: usize,
    },

    #[error(
        "atmosphere's top radius ({atmosphere_top_radius}) must be larger than \
         earth's radius ({earth_radius}), which must be positive"
    )]
    InvalidRadii {
        earth_radius: f32,
        atmosphere_top_radius: f32,
    },

    #[error("scale heights must be positive, got {rayleigh} and {mie}")]
    InvalidScaleHeights { rayleigh: f32, mie: f32 },

    #[error("extinction coefficients must be non-negative")]
    NegativeExtinctionCoeff,
}
