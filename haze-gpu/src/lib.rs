//! Kernels and parameter blocks shared by Haze's shaders and its host-side
//! implementation: analytic atmospheric extinction and box-filtered shadow
//! moments.

#![cfg_attr(target_arch = "spirv", no_std)]
#![allow(clippy::too_many_arguments)]
#![allow(clippy::manual_range_contains)]

mod atmosphere;
mod box_filter;
mod moments;
mod passes;
mod ray;
mod utils;

pub use self::atmosphere::*;
pub use self::box_filter::*;
pub use self::moments::*;
pub use self::passes::*;
pub use self::ray::*;
pub use self::utils::*;

pub mod prelude {
    pub use core::f32::consts::PI;

    pub use spirv_std::glam::*;
    #[cfg(target_arch = "spirv")]
    pub use spirv_std::num_traits::Float;
    pub use spirv_std::{spirv, Image};

    pub use crate::*;
}

/// Safe EVSM exponent when moments are stored in 32-bit floats.
///
/// `exp(42)^2` stays below `f32::MAX`.
pub const EVSM_MAX_EXPONENT_32BIT: f32 = 42.0;

/// Safe EVSM exponent when moments are stored in 16-bit floats.
///
/// `exp(5.54)^2` stays below the largest finite half-float (65504).
pub const EVSM_MAX_EXPONENT_16BIT: f32 = 5.54;
