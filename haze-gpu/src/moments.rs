//! Conversion of raw shadow-map depth into filtered VSM / EVSM moments.
//!
//! Conversion happens in two passes: the horizontal pass reads a row of the
//! depth array (of the chosen cascade) and writes the moments into an
//! intermediate image, the vertical pass blurs that image along columns.

use bytemuck::{Pod, Zeroable};
use glam::{ivec3, vec2, vec4, IVec2, IVec3, Vec2, Vec4};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::{
    box_filter, F32Ext, EVSM_MAX_EXPONENT_16BIT, EVSM_MAX_EXPONENT_32BIT,
};

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ConversionAttribs {
    pub cascade: i32,

    /// Radius of the horizontal filter, in texels; can be fractional.
    pub horz_filter_radius: f32,

    /// Radius of the vertical filter, in texels; can be fractional.
    pub vert_filter_radius: f32,

    pub evsm_positive_exponent: f32,
    pub evsm_negative_exponent: f32,

    /// Whether moments are stored in 32-bit floats (as opposed to 16-bit
    /// ones); `0` or `1`.
    pub is_32bit_evsm: u32,

    pub _pad: [u32; 2],
}

impl ConversionAttribs {
    pub fn is_32bit_evsm(&self) -> bool {
        self.is_32bit_evsm != 0
    }

    pub fn evsm_exponents(&self) -> Vec2 {
        evsm_exponents(
            self.evsm_positive_exponent,
            self.evsm_negative_exponent,
            self.is_32bit_evsm(),
        )
    }
}

/// Returns EVSM exponents clamped to what the moments' storage can hold
/// without overflowing.
pub fn evsm_exponents(positive: f32, negative: f32, is_32bit: bool) -> Vec2 {
    let max = if is_32bit {
        EVSM_MAX_EXPONENT_32BIT
    } else {
        EVSM_MAX_EXPONENT_16BIT
    };

    vec2(positive, negative).min(Vec2::splat(max))
}

/// Warps depth into the positive and negative exponential EVSM terms.
pub fn warp_depth_evsm(depth: f32, exponents: Vec2) -> Vec2 {
    vec2((exponents.x * depth).exp(), -(-exponents.y * depth).exp())
}

/// Returns `(depth, depth^2)`, averaged over the horizontal filter.
pub fn vsm_horizontal(
    attribs: &ConversionAttribs,
    pos: IVec2,
    shadow_map: impl Fn(IVec3) -> f32,
) -> Vec2 {
    box_filter(attribs.horz_filter_radius, |i| {
        let depth = shadow_map(ivec3(pos.x + i, pos.y, attribs.cascade));

        vec2(depth, depth.sqr())
    })
}

/// Returns `(pos, pos^2, neg, neg^2)` of the warped depth, averaged over the
/// horizontal filter.
pub fn evsm_horizontal(
    attribs: &ConversionAttribs,
    pos: IVec2,
    shadow_map: impl Fn(IVec3) -> f32,
) -> Vec4 {
    let exponents = attribs.evsm_exponents();

    box_filter(attribs.horz_filter_radius, |i| {
        let depth = shadow_map(ivec3(pos.x + i, pos.y, attribs.cascade));
        let warped = warp_depth_evsm(depth, exponents);

        vec4(warped.x, warped.x.sqr(), warped.y, warped.y.sqr())
    })
}

/// Returns moments averaged over the vertical filter.
///
/// Works on moments of both kinds, since it's just a blur - unused channels
/// stay zeroed.
pub fn vertical_blur(
    attribs: &ConversionAttribs,
    pos: IVec2,
    moments: impl Fn(IVec3) -> Vec4,
) -> Vec4 {
    box_filter(attribs.vert_filter_radius, |i| {
        moments(ivec3(pos.x, pos.y + i, 0))
    })
}
