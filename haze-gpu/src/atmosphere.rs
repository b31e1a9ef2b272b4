//! Atmospheric extinction along a view ray, evaluated analytically.
//!
//! Optical depth is approximated with a closed-form Chapman-function
//! formula, see:
//!
//! - http://www-evasion.inrialpes.fr/Membres/Eric.Bruneton/
//!   (Precomputed Atmospheric Scattering by Eric Bruneton)

use core::f32::consts::PI;

use bytemuck::{Pod, Zeroable};
use glam::{vec2, vec4, Vec2, Vec3, Vec4, Vec4Swizzles};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

use crate::Ray;

/// Per-frame description of the participating medium.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct MediaParams {
    /// Rayleigh extinction cross-section per wavelength (rgb); `w` is unused.
    pub rayleigh_extinction_coeff: Vec4,

    /// Mie extinction cross-section per wavelength (rgb); `w` is unused.
    pub mie_extinction_coeff: Vec4,
}

impl MediaParams {
    pub fn new(rayleigh_extinction_coeff: Vec3, mie_extinction_coeff: Vec3) -> Self {
        Self {
            rayleigh_extinction_coeff: rayleigh_extinction_coeff.extend(0.0),
            mie_extinction_coeff: mie_extinction_coeff.extend(0.0),
        }
    }

    pub fn rayleigh(&self) -> Vec3 {
        self.rayleigh_extinction_coeff.xyz()
    }

    pub fn mie(&self) -> Vec3 {
        self.mie_extinction_coeff.xyz()
    }
}

/// Exponential falloff of particle density with altitude, for both species.
#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ParticleScaleHeight {
    pub rayleigh: f32,
    pub mie: f32,
    pub inv_rayleigh: f32,
    pub inv_mie: f32,
}

impl ParticleScaleHeight {
    pub fn new(rayleigh: f32, mie: f32) -> Self {
        Self {
            rayleigh,
            mie,
            inv_rayleigh: 1.0 / rayleigh,
            inv_mie: 1.0 / mie,
        }
    }

    pub fn scale(&self) -> Vec2 {
        vec2(self.rayleigh, self.mie)
    }

    pub fn inv_scale(&self) -> Vec2 {
        vec2(self.inv_rayleigh, self.inv_mie)
    }

    pub fn to_vec4(self) -> Vec4 {
        vec4(self.rayleigh, self.mie, self.inv_rayleigh, self.inv_mie)
    }

    pub fn from_vec4(val: Vec4) -> Self {
        Self {
            rayleigh: val.x,
            mie: val.y,
            inv_rayleigh: val.z,
            inv_mie: val.w,
        }
    }
}

/// Returns optical depth of the ray `(r, mu)` of length `d`, for Rayleigh
/// (`x`) and Mie (`y`) particles.
///
/// - `r` is the distance from planet's centre to the ray's origin,
/// - `mu` is the cosine of the view-zenith angle at the ray's origin.
///
/// Intersections with the ground are ignored.
pub fn density_integral_analytic(
    r: f32,
    mu: f32,
    d: f32,
    earth_radius: f32,
    scale_height: ParticleScaleHeight,
) -> Vec2 {
    let inv_scale = scale_height.inv_scale();

    let a = vec2(
        (0.5 * inv_scale.x * r).sqrt(),
        (0.5 * inv_scale.y * r).sqrt(),
    );

    // (rayleigh at start, rayleigh at end, mie at start, mie at end); the end
    // cosine is approximated with `mu + d / r`
    let a01 = vec4(a.x, a.x, a.y, a.y) * vec4(mu, mu + d / r, mu, mu + d / r);
    let a01s = a01.signum();
    let a01sq = a01 * a01;

    let x = vec2(
        if a01s.y > a01s.x { a01sq.x.exp() } else { 0.0 },
        if a01s.w > a01s.z { a01sq.z.exp() } else { 0.0 },
    );

    let decay = (-d * inv_scale * (d / (2.0 * r) + mu)).exp();

    let erfc = vec4(
        2.3193 * a01.x.abs() + (1.52 * a01sq.x + 4.0).sqrt(),
        2.3193 * a01.y.abs() + (1.52 * a01sq.y + 4.0).sqrt(),
        2.3193 * a01.z.abs() + (1.52 * a01sq.z + 4.0).sqrt(),
        2.3193 * a01.w.abs() + (1.52 * a01sq.w + 4.0).sqrt(),
    );

    let y = a01s / erfc * vec4(1.0, decay.x, 1.0, decay.y);

    let norm = 2.0 * PI * r * scale_height.scale();
    let norm = vec2(norm.x.sqrt(), norm.y.sqrt());

    let depth = norm
        * ((earth_radius - r) * inv_scale).exp()
        * (x + vec2(y.x - y.y, y.z - y.w));

    vec2(saturate_depth(depth.x), saturate_depth(depth.y))
}

/// Keeps optical depth finite and non-negative.
///
/// Near-zero segments can dip below zero due to cancellation, while rays
/// going deep below the horizon overflow into infinity (or `inf - inf`);
/// the latter are treated as opaque.
fn saturate_depth(depth: f32) -> f32 {
    if depth.is_nan() || depth > f32::MAX {
        f32::MAX
    } else {
        depth.max(0.0)
    }
}

/// Returns optical depth of the segment `start..end`, integrated numerically
/// with the midpoint rule.
///
/// This is way slower than [`density_integral_analytic()`] and serves as a
/// reference for it.
pub fn density_integral_numeric(
    start: Vec3,
    end: Vec3,
    earth_centre: Vec3,
    earth_radius: f32,
    scale_height: ParticleScaleHeight,
    steps: u32,
) -> Vec2 {
    let step = (end - start) / (steps as f32);
    let step_len = step.length();

    let mut depth = Vec2::ZERO;
    let mut i = 0;

    while i < steps {
        let pos = start + step * (i as f32 + 0.5);
        let height = (pos - earth_centre).length() - earth_radius;

        depth += particle_density(height, scale_height) * step_len;
        i += 1;
    }

    depth
}

/// Returns transmittance of the segment `start..end`.
///
/// Both points must lay inside the atmosphere and `eye_dir` must be the
/// normalized `end - start` direction; see [`extinction()`] for the checked
/// variant.
pub fn extinction_unverified(
    media: &MediaParams,
    start: Vec3,
    end: Vec3,
    eye_dir: Vec3,
    earth_centre: Vec3,
    earth_radius: f32,
    scale_height: ParticleScaleHeight,
) -> Vec3 {
    let r = (start - earth_centre).length();
    let cos_zenith_angle = (start - earth_centre).dot(eye_dir) / r;

    let density = density_integral_analytic(
        r,
        cos_zenith_angle,
        (start - end).length(),
        earth_radius,
        scale_height,
    );

    let rayleigh_depth = media.rayleigh() * density.x;
    let mie_depth = media.mie() * density.y;

    (-(rayleigh_depth + mie_depth)).exp()
}

/// Returns transmittance of the segment `start..end`, after clipping it to
/// the atmosphere's shell.
///
/// Segments that miss the atmosphere, lay behind it or have zero length
/// yield `(1, 1, 1)`.
pub fn extinction(
    media: &MediaParams,
    start: Vec3,
    end: Vec3,
    earth_centre: Vec3,
    earth_radius: f32,
    atmosphere_top_radius: f32,
    scale_height: ParticleScaleHeight,
) -> Vec3 {
    let ray_length = (end - start).length();

    if ray_length <= 0.0 {
        return Vec3::ONE;
    }

    let ray = Ray::new(start, (end - start) / ray_length);
    let hits = ray.intersect_sphere(earth_centre, atmosphere_top_radius);

    // Atmosphere is behind us, missed or further away than the segment goes
    if hits.y < 0.0 || hits.x >= ray_length {
        return Vec3::ONE;
    }

    extinction_unverified(
        media,
        ray.at(hits.x.max(0.0)),
        ray.at(hits.y.min(ray_length)),
        ray.direction(),
        earth_centre,
        earth_radius,
        scale_height,
    )
}

/// Returns transmittance of sunlight arriving at `pos` from `sun_dir`.
pub fn sun_extinction(
    media: &MediaParams,
    pos: Vec3,
    sun_dir: Vec3,
    earth_centre: Vec3,
    earth_radius: f32,
    atmosphere_top_radius: f32,
    scale_height: ParticleScaleHeight,
) -> Vec3 {
    let ray = Ray::new(pos, sun_dir);
    let hits = ray.intersect_sphere(earth_centre, atmosphere_top_radius);

    if hits.y <= 0.0 {
        return Vec3::ONE;
    }

    extinction(
        media,
        pos,
        ray.at(hits.y),
        earth_centre,
        earth_radius,
        atmosphere_top_radius,
        scale_height,
    )
}

/// Returns relative particle density at given altitude, for both species.
pub fn particle_density(altitude: f32, scale_height: ParticleScaleHeight) -> Vec2 {
    (-altitude * scale_height.inv_scale()).exp()
}
