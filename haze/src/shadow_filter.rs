use glam::{ivec2, uvec3, vec4};
use rayon::prelude::*;

use crate::{gpu, DepthArray, Error, MomentImage, Result};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ShadowMode {
    /// Variance shadow maps; moments are `(depth, depth^2)`.
    #[default]
    Vsm,

    /// Exponential variance shadow maps; moments are `(pos, pos^2, neg,
    /// neg^2)` of the exponentially-warped depth.
    Evsm,
}

/// Precision of the texture that stores filtered moments; affects how large
/// EVSM exponents can get.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MomentPrecision {
    Half,

    #[default]
    Full,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShadowFilterSettings {
    pub mode: ShadowMode,

    /// Radius of the horizontal box filter, in texels.
    pub horz_filter_radius: f32,

    /// Radius of the vertical box filter, in texels.
    pub vert_filter_radius: f32,

    pub evsm_positive_exponent: f32,
    pub evsm_negative_exponent: f32,
    pub precision: MomentPrecision,
}

impl ShadowFilterSettings {
    pub fn validate(&self) -> Result<()> {
        for radius in [self.horz_filter_radius, self.vert_filter_radius] {
            if !radius.is_finite() || radius < 0.0 {
                return Err(Error::InvalidFilterRadius(radius));
            }
        }

        if self.mode == ShadowMode::Evsm
            && !(self.evsm_positive_exponent > 0.0 && self.evsm_negative_exponent > 0.0)
        {
            return Err(Error::InvalidEvsmExponents {
                positive: self.evsm_positive_exponent,
                negative: self.evsm_negative_exponent,
            });
        }

        Ok(())
    }

    /// Builds parameters of the conversion passes for given cascade.
    pub fn conversion_attribs(&self, cascade: u32) -> Result<gpu::ConversionAttribs> {
        self.validate()?;

        let is_32bit = self.precision == MomentPrecision::Full;

        if self.mode == ShadowMode::Evsm {
            let max = if is_32bit {
                gpu::EVSM_MAX_EXPONENT_32BIT
            } else {
                gpu::EVSM_MAX_EXPONENT_16BIT
            };

            if self.evsm_positive_exponent > max || self.evsm_negative_exponent > max {
                log::warn!(
                    "EVSM exponents exceed what {:?}-precision moments can hold and will be \
                     clamped; positive={}, negative={}, max={max}",
                    self.precision,
                    self.evsm_positive_exponent,
                    self.evsm_negative_exponent,
                );
            }
        }

        Ok(gpu::ConversionAttribs {
            cascade: cascade as i32,
            horz_filter_radius: self.horz_filter_radius,
            vert_filter_radius: self.vert_filter_radius,
            evsm_positive_exponent: self.evsm_positive_exponent,
            evsm_negative_exponent: self.evsm_negative_exponent,
            is_32bit_evsm: is_32bit as u32,
            ..Default::default()
        })
    }
}

impl Default for ShadowFilterSettings {
    fn default() -> Self {
        Self {
            mode: ShadowMode::default(),
            horz_filter_radius: 1.0,
            vert_filter_radius: 1.0,
            evsm_positive_exponent: 40.0,
            evsm_negative_exponent: 5.0,
            precision: MomentPrecision::default(),
        }
    }
}

/// Converts shadow-map cascades into box-filtered VSM / EVSM moments.
#[derive(Clone, Debug)]
pub struct ShadowFilter {
    settings: ShadowFilterSettings,
}

impl ShadowFilter {
    pub fn new(settings: ShadowFilterSettings) -> Result<Self> {
        settings.validate()?;

        log::info!(
            "Initializing shadow filter; mode={:?}, radius={}x{}",
            settings.mode,
            settings.horz_filter_radius,
            settings.vert_filter_radius,
        );

        Ok(Self { settings })
    }

    /// Filters given cascade of the shadow map, returning an image of the
    /// same resolution.
    pub fn filter_cascade(&self, depth: &DepthArray, cascade: u32) -> Result<MomentImage> {
        if cascade >= depth.layers() {
            return Err(Error::CascadeOutOfRange {
                cascade,
                cascades: depth.layers(),
            });
        }

        let attribs = self.settings.conversion_attribs(cascade)?;

        log::debug!(
            "Filtering cascade; cascade={cascade}, size={}x{}",
            depth.width(),
            depth.height(),
        );

        // The vertical pass reads texels written by other rows, so the whole
        // horizontal pass must complete first
        let moments = self.horizontal_pass(&attribs, depth)?;

        self.vertical_pass(&attribs, &moments)
    }

    /// Filters all cascades of the shadow map.
    pub fn filter_all(&self, depth: &DepthArray) -> Result<Vec<MomentImage>> {
        (0..depth.layers())
            .map(|cascade| self.filter_cascade(depth, cascade))
            .collect()
    }

    /// Converts depth into moments, filtering them along rows.
    fn horizontal_pass(
        &self,
        attribs: &gpu::ConversionAttribs,
        depth: &DepthArray,
    ) -> Result<MomentImage> {
        let width = depth.width();
        let mode = self.settings.mode;

        let texels = (0..width * depth.height())
            .into_par_iter()
            .map(|idx| {
                let pos = ivec2((idx % width) as i32, (idx / width) as i32);
                let shadow_map = |pos| depth.load(pos);

                match mode {
                    ShadowMode::Vsm => {
                        let moments = gpu::vsm_horizontal(attribs, pos, shadow_map);

                        vec4(moments.x, moments.y, 0.0, 0.0)
                    }
                    ShadowMode::Evsm => gpu::evsm_horizontal(attribs, pos, shadow_map),
                }
            })
            .collect();

        MomentImage::from_texels(uvec3(width, depth.height(), 1), texels)
    }

    /// Blurs moments along columns.
    fn vertical_pass(
        &self,
        attribs: &gpu::ConversionAttribs,
        moments: &MomentImage,
    ) -> Result<MomentImage> {
        let width = moments.width();

        let texels = (0..width * moments.height())
            .into_par_iter()
            .map(|idx| {
                let pos = ivec2((idx % width) as i32, (idx / width) as i32);

                gpu::vertical_blur(attribs, pos, |pos| moments.load(pos))
            })
            .collect();

        MomentImage::from_texels(moments.size(), texels)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use glam::{ivec3, uvec3, vec2, Vec4};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn filter(settings: ShadowFilterSettings) -> ShadowFilter {
        ShadowFilter::new(settings).unwrap()
    }

    fn random_depth(seed: u64) -> DepthArray {
        let mut rng = StdRng::seed_from_u64(seed);
        let texels = (0..13 * 9 * 2).map(|_| rng.gen_range(0.0..1.0)).collect();

        DepthArray::from_texels(uvec3(13, 9, 2), texels).unwrap()
    }

    /// Filters `depth` with a non-separated 2D box filter, straight from its
    /// definition.
    fn filter_2d(
        depth: &DepthArray,
        cascade: u32,
        horz_radius: f32,
        vert_radius: f32,
        moments: impl Fn(f32) -> Vec4,
    ) -> Vec<Vec4> {
        let horz_range = gpu::filter_range(horz_radius);
        let vert_range = gpu::filter_range(vert_radius);
        let mut out = Vec::new();

        for y in 0..depth.height() as i32 {
            for x in 0..depth.width() as i32 {
                let mut sum = Vec4::ZERO;
                let mut total_weight = 0.0;

                for j in -vert_range..=vert_range {
                    for i in -horz_range..=horz_range {
                        let weight = gpu::sample_weight(i, horz_radius)
                            * gpu::sample_weight(j, vert_radius);

                        let texel = depth.load(ivec3(x + i, y + j, cascade as i32));

                        sum += moments(texel) * weight;
                        total_weight += weight;
                    }
                }

                out.push(sum / total_weight);
            }
        }

        out
    }

    #[test]
    fn settings_are_validated() {
        let err = ShadowFilter::new(ShadowFilterSettings {
            horz_filter_radius: -1.0,
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, Error::InvalidFilterRadius(_)));

        let err = ShadowFilter::new(ShadowFilterSettings {
            vert_filter_radius: f32::NAN,
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, Error::InvalidFilterRadius(_)));

        let err = ShadowFilter::new(ShadowFilterSettings {
            mode: ShadowMode::Evsm,
            evsm_negative_exponent: 0.0,
            ..Default::default()
        })
        .unwrap_err();

        assert!(matches!(err, Error::InvalidEvsmExponents { .. }));
    }

    #[test]
    fn conversion_attribs() {
        let settings = ShadowFilterSettings {
            mode: ShadowMode::Evsm,
            horz_filter_radius: 2.5,
            vert_filter_radius: 1.5,
            evsm_positive_exponent: 40.0,
            evsm_negative_exponent: 5.0,
            precision: MomentPrecision::Half,
        };

        let attribs = settings.conversion_attribs(3).unwrap();

        assert_eq!(3, attribs.cascade);
        assert_eq!(2.5, attribs.horz_filter_radius);
        assert_eq!(1.5, attribs.vert_filter_radius);
        assert!(!attribs.is_32bit_evsm());
        assert_eq!(vec2(5.54, 5.0), attribs.evsm_exponents());
    }

    #[test]
    fn uniform_depth_yields_exact_moments() {
        let depth = DepthArray::from_fn(uvec3(7, 5, 1), |_| 0.5).unwrap();

        for (horz, vert) in [(0.0, 0.0), (1.0, 1.0), (1.3, 2.7), (4.0, 0.5)] {
            let moments = filter(ShadowFilterSettings {
                horz_filter_radius: horz,
                vert_filter_radius: vert,
                ..Default::default()
            })
            .filter_cascade(&depth, 0)
            .unwrap();

            assert_eq!(uvec3(7, 5, 1), moments.size());

            for &texel in moments.texels() {
                assert_eq!(vec4(0.5, 0.25, 0.0, 0.0), texel);
            }
        }
    }

    #[test]
    fn zero_radius_yields_raw_moments() {
        let depth = random_depth(1);

        let moments = filter(ShadowFilterSettings {
            horz_filter_radius: 0.0,
            vert_filter_radius: 0.0,
            ..Default::default()
        })
        .filter_cascade(&depth, 1)
        .unwrap();

        for (moments, &depth) in moments.texels().iter().zip(depth.layer(1)) {
            assert_eq!(depth, moments.x);
            assert_eq!(depth * depth, moments.y);
        }
    }

    #[test]
    fn vsm_matches_2d_box_filter() {
        let depth = random_depth(2);

        for (horz, vert) in [(1.0, 1.0), (1.3, 2.6), (3.5, 0.25)] {
            let moments = filter(ShadowFilterSettings {
                horz_filter_radius: horz,
                vert_filter_radius: vert,
                ..Default::default()
            })
            .filter_cascade(&depth, 1)
            .unwrap();

            let expected = filter_2d(&depth, 1, horz, vert, |d| vec4(d, d * d, 0.0, 0.0));

            for (actual, expected) in moments.texels().iter().zip(&expected) {
                assert_relative_eq!(actual.x, expected.x, epsilon = 1e-5);
                assert_relative_eq!(actual.y, expected.y, epsilon = 1e-5);
                assert_eq!(0.0, actual.z);
                assert_eq!(0.0, actual.w);
            }
        }
    }

    #[test]
    fn evsm_matches_2d_box_filter() {
        let depth = random_depth(3);

        let settings = ShadowFilterSettings {
            mode: ShadowMode::Evsm,
            horz_filter_radius: 1.5,
            vert_filter_radius: 2.0,
            evsm_positive_exponent: 10.0,
            evsm_negative_exponent: 5.0,
            ..Default::default()
        };

        let moments = filter(settings).filter_cascade(&depth, 0).unwrap();

        let expected = filter_2d(&depth, 0, 1.5, 2.0, |d| {
            let warped = gpu::warp_depth_evsm(d, vec2(10.0, 5.0));

            vec4(warped.x, warped.x * warped.x, warped.y, warped.y * warped.y)
        });

        for (actual, expected) in moments.texels().iter().zip(&expected) {
            assert_relative_eq!(actual.x, expected.x, max_relative = 1e-4);
            assert_relative_eq!(actual.y, expected.y, max_relative = 1e-4);
            assert_relative_eq!(actual.z, expected.z, max_relative = 1e-4);
            assert_relative_eq!(actual.w, expected.w, max_relative = 1e-4);
        }
    }

    #[test]
    fn moments_are_consistent() {
        let depth = random_depth(4);

        let moments = filter(ShadowFilterSettings {
            horz_filter_radius: 2.0,
            vert_filter_radius: 2.0,
            ..Default::default()
        })
        .filter_cascade(&depth, 0)
        .unwrap();

        // Average of squares can't be smaller than square of the average
        for texel in moments.texels() {
            assert!(texel.y >= texel.x * texel.x - 1e-6);
        }
    }

    #[test]
    fn cascades_are_filtered_separately() {
        let depth = DepthArray::from_fn(uvec3(4, 4, 3), |pos| 0.2 * (pos.z + 1) as f32).unwrap();
        let moments = filter(ShadowFilterSettings::default())
            .filter_all(&depth)
            .unwrap();

        assert_eq!(3, moments.len());

        for (cascade, moments) in moments.iter().enumerate() {
            let depth = 0.2 * (cascade + 1) as f32;

            assert_relative_eq!(moments.get(uvec3(2, 1, 0)).x, depth, epsilon = 1e-6);
        }
    }

    #[test]
    fn cascade_out_of_range() {
        let depth = DepthArray::new(uvec3(4, 4, 2)).unwrap();
        let err = filter(ShadowFilterSettings::default())
            .filter_cascade(&depth, 2)
            .unwrap_err();

        assert!(matches!(
            err,
            Error::CascadeOutOfRange {
                cascade: 2,
                cascades: 2
            }
        ));
    }
}
