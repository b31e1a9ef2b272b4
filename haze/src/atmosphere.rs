use glam::{vec3, Vec3, Vec4};
use rayon::prelude::*;

use crate::{gpu, Error, Result};

/// Describes the planet and its atmosphere.
///
/// All distances are expressed in the same unit (kilometres for
/// [`AtmosphereSettings::earth()`]), and extinction coefficients in the
/// inverse of that unit.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AtmosphereSettings {
    pub earth_centre: Vec3,
    pub earth_radius: f32,
    pub atmosphere_top_radius: f32,
    pub rayleigh_scale_height: f32,
    pub mie_scale_height: f32,
    pub rayleigh_extinction_coeff: Vec3,
    pub mie_extinction_coeff: Vec3,
}

impl AtmosphereSettings {
    /// Earth-like atmosphere, in kilometres, with the world's origin laying
    /// on the ground.
    pub fn earth() -> Self {
        let earth_radius = 6360.0;

        Self {
            earth_centre: vec3(0.0, -earth_radius, 0.0),
            earth_radius,
            atmosphere_top_radius: 6420.0,
            rayleigh_scale_height: 7.994,
            mie_scale_height: 1.2,
            rayleigh_extinction_coeff: vec3(5.8e-3, 1.35e-2, 3.31e-2),
            mie_extinction_coeff: Vec3::splat(2.0e-2 / 0.9),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.earth_radius > 0.0 && self.atmosphere_top_radius > self.earth_radius) {
            return Err(Error::InvalidRadii {
                earth_radius: self.earth_radius,
                atmosphere_top_radius: self.atmosphere_top_radius,
            });
        }

        if !(self.rayleigh_scale_height > 0.0 && self.mie_scale_height > 0.0) {
            return Err(Error::InvalidScaleHeights {
                rayleigh: self.rayleigh_scale_height,
                mie: self.mie_scale_height,
            });
        }

        let coeffs = [self.rayleigh_extinction_coeff, self.mie_extinction_coeff];

        if coeffs.iter().any(|coeff| !coeff.cmpge(Vec3::ZERO).all()) {
            return Err(Error::NegativeExtinctionCoeff);
        }

        Ok(())
    }

    pub fn media_params(&self) -> gpu::MediaParams {
        gpu::MediaParams::new(self.rayleigh_extinction_coeff, self.mie_extinction_coeff)
    }

    pub fn scale_height(&self) -> gpu::ParticleScaleHeight {
        gpu::ParticleScaleHeight::new(self.rayleigh_scale_height, self.mie_scale_height)
    }
}

impl Default for AtmosphereSettings {
    fn default() -> Self {
        Self::earth()
    }
}

/// Evaluates how much light gets attenuated by the atmosphere.
#[derive(Clone, Debug)]
pub struct Atmosphere {
    settings: AtmosphereSettings,
    media: gpu::MediaParams,
    scale_height: gpu::ParticleScaleHeight,
}

impl Atmosphere {
    pub fn new(settings: AtmosphereSettings) -> Result<Self> {
        settings.validate()?;

        log::info!(
            "Initializing atmosphere; earth_radius={}, atmosphere_top_radius={}",
            settings.earth_radius,
            settings.atmosphere_top_radius,
        );

        Ok(Self {
            settings,
            media: settings.media_params(),
            scale_height: settings.scale_height(),
        })
    }

    /// Returns transmittance of the segment `start..end`.
    pub fn extinction(&self, start: Vec3, end: Vec3) -> Vec3 {
        gpu::extinction(
            &self.media,
            start,
            end,
            self.settings.earth_centre,
            self.settings.earth_radius,
            self.settings.atmosphere_top_radius,
            self.scale_height,
        )
    }

    /// Returns transmittance of sunlight arriving at `pos` from `sun_dir`.
    pub fn sun_extinction(&self, pos: Vec3, sun_dir: Vec3) -> Vec3 {
        gpu::sun_extinction(
            &self.media,
            pos,
            sun_dir.normalize(),
            self.settings.earth_centre,
            self.settings.earth_radius,
            self.settings.atmosphere_top_radius,
            self.scale_height,
        )
    }

    pub fn extinction_pass_params(&self, camera_pos: Vec3) -> gpu::ExtinctionPassParams {
        gpu::ExtinctionPassParams::new(
            camera_pos,
            self.settings.earth_centre,
            self.settings.earth_radius,
            self.settings.atmosphere_top_radius,
            self.scale_height,
        )
    }

    /// Returns transmittance between the camera and each of given surfaces,
    /// the way the extinction pass computes it.
    ///
    /// Surfaces whose `w` is not positive are treated as sky and yield
    /// `(1, 1, 1)`.
    pub fn extinction_map(&self, camera_pos: Vec3, surfaces: &[Vec4]) -> Vec<Vec3> {
        let params = self.extinction_pass_params(camera_pos);

        log::debug!("Evaluating extinction map; surfaces={}", surfaces.len());

        surfaces
            .par_iter()
            .map(|&surface| params.eval(&self.media, surface))
            .collect()
    }
}
