use bytemuck::{Pod, Zeroable};
use glam::{Vec3, Vec4, Vec4Swizzles};

use crate::{extinction, MediaParams, ParticleScaleHeight};

#[repr(C)]
#[derive(Copy, Clone, Default, Pod, Zeroable)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct ExtinctionPassParams {
    /// Camera's position; `w` is the earth's radius.
    pub camera_pos: Vec4,

    /// Earth's centre; `w` is the atmosphere's top radius.
    pub earth_centre: Vec4,

    /// See: [`ParticleScaleHeight`].
    pub scale_height: Vec4,
}

impl ExtinctionPassParams {
    pub fn new(
        camera_pos: Vec3,
        earth_centre: Vec3,
        earth_radius: f32,
        atmosphere_top_radius: f32,
        scale_height: ParticleScaleHeight,
    ) -> Self {
        Self {
            camera_pos: camera_pos.extend(earth_radius),
            earth_centre: earth_centre.extend(atmosphere_top_radius),
            scale_height: scale_height.to_vec4(),
        }
    }

    pub fn camera_pos(&self) -> Vec3 {
        self.camera_pos.xyz()
    }

    pub fn earth_centre(&self) -> Vec3 {
        self.earth_centre.xyz()
    }

    pub fn earth_radius(&self) -> f32 {
        self.camera_pos.w
    }

    pub fn atmosphere_top_radius(&self) -> f32 {
        self.earth_centre.w
    }

    pub fn scale_height(&self) -> ParticleScaleHeight {
        ParticleScaleHeight::from_vec4(self.scale_height)
    }

    /// Returns transmittance between the camera and given surface.
    ///
    /// `surface.w` tells whether there's any surface at all (`> 0.0`); when
    /// there's none, light is not attenuated.
    pub fn eval(&self, media: &MediaParams, surface: Vec4) -> Vec3 {
        if surface.w <= 0.0 {
            return Vec3::ONE;
        }

        extinction(
            media,
            self.camera_pos(),
            surface.xyz(),
            self.earth_centre(),
            self.earth_radius(),
            self.atmosphere_top_radius(),
            self.scale_height(),
        )
    }
}
