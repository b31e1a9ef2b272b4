mod f32_ext;

use glam::{IVec3, UVec3};
use spirv_std::Image;

pub use self::f32_ext::*;

pub type TexArray<'a> = &'a Image!(2D, type = f32, sampled, arrayed);
pub type TexRgba32<'a> = &'a Image!(2D, format = rgba32f, sampled = false);

/// Clamps texel coordinates into an image of given size, so that reading
/// past the image's edge returns the nearest edge texel.
pub fn clamp_to_edge(pos: IVec3, size: UVec3) -> IVec3 {
    pos.max(IVec3::ZERO).min(size.as_ivec3() - IVec3::ONE)
}

#[cfg(test)]
mod tests {
    use glam::{ivec3, uvec3};

    use super::*;

    #[test]
    fn clamp_to_edge_of_image() {
        let size = uvec3(4, 3, 2);

        assert_eq!(ivec3(0, 0, 0), clamp_to_edge(ivec3(-2, -1, 0), size));
        assert_eq!(ivec3(2, 1, 1), clamp_to_edge(ivec3(2, 1, 1), size));
        assert_eq!(ivec3(3, 2, 1), clamp_to_edge(ivec3(9, 7, 5), size));
    }
}
