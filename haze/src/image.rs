use glam::{uvec3, IVec3, UVec3, Vec4};

use crate::{gpu, Error, Result};

/// Raw shadow-map depth, one layer per cascade.
pub type DepthArray = Image<f32>;

/// Filtered shadow moments; VSM moments occupy `xy` and leave `zw` zeroed.
pub type MomentImage = Image<Vec4>;

/// CPU-side counterpart of a (possibly arrayed) 2D texture.
///
/// Texels are stored layer by layer, row by row.
#[derive(Clone, Debug, PartialEq)]
pub struct Image<T> {
    size: UVec3,
    texels: Vec<T>,
}

impl<T> Image<T>
where
    T: Copy + Default,
{
    /// Creates a new image filled with zeroes.
    pub fn new(size: UVec3) -> Result<Self> {
        Self::from_fn(size, |_| T::default())
    }

    pub fn from_fn(size: UVec3, f: impl Fn(UVec3) -> T) -> Result<Self> {
        Self::validate_size(size)?;

        log::debug!("Allocating image; size={size}");

        let mut texels = Vec::with_capacity(Self::texel_count(size));

        for z in 0..size.z {
            for y in 0..size.y {
                for x in 0..size.x {
                    texels.push(f(uvec3(x, y, z)));
                }
            }
        }

        Ok(Self { size, texels })
    }

    pub fn from_texels(size: UVec3, texels: Vec<T>) -> Result<Self> {
        Self::validate_size(size)?;

        let expected = Self::texel_count(size);

        if texels.len() != expected {
            return Err(Error::TexelCountMismatch {
                width: size.x,
                height: size.y,
                layers: size.z,
                expected,
                actual: texels.len(),
            });
        }

        Ok(Self { size, texels })
    }

    pub fn size(&self) -> UVec3 {
        self.size
    }

    pub fn width(&self) -> u32 {
        self.size.x
    }

    pub fn height(&self) -> u32 {
        self.size.y
    }

    pub fn layers(&self) -> u32 {
        self.size.z
    }

    pub fn texels(&self) -> &[T] {
        &self.texels
    }

    /// Returns texels of given layer.
    pub fn layer(&self, layer: u32) -> &[T] {
        assert!(layer < self.size.z);

        let len = (self.size.x * self.size.y) as usize;
        let offset = len * layer as usize;

        &self.texels[offset..offset + len]
    }

    pub fn get(&self, pos: UVec3) -> T {
        self.texels[self.index(pos)]
    }

    pub fn set(&mut self, pos: UVec3, val: T) {
        let idx = self.index(pos);

        self.texels[idx] = val;
    }

    /// Reads texel at given position, clamping it to the image's edges.
    pub fn load(&self, pos: IVec3) -> T {
        self.get(gpu::clamp_to_edge(pos, self.size).as_uvec3())
    }

    fn index(&self, pos: UVec3) -> usize {
        assert!(
            pos.cmplt(self.size).all(),
            "texel {pos} is out of bounds of image {}",
            self.size
        );

        let idx = pos.x + pos.y * self.size.x + pos.z * self.size.x * self.size.y;

        idx as usize
    }

    fn validate_size(size: UVec3) -> Result<()> {
        if size.cmpeq(UVec3::ZERO).any() {
            return Err(Error::EmptyImage {
                width: size.x,
                height: size.y,
                layers: size.z,
            });
        }

        Ok(())
    }

    fn texel_count(size: UVec3) -> usize {
        size.x as usize * size.y as usize * size.z as usize
    }
}

#[cfg(test)]
mod tests {
    use glam::{ivec3, vec4};

    use super::*;

    #[test]
    fn from_fn() {
        let image =
            DepthArray::from_fn(uvec3(3, 2, 2), |pos| (pos.x + 10 * pos.y + 100 * pos.z) as f32)
                .unwrap();

        assert_eq!(3, image.width());
        assert_eq!(2, image.height());
        assert_eq!(2, image.layers());
        assert_eq!(12, image.texels().len());
        assert_eq!(112.0, image.get(uvec3(2, 1, 1)));
        assert_eq!(&[100.0, 101.0, 102.0, 110.0, 111.0, 112.0], image.layer(1));
    }

    #[test]
    fn set() {
        let mut image = MomentImage::new(uvec3(2, 2, 1)).unwrap();

        image.set(uvec3(1, 0, 0), vec4(1.0, 2.0, 3.0, 4.0));

        assert_eq!(vec4(1.0, 2.0, 3.0, 4.0), image.get(uvec3(1, 0, 0)));
        assert_eq!(Vec4::ZERO, image.get(uvec3(0, 1, 0)));
        assert_eq!(uvec3(2, 2, 1), image.size());
    }

    #[test]
    fn load_clamps_to_edge() {
        let image = DepthArray::from_fn(uvec3(4, 4, 2), |pos| (pos.x + 4 * pos.y) as f32).unwrap();

        assert_eq!(0.0, image.load(ivec3(-3, -1, 0)));
        assert_eq!(3.0, image.load(ivec3(7, 0, 0)));
        assert_eq!(15.0, image.load(ivec3(4, 9, 0)));
        assert_eq!(6.0, image.load(ivec3(2, 1, 5)));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = DepthArray::new(uvec3(4, 0, 1)).unwrap_err();

        assert!(matches!(err, Error::EmptyImage { height: 0, .. }));
    }

    #[test]
    fn texel_count_is_validated() {
        let err = DepthArray::from_texels(uvec3(2, 2, 1), vec![0.0; 3]).unwrap_err();

        assert!(matches!(
            err,
            Error::TexelCountMismatch {
                expected: 4,
                actual: 3,
                ..
            }
        ));
    }

    #[test]
    #[should_panic]
    fn get_out_of_bounds() {
        DepthArray::new(uvec3(2, 2, 1)).unwrap().get(uvec3(2, 0, 0));
    }
}
