use glam::{vec2, Vec2, Vec3};
#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

#[derive(Copy, Clone, Default)]
#[cfg_attr(not(target_arch = "spirv"), derive(Debug))]
pub struct Ray {
    origin: Vec3,
    direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// Returns point laying `distance` units along this ray.
    pub fn at(&self, distance: f32) -> Vec3 {
        self.origin + self.direction * distance
    }

    /// Returns signed distances to the near and far intersections of this
    /// ray with given sphere.
    ///
    /// Negative distances mean the intersection lays behind the origin; if
    /// the ray misses the sphere entirely, both distances are `-1.0`.
    pub fn intersect_sphere(&self, centre: Vec3, radius: f32) -> Vec2 {
        let origin = self.origin - centre;
        let a = self.direction.dot(self.direction);
        let b = 2.0 * origin.dot(self.direction);
        let c = origin.dot(origin) - radius * radius;
        let discr = b * b - 4.0 * a * c;

        if discr < 0.0 {
            return Vec2::splat(-1.0);
        }

        let discr = discr.sqrt();

        vec2(-b - discr, -b + discr) / (2.0 * a)
    }
}
