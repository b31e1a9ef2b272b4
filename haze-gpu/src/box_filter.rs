use core::ops;

#[cfg(target_arch = "spirv")]
use spirv_std::num_traits::Float;

/// Returns how much of texel `x` is covered by a box filter of given radius,
/// centered at texel `0`.
///
/// The filter spans `[0.5 - radius, 0.5 + radius)`, but never less than the
/// whole center texel, so fractional radii get partial coverage at the
/// outermost texels.
pub fn sample_weight(x: i32, radius: f32) -> f32 {
    let x = x as f32;
    let texel_min = x.max((0.5 - radius).min(0.0));
    let texel_max = (x + 1.0).min((0.5 + radius).max(1.0));

    texel_max - texel_min
}

/// Returns how many texels at each side of the center texel a box filter of
/// given radius touches.
pub fn filter_range(radius: f32) -> i32 {
    (radius + 0.5).floor() as i32
}

/// Convolves the samples returned by `sample(offset)` with a box filter of
/// given radius and returns their weighted average.
///
/// Returns zero if the filter has no weight at all, which can happen only for
/// negative radii.
pub fn box_filter<T>(radius: f32, sample: impl Fn(i32) -> T) -> T
where
    T: ops::Add<Output = T>,
    T: ops::Mul<f32, Output = T>,
    T: ops::Div<f32, Output = T>,
    T: Default + Copy,
{
    let range = filter_range(radius);
    let mut sum = T::default();
    let mut total_weight = 0.0;
    let mut i = -range;

    while i <= range {
        let weight = sample_weight(i, radius);

        sum = sum + sample(i) * weight;
        total_weight += weight;
        i += 1;
    }

    if total_weight > 0.0 {
        sum / total_weight
    } else {
        Default::default()
    }
}
