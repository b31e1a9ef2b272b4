//! Computes how much light gets attenuated between the camera and each
//! visible surface.

use haze_gpu::prelude::*;

#[spirv(compute(threads(8, 8)))]
pub fn main(
    #[spirv(global_invocation_id)] global_id: UVec3,
    #[spirv(push_constant)] params: &ExtinctionPassParams,
    #[spirv(descriptor_set = 0, binding = 0, uniform)] media: &MediaParams,
    #[spirv(descriptor_set = 0, binding = 1)] surfaces: TexRgba32,
    #[spirv(descriptor_set = 0, binding = 2)] out: TexRgba32,
) {
    let screen_pos = global_id.xy();
    let surface: Vec4 = surfaces.read(screen_pos);
    let out_val = params.eval(media, surface);

    unsafe {
        out.write(screen_pos, out_val.extend(1.0));
    }
}
