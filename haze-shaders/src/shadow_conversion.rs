//! Converts a cascade of the shadow map into filtered VSM / EVSM moments.
//!
//! Rendered as two full-screen passes: one of the horizontal passes (reading
//! the depth array) and then the vertical pass (reading layer `0` of the
//! intermediate moments written by the horizontal pass).

use haze_gpu::prelude::*;

#[spirv(vertex)]
pub fn vs(
    #[spirv(vertex_index)] vert_idx: i32,
    #[spirv(position)] output: &mut Vec4,
) {
    fn full_screen_triangle(vert_idx: i32) -> Vec4 {
        let uv = vec2(((vert_idx << 1) & 2) as f32, (vert_idx & 2) as f32);
        let pos = 2.0 * uv - Vec2::ONE;

        pos.extend(0.0).extend(1.0)
    }

    *output = full_screen_triangle(vert_idx);
}

#[spirv(fragment)]
pub fn vsm_horz_fs(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    attribs: &ConversionAttribs,
    #[spirv(descriptor_set = 0, binding = 1)] shadow_map: TexArray,
    frag_color: &mut Vec4,
) {
    let moments = vsm_horizontal(attribs, pos.xy().as_ivec2(), |pos| {
        fetch(shadow_map, pos).x
    });

    *frag_color = vec4(moments.x, moments.y, 0.0, 0.0);
}

#[spirv(fragment)]
pub fn evsm_horz_fs(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    attribs: &ConversionAttribs,
    #[spirv(descriptor_set = 0, binding = 1)] shadow_map: TexArray,
    frag_color: &mut Vec4,
) {
    *frag_color = evsm_horizontal(attribs, pos.xy().as_ivec2(), |pos| {
        fetch(shadow_map, pos).x
    });
}

#[spirv(fragment)]
pub fn vert_blur_fs(
    #[spirv(frag_coord)] pos: Vec4,
    #[spirv(descriptor_set = 0, binding = 0, uniform)]
    attribs: &ConversionAttribs,
    #[spirv(descriptor_set = 0, binding = 1)] moments: TexArray,
    frag_color: &mut Vec4,
) {
    *frag_color = vertical_blur(attribs, pos.xy().as_ivec2(), |pos| {
        fetch(moments, pos)
    });
}

fn fetch(tex: TexArray, pos: IVec3) -> Vec4 {
    let size: UVec3 = tex.query_size_lod(0);

    tex.fetch(clamp_to_edge(pos, size))
}
