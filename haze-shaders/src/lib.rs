#![cfg_attr(target_arch = "spirv", no_std)]

pub mod extinction;
pub mod shadow_conversion;
