//! Host-side implementation of Haze's passes: evaluates atmospheric
//! extinction and converts shadow maps into filtered moments on the CPU,
//! using the very same kernels the shaders run.

mod atmosphere;
mod error;
mod image;
mod shadow_filter;

pub use haze_gpu as gpu;

pub use self::atmosphere::*;
pub use self::error::*;
pub use self::image::*;
pub use self::shadow_filter::*;
