#![allow(clippy::needless_range_loop)]

mod curve;
mod errors;
mod knot;
mod misc;
mod render;
mod surface;
mod tessellation;

pub mod prelude {
    pub use crate::curve::*;
    pub use crate::errors::*;
    pub use crate::knot::*;
    pub use crate::misc::*;
    pub use crate::render::*;
    pub use crate::surface::*;
    pub use crate::tessellation::*;
}
