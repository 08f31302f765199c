pub mod surface_tessellation;
pub mod tessellation_curve;
pub mod tessellation_surface;

pub use surface_tessellation::*;

/// A trait for tessellating a shape into drawable primitives
pub trait Tessellation<Opt> {
    type Output;
    fn tessellate(&self, options: Opt) -> Self::Output;
}
