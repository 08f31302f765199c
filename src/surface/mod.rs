pub mod nurbs_surface;
pub mod surface_descriptor;
pub use nurbs_surface::*;
pub use surface_descriptor::*;

#[cfg(test)]
mod tests;
