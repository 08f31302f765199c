pub mod curve_descriptor;
pub mod nurbs_curve;
pub use curve_descriptor::*;
pub use nurbs_curve::*;
