pub mod binomial;
pub mod floating_point;

pub use binomial::*;
pub use floating_point::*;
