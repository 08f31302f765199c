pub mod draw;
pub mod renderer;

pub use draw::*;
pub use renderer::*;
