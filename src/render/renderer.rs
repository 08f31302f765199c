use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OPoint};

use crate::misc::FloatingPoint;

/// The drawing capability a host graphics runtime exposes to this library.
///
/// The core hands over plain geometry and nothing else; color, transforms
/// and camera state stay on the host side.
pub trait Renderer<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// Draw an ordered run of points as a connected polyline
    fn polyline(&mut self, points: &[OPoint<T, D>]);

    /// Draw a row-major grid of points as a quad or triangle mesh;
    /// the renderer decides the final triangulation
    fn mesh(&mut self, grid: &[Vec<OPoint<T, D>>]);
}
