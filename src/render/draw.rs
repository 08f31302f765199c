use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, U1,
};

use crate::curve::NurbsCurve;
use crate::errors::SplineError;
use crate::misc::FloatingPoint;
use crate::render::Renderer;
use crate::surface::NurbsSurface;
use crate::tessellation::Tessellation;

/// A trait for drawing a shape through a renderer
pub trait Draw<T: FloatingPoint, D: DimName, R: Renderer<T, D>>
where
    DefaultAllocator: Allocator<D>,
{
    type Option;

    /// Tessellate the shape and forward the samples to the renderer
    fn draw(&self, renderer: &mut R, option: Self::Option) -> Result<(), SplineError>;
}

impl<T: FloatingPoint, D: DimName, R> Draw<T, DimNameDiff<D, U1>, R> for NurbsCurve<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    R: Renderer<T, DimNameDiff<D, U1>>,
{
    type Option = usize;

    /// Sample the curve at `divs + 1` evenly spaced parameters and draw the
    /// result as a connected polyline. `divs` must be at least 1.
    fn draw(&self, renderer: &mut R, divs: usize) -> Result<(), SplineError> {
        let points = self.tessellate(divs)?;
        #[cfg(feature = "log")]
        log::trace!(
            "drawing degree {} curve as a polyline of {} points",
            self.degree(),
            points.len()
        );
        renderer.polyline(&points);
        Ok(())
    }
}

impl<T: FloatingPoint, D: DimName, R> Draw<T, DimNameDiff<D, U1>, R> for NurbsSurface<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    R: Renderer<T, DimNameDiff<D, U1>>,
{
    type Option = (usize, usize);

    /// Sample a `(divs_u + 1) x (divs_v + 1)` grid of surface points and
    /// draw the result as a mesh. Both counts must be at least 1.
    fn draw(&self, renderer: &mut R, (divs_u, divs_v): (usize, usize)) -> Result<(), SplineError> {
        let grid = self.sample_regular_grid(divs_u, divs_v)?;
        #[cfg(feature = "log")]
        log::trace!(
            "drawing degree ({}, {}) surface as a {}x{} grid",
            self.u_degree(),
            self.v_degree(),
            grid.len(),
            grid[0].len()
        );
        renderer.mesh(&grid);
        Ok(())
    }
}

impl<T: FloatingPoint, D: DimName> NurbsSurface<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Draw with the same number of divisions in both directions
    pub fn draw_regular<R>(&self, renderer: &mut R, divs: usize) -> Result<(), SplineError>
    where
        R: Renderer<T, DimNameDiff<D, U1>>,
    {
        self.draw(renderer, (divs, divs))
    }
}
