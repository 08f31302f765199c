use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, U1,
};

use crate::curve::NurbsCurve;
use crate::errors::SplineError;
use crate::misc::FloatingPoint;

use super::Tessellation;

impl<T: FloatingPoint, D: DimName> Tessellation<usize> for NurbsCurve<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Output = Result<Vec<OPoint<T, DimNameDiff<D, U1>>>, SplineError>;

    /// Tessellate the curve into a polyline of `divs + 1` points at evenly
    /// spaced parameters across the knot domain
    fn tessellate(&self, divs: usize) -> Self::Output {
        self.sample_regular(divs)
    }
}
