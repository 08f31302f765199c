use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OPoint};

use crate::misc::FloatingPoint;

/// Construction arguments for a NURBS surface, with every field beyond the
/// control point grid optional. The grid is row-major with the outer index
/// running along the u direction.
#[derive(Clone, Debug)]
pub struct SurfaceDescriptor<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// Euclidean control point grid (required)
    pub control_points: Vec<Vec<OPoint<T, D>>>,
    /// Rational weights, congruent with the point grid (default: all 1)
    pub weights: Option<Vec<Vec<T>>>,
    /// Explicit u-direction knot vector (default: clamped uniform)
    pub u_knots: Option<Vec<T>>,
    /// Explicit v-direction knot vector (default: clamped uniform)
    pub v_knots: Option<Vec<T>>,
    /// Degree along u (default: number of rows - 1)
    pub u_degree: Option<usize>,
    /// Degree along v (default: number of columns - 1)
    pub v_degree: Option<usize>,
}

impl<T: FloatingPoint, D: DimName> SurfaceDescriptor<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub fn new(control_points: Vec<Vec<OPoint<T, D>>>) -> Self {
        Self {
            control_points,
            weights: None,
            u_knots: None,
            v_knots: None,
            u_degree: None,
            v_degree: None,
        }
    }

    pub fn with_weights(mut self, weights: Vec<Vec<T>>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_u_knots(mut self, knots: Vec<T>) -> Self {
        self.u_knots = Some(knots);
        self
    }

    pub fn with_v_knots(mut self, knots: Vec<T>) -> Self {
        self.v_knots = Some(knots);
        self
    }

    pub fn with_degrees(mut self, u_degree: usize, v_degree: usize) -> Self {
        self.u_degree = Some(u_degree);
        self.v_degree = Some(v_degree);
        self
    }
}
