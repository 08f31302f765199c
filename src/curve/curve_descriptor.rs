use nalgebra::{allocator::Allocator, DefaultAllocator, DimName, OPoint};

use crate::misc::FloatingPoint;

/// Construction arguments for a NURBS curve, with every field beyond the
/// control points optional. Collapses the usual constructor overloads
/// (points only, points + weights, explicit knots, explicit degree) into a
/// single entry point.
///
/// The points are Euclidean; weights are folded into homogeneous
/// coordinates during construction.
#[derive(Clone, Debug)]
pub struct CurveDescriptor<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// Euclidean control points (required)
    pub control_points: Vec<OPoint<T, D>>,
    /// Rational weights, one per control point (default: all 1)
    pub weights: Option<Vec<T>>,
    /// Explicit knot vector (default: clamped uniform)
    pub knots: Option<Vec<T>>,
    /// Curve degree (default: number of control points - 1)
    pub degree: Option<usize>,
}

impl<T: FloatingPoint, D: DimName> CurveDescriptor<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    pub fn new(control_points: Vec<OPoint<T, D>>) -> Self {
        Self {
            control_points,
            weights: None,
            knots: None,
            degree: None,
        }
    }

    pub fn with_weights(mut self, weights: Vec<T>) -> Self {
        self.weights = Some(weights);
        self
    }

    pub fn with_knots(mut self, knots: Vec<T>) -> Self {
        self.knots = Some(knots);
        self
    }

    pub fn with_degree(mut self, degree: usize) -> Self {
        self.degree = Some(degree);
        self
    }
}
