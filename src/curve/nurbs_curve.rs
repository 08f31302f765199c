use nalgebra::allocator::Allocator;
use nalgebra::{
    Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, OVector, U1,
};

use crate::curve::CurveDescriptor;
use crate::errors::SplineError;
use crate::knot::KnotVector;
use crate::misc::{Binomial, FloatingPoint};

/// NURBS curve representation
/// By generics, it can be used for 2D or 3D curves with f32 or f64 scalar types
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, OPoint<T, D>: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, OPoint<T, D>: serde::Deserialize<'de>"
    ))
)]
pub struct NurbsCurve<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control points with homogeneous coordinates
    /// the last element of each point is the rational `weight`
    control_points: Vec<OPoint<T, D>>,
    degree: usize,
    /// knot vector of length `# of control points + degree + 1`
    knots: KnotVector<T>,
}

/// 2D NURBS curve alias
pub type NurbsCurve2D<T> = NurbsCurve<T, Const<3>>;

/// 3D NURBS curve alias
pub type NurbsCurve3D<T> = NurbsCurve<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsCurve<T, D>
where
    DefaultAllocator: Allocator<D>,
{
    /// Create a new NURBS curve from homogeneous control points.
    /// # Failures
    /// - the degree is zero
    /// - the number of control points does not exceed the degree
    /// - any control point has a zero weight (last coordinate)
    /// - the number of knots is not `# of control points + degree + 1`
    /// - the knot vector decreases somewhere
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let w = 1.; // weight for each control point
    /// let control_points: Vec<Point3<f64>> = vec![
    ///     Point3::new(50., 50., w),
    ///     Point3::new(30., 370., w),
    ///     Point3::new(180., 350., w),
    ///     Point3::new(150., 100., w),
    ///     Point3::new(250., 50., w),
    ///     Point3::new(350., 100., w),
    ///     Point3::new(470., 400., w),
    /// ];
    /// let degree = 3;
    /// let m = control_points.len() + degree + 1;
    /// let knots = (0..m).map(|i| i as f64).collect();
    /// let nurbs = NurbsCurve2D::try_new(degree, control_points, knots);
    /// assert!(nurbs.is_ok());
    /// ```
    pub fn try_new(
        degree: usize,
        control_points: Vec<OPoint<T, D>>,
        knots: Vec<T>,
    ) -> Result<Self, SplineError> {
        if degree < 1 {
            return Err(SplineError::InvalidDegree);
        }
        if control_points.len() <= degree {
            return Err(SplineError::TooFewControlPoints {
                degree,
                count: control_points.len(),
            });
        }
        if control_points.iter().any(|p| p[D::dim() - 1] == T::zero()) {
            return Err(SplineError::ZeroWeight);
        }
        let expected = control_points.len() + degree + 1;
        if knots.len() != expected {
            return Err(SplineError::KnotSizeMismatch {
                expected,
                got: knots.len(),
                count: control_points.len(),
                degree,
            });
        }
        let knots = KnotVector::try_new(knots)?;

        Ok(Self {
            degree,
            control_points,
            knots,
        })
    }

    /// Create a NURBS curve from a descriptor of Euclidean control points
    /// with optional weights, knots and degree.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let points = vec![
    ///     Point3::new(0., 0., 0.),
    ///     Point3::new(1., 2., 0.),
    ///     Point3::new(2., -2., 0.),
    ///     Point3::new(3., 0., 0.),
    /// ];
    /// let curve = NurbsCurve3D::try_from_descriptor(CurveDescriptor::new(points)).unwrap();
    /// assert_eq!(curve.degree(), 3);
    /// assert_eq!(curve.weights(), vec![1.; 4]);
    /// ```
    pub fn try_from_descriptor(
        descriptor: CurveDescriptor<T, DimNameDiff<D, U1>>,
    ) -> Result<Self, SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let points = descriptor.control_points;
        let count = points.len();
        let degree = descriptor.degree.unwrap_or(count.saturating_sub(1));

        let weights = match descriptor.weights {
            Some(weights) => {
                if weights.len() != count {
                    return Err(SplineError::WeightCountMismatch {
                        expected: count,
                        got: weights.len(),
                    });
                }
                weights
            }
            None => vec![T::one(); count],
        };

        let knots = match descriptor.knots {
            Some(knots) => knots,
            None => KnotVector::uniform(count, degree).to_vec(),
        };

        let control_points = points
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| homogenize(p, *w))
            .collect();

        Self::try_new(degree, control_points, knots)
    }

    /// Evaluate the curve at a given parameter to get a dehomogenized point.
    /// Parameters outside the knot domain are clamped to the nearest
    /// domain endpoint, so sampling at the boundary never fails.
    pub fn point_at(&self, t: T) -> OPoint<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let p = self.point(t);
        dehomogenize(&p).unwrap()
    }

    /// Evaluate the curve at a given parameter in homogeneous space
    pub(crate) fn point(&self, t: T) -> OPoint<T, D> {
        let t = self.knots.clamp(self.degree, t);
        let n = self.knots.len() - self.degree - 2;
        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, t);
        let basis = self.knots.basis_functions(knot_span_index, t, self.degree);
        let mut position = OPoint::<T, D>::origin();
        for i in 0..=self.degree {
            position.coords +=
                &self.control_points[knot_span_index - self.degree + i].coords * basis[i];
        }
        position
    }

    /// Evaluate the curve at a given parameter to get a tangent vector,
    /// unnormalized.
    pub fn tangent_at(&self, t: T) -> OVector<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let deriv = self.rational_derivatives(t, 1);
        deriv[1].clone()
    }

    /// Evaluate the derivative of the given order at `t`.
    /// Order 0 is the position, order 1 the unnormalized tangent.
    pub fn derivative_at(&self, t: T, order: usize) -> OVector<T, DimNameDiff<D, U1>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let deriv = self.rational_derivatives(t, order);
        deriv[order].clone()
    }

    /// Evaluate the rational derivatives up to the given order at `t`
    pub fn rational_derivatives(
        &self,
        t: T,
        derivs: usize,
    ) -> Vec<OVector<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        let ders = self.derivatives(t, derivs);
        let a_ders: Vec<_> = ders
            .iter()
            .map(|d| {
                let mut a_ders = vec![];
                for i in 0..D::dim() - 1 {
                    a_ders.push(d[i]);
                }
                OVector::<T, DimNameDiff<D, U1>>::from_vec(a_ders)
            })
            .collect();
        let w_ders: Vec<_> = ders.iter().map(|d| d[D::dim() - 1]).collect();

        let mut ck = vec![];
        let mut binom = Binomial::<T>::new();
        for k in 0..=derivs {
            let mut v = a_ders[k].clone();

            for i in 1..=k {
                let coef = binom.get(k, i) * w_ders[i];
                v -= &ck[k - i] * coef;
            }

            let dehom = v / w_ders[0];
            ck.push(dehom);
        }
        ck
    }

    /// Evaluate the homogeneous derivatives at a given parameter
    fn derivatives(&self, t: T, derivs: usize) -> Vec<OVector<T, D>> {
        let t = self.knots.clamp(self.degree, t);
        let n = self.knots.len() - self.degree - 2;

        let du = if derivs < self.degree {
            derivs
        } else {
            self.degree
        };
        let mut derivatives = vec![OVector::<T, D>::zeros(); derivs + 1];

        let knot_span_index = self.knots.find_knot_span_index(n, self.degree, t);
        let nders = self
            .knots
            .derivative_basis_functions(knot_span_index, t, self.degree, du);
        for k in 0..=du {
            for j in 0..=self.degree {
                let w = &self.control_points[knot_span_index - self.degree + j] * nders[k][j];
                let column = derivatives.get_mut(k).unwrap();
                w.coords.iter().enumerate().for_each(|(i, v)| {
                    column[i] += *v;
                });
            }
        }

        derivatives
    }

    /// Sample the curve at `divs + 1` evenly spaced parameters across the
    /// knot domain. `divs` must be at least 1.
    pub fn sample_regular(
        &self,
        divs: usize,
    ) -> Result<Vec<OPoint<T, DimNameDiff<D, U1>>>, SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        if divs < 1 {
            return Err(SplineError::InvalidDivisionCount(divs));
        }
        let (start, end) = self.knots_domain();
        let step = (end - start) / T::from_usize(divs).unwrap();
        Ok((0..=divs)
            .map(|i| self.point_at(start + step * T::from_usize(i).unwrap()))
            .collect())
    }

    /// Get the Euclidean control point at `index`
    pub fn control_point_at(
        &self,
        index: usize,
    ) -> Result<OPoint<T, DimNameDiff<D, U1>>, SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.check_index(index)?;
        Ok(dehomogenize(&self.control_points[index]).unwrap())
    }

    /// Get the weight of the control point at `index`
    pub fn weight_at(&self, index: usize) -> Result<T, SplineError> {
        self.check_index(index)?;
        Ok(self.control_points[index][D::dim() - 1])
    }

    /// Replace the control point at `index`, preserving its weight
    pub fn set_point(
        &mut self,
        index: usize,
        point: &OPoint<T, DimNameDiff<D, U1>>,
    ) -> Result<(), SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.check_index(index)?;
        let weight = self.control_points[index][D::dim() - 1];
        self.control_points[index] = homogenize(point, weight);
        Ok(())
    }

    /// Replace all control points, preserving the per-point weights.
    /// The replacement must have the same length as the current points.
    pub fn set_points(
        &mut self,
        points: &[OPoint<T, DimNameDiff<D, U1>>],
    ) -> Result<(), SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        if points.len() != self.control_points.len() {
            return Err(SplineError::PointCountMismatch {
                expected: self.control_points.len(),
                got: points.len(),
            });
        }
        let weights = self.weights();
        self.control_points = points
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| homogenize(p, *w))
            .collect();
        Ok(())
    }

    /// Replace the weight of the control point at `index`.
    /// The weight must be non-zero.
    pub fn set_weight(&mut self, index: usize, weight: T) -> Result<(), SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.check_index(index)?;
        if weight == T::zero() {
            return Err(SplineError::ZeroWeight);
        }
        let point = dehomogenize(&self.control_points[index]).unwrap();
        self.control_points[index] = homogenize(&point, weight);
        Ok(())
    }

    /// Replace all weights.
    /// The replacement must have the same length as the current points,
    /// and every weight must be non-zero.
    pub fn set_weights(&mut self, weights: &[T]) -> Result<(), SplineError>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        if weights.len() != self.control_points.len() {
            return Err(SplineError::WeightCountMismatch {
                expected: self.control_points.len(),
                got: weights.len(),
            });
        }
        if weights.iter().any(|w| *w == T::zero()) {
            return Err(SplineError::ZeroWeight);
        }
        let reweighted = self
            .control_points
            .iter()
            .zip(weights.iter())
            .map(|(p, w)| homogenize(&dehomogenize(p).unwrap(), *w))
            .collect();
        self.control_points = reweighted;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), SplineError> {
        if index >= self.control_points.len() {
            return Err(SplineError::IndexOutOfBounds {
                index,
                len: self.control_points.len(),
            });
        }
        Ok(())
    }

    pub fn degree(&self) -> usize {
        self.degree
    }

    pub fn knots(&self) -> &KnotVector<T> {
        &self.knots
    }

    pub fn knots_domain(&self) -> (T, T) {
        self.knots.domain(self.degree)
    }

    /// The homogeneous control points
    pub fn control_points(&self) -> &Vec<OPoint<T, D>> {
        &self.control_points
    }

    /// Return the dehomogenized control points
    pub fn dehomogenized_control_points(&self) -> Vec<OPoint<T, DimNameDiff<D, U1>>>
    where
        D: DimNameSub<U1>,
        DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
    {
        self.control_points
            .iter()
            .map(|p| dehomogenize(p).unwrap())
            .collect()
    }

    pub fn weights(&self) -> Vec<T> {
        self.control_points
            .iter()
            .map(|p| p[D::dim() - 1])
            .collect()
    }
}

/// Convert a Euclidean point and a weight into a homogeneous point,
/// scaling the coordinates by the weight
pub fn homogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, DimNameDiff<D, U1>>,
    weight: T,
) -> OPoint<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameDiff<D, U1>>,
{
    let mut homogeneous = OPoint::<T, D>::origin();
    for i in 0..D::dim() - 1 {
        homogeneous[i] = point[i] * weight;
    }
    homogeneous[D::dim() - 1] = weight;
    homogeneous
}

/// Dehomogenize a point, returning `None` if its weight is zero
pub fn dehomogenize<T: FloatingPoint, D: DimName>(
    point: &OPoint<T, D>,
) -> Option<OPoint<T, DimNameDiff<D, U1>>>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D> + Allocator<DimNameDiff<D, U1>>,
{
    let v = &point.coords;
    let idx = D::dim() - 1;
    let w = v[idx];
    if w != T::zero() {
        let coords =
            v.generic_view((0, 0), (<D as DimNameSub<U1>>::Output::name(), Const::<1>)) / w;
        Some(OPoint { coords })
    } else {
        None
    }
}
