use nalgebra::allocator::Allocator;
use nalgebra::{
    Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint, OVector, U1,
};

use crate::curve::nurbs_curve::{dehomogenize, homogenize};
use crate::errors::SplineError;
use crate::knot::KnotVector;
use crate::misc::{Binomial, FloatingPoint};
use crate::surface::SurfaceDescriptor;

/// NURBS surface representation over two parameters (u and v)
/// By generics, it can be used for 2D or 3D surfaces with f32 or f64 scalar types
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, OPoint<T, D>: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, OPoint<T, D>: serde::Deserialize<'de>"
    ))
)]
pub struct NurbsSurface<T: FloatingPoint, D: DimName>
where
    DefaultAllocator: Allocator<D>,
{
    /// control point grid with homogeneous coordinates,
    /// the outer index runs along the u direction
    control_points: Vec<Vec<OPoint<T, D>>>,
    u_degree: usize,
    v_degree: usize,
    u_knots: KnotVector<T>,
    v_knots: KnotVector<T>,
}

/// 2D NURBS surface alias
pub type NurbsSurface2D<T> = NurbsSurface<T, Const<3>>;
/// 3D NURBS surface alias
pub type NurbsSurface3D<T> = NurbsSurface<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> NurbsSurface<T, D>
where
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    /// Create a new NURBS surface from a homogeneous control point grid.
    /// Each knot vector is validated independently against its grid
    /// dimension, the same way a curve validates its single knot vector.
    pub fn try_new(
        u_degree: usize,
        v_degree: usize,
        u_knots: Vec<T>,
        v_knots: Vec<T>,
        control_points: Vec<Vec<OPoint<T, D>>>,
    ) -> Result<Self, SplineError> {
        if u_degree < 1 || v_degree < 1 {
            return Err(SplineError::InvalidDegree);
        }

        let rows = control_points.len();
        let cols = control_points.first().map(|r| r.len()).unwrap_or(0);
        if control_points.iter().any(|row| row.len() != cols) {
            return Err(SplineError::RaggedGrid);
        }
        if rows <= u_degree {
            return Err(SplineError::TooFewControlPoints {
                degree: u_degree,
                count: rows,
            });
        }
        if cols <= v_degree {
            return Err(SplineError::TooFewControlPoints {
                degree: v_degree,
                count: cols,
            });
        }
        if control_points
            .iter()
            .flatten()
            .any(|p| p[D::dim() - 1] == T::zero())
        {
            return Err(SplineError::ZeroWeight);
        }

        let expected_u = rows + u_degree + 1;
        if u_knots.len() != expected_u {
            return Err(SplineError::KnotSizeMismatch {
                expected: expected_u,
                got: u_knots.len(),
                count: rows,
                degree: u_degree,
            });
        }
        let expected_v = cols + v_degree + 1;
        if v_knots.len() != expected_v {
            return Err(SplineError::KnotSizeMismatch {
                expected: expected_v,
                got: v_knots.len(),
                count: cols,
                degree: v_degree,
            });
        }

        Ok(Self {
            control_points,
            u_degree,
            v_degree,
            u_knots: KnotVector::try_new(u_knots)?,
            v_knots: KnotVector::try_new(v_knots)?,
        })
    }

    /// Create a NURBS surface from a descriptor of a Euclidean control point
    /// grid with optional weights, knots and degrees.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// use nalgebra::Point3;
    ///
    /// let grid: Vec<Vec<Point3<f64>>> = (0..3)
    ///     .map(|i| (0..3).map(|j| Point3::new(i as f64, j as f64, 0.)).collect())
    ///     .collect();
    /// let surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap();
    /// assert_eq!(surface.u_degree(), 2);
    /// assert_eq!(surface.v_degree(), 2);
    /// ```
    pub fn try_from_descriptor(
        descriptor: SurfaceDescriptor<T, DimNameDiff<D, U1>>,
    ) -> Result<Self, SplineError> {
        let points = descriptor.control_points;
        let rows = points.len();
        let cols = points.first().map(|r| r.len()).unwrap_or(0);
        if points.iter().any(|row| row.len() != cols) {
            return Err(SplineError::RaggedGrid);
        }

        let weights = match descriptor.weights {
            Some(weights) => {
                if weights.len() != rows {
                    return Err(SplineError::WeightCountMismatch {
                        expected: rows,
                        got: weights.len(),
                    });
                }
                if let Some(row) = weights.iter().find(|row| row.len() != cols) {
                    return Err(SplineError::WeightCountMismatch {
                        expected: cols,
                        got: row.len(),
                    });
                }
                weights
            }
            None => vec![vec![T::one(); cols]; rows],
        };

        let u_degree = descriptor.u_degree.unwrap_or(rows.saturating_sub(1));
        let v_degree = descriptor.v_degree.unwrap_or(cols.saturating_sub(1));

        let u_knots = match descriptor.u_knots {
            Some(knots) => knots,
            None => KnotVector::uniform(rows, u_degree).to_vec(),
        };
        let v_knots = match descriptor.v_knots {
            Some(knots) => knots,
            None => KnotVector::uniform(cols, v_degree).to_vec(),
        };

        let control_points = points
            .iter()
            .zip(weights.iter())
            .map(|(point_row, weight_row)| {
                point_row
                    .iter()
                    .zip(weight_row.iter())
                    .map(|(p, w)| homogenize(p, *w))
                    .collect()
            })
            .collect();

        Self::try_new(u_degree, v_degree, u_knots, v_knots, control_points)
    }

    /// Get the u domain of the knot vector by degree
    pub fn u_knots_domain(&self) -> (T, T) {
        self.u_knots.domain(self.u_degree)
    }

    /// Get the v domain of the knot vector by degree
    pub fn v_knots_domain(&self) -> (T, T) {
        self.v_knots.domain(self.v_degree)
    }

    /// Evaluate the surface at the given u, v parameters to get a
    /// dehomogenized point. Parameters outside the knot domains are clamped
    /// to the nearest domain endpoint.
    pub fn point_at(&self, u: T, v: T) -> OPoint<T, DimNameDiff<D, U1>> {
        let p = self.point(u, v);
        dehomogenize(&p).unwrap()
    }

    /// Evaluate the surface at the given u, v parameters in homogeneous space
    pub(crate) fn point(&self, u: T, v: T) -> OPoint<T, D> {
        let u = self.u_knots.clamp(self.u_degree, u);
        let v = self.v_knots.clamp(self.v_degree, v);

        let n = self.u_knots.len() - self.u_degree - 2;
        let m = self.v_knots.len() - self.v_degree - 2;

        let knot_span_index_u = self.u_knots.find_knot_span_index(n, self.u_degree, u);
        let knot_span_index_v = self.v_knots.find_knot_span_index(m, self.v_degree, v);
        let u_basis_vals = self
            .u_knots
            .basis_functions(knot_span_index_u, u, self.u_degree);
        let v_basis_vals = self
            .v_knots
            .basis_functions(knot_span_index_v, v, self.v_degree);

        self.point_given_bases_knot_spans(
            knot_span_index_u,
            knot_span_index_v,
            &u_basis_vals,
            &v_basis_vals,
        )
    }

    /// Compute a point on the surface given pre-computed basis functions
    /// and knot spans
    fn point_given_bases_knot_spans(
        &self,
        knot_span_u: usize,
        knot_span_v: usize,
        bases_u: &[T],
        bases_v: &[T],
    ) -> OPoint<T, D> {
        let mut position = OPoint::<T, D>::origin();

        let uind = knot_span_u - self.u_degree;
        let mut vind = knot_span_v - self.v_degree;

        for l in 0..(self.v_degree + 1) {
            // sample an u isoline, then blend the isolines along v
            let mut temp = OPoint::<T, D>::origin();
            for k in 0..(self.u_degree + 1) {
                temp.coords += &self.control_points[uind + k][vind].coords * bases_u[k];
            }
            vind += 1;

            position.coords += temp.coords * bases_v[l];
        }

        position
    }

    /// Compute a regularly spaced grid of `(divs_u + 1) x (divs_v + 1)`
    /// points on the surface, row-major along u. Pre-computes all basis
    /// functions instead of evaluating the samples one by one.
    #[allow(clippy::type_complexity)]
    pub fn sample_regular_grid(
        &self,
        divs_u: usize,
        divs_v: usize,
    ) -> Result<Vec<Vec<OPoint<T, DimNameDiff<D, U1>>>>, SplineError> {
        if divs_u < 1 {
            return Err(SplineError::InvalidDivisionCount(divs_u));
        }
        if divs_v < 1 {
            return Err(SplineError::InvalidDivisionCount(divs_v));
        }

        let (knot_spans_u, bases_u) = self.u_knots.sampled_basis_functions(self.u_degree, divs_u);
        let (knot_spans_v, bases_v) = self.v_knots.sampled_basis_functions(self.v_degree, divs_v);

        let mut pts = vec![];
        for i in 0..=divs_u {
            let mut row = vec![];
            for j in 0..=divs_v {
                let pt = self.point_given_bases_knot_spans(
                    knot_spans_u[i],
                    knot_spans_v[j],
                    &bases_u[i],
                    &bases_v[j],
                );
                row.push(dehomogenize(&pt).unwrap());
            }
            pts.push(row);
        }

        Ok(pts)
    }

    /// Evaluate the normal at the given u, v parameters,
    /// the cross product of the two first partial derivatives (unnormalized)
    pub fn normal_at(&self, u: T, v: T) -> OVector<T, DimNameDiff<D, U1>> {
        let deriv = self.rational_derivatives(u, v, 1);
        let du = &deriv[1][0];
        let dv = &deriv[0][1];
        du.cross(dv)
    }

    /// Evaluate the rational partial derivatives at the given u, v
    /// parameters. Entry `[k][l]` is the derivative of order k along u and
    /// order l along v; `[0][0]` is the position.
    pub fn rational_derivatives(
        &self,
        u: T,
        v: T,
        derivs: usize,
    ) -> Vec<Vec<OVector<T, DimNameDiff<D, U1>>>> {
        let ders = self.derivatives(u, v, derivs);
        rational_derivatives(&ders, derivs)
    }

    /// Evaluate the homogeneous partial derivatives at the given u, v parameters
    fn derivatives(&self, u: T, v: T, derivs: usize) -> Vec<Vec<OVector<T, D>>> {
        let u = self.u_knots.clamp(self.u_degree, u);
        let v = self.v_knots.clamp(self.v_degree, v);

        let n = self.u_knots.len() - self.u_degree - 2;
        let m = self.v_knots.len() - self.v_degree - 2;

        let du = if derivs < self.u_degree {
            derivs
        } else {
            self.u_degree
        };
        let dv = if derivs < self.v_degree {
            derivs
        } else {
            self.v_degree
        };
        let mut skl = vec![vec![OVector::<T, D>::zeros(); derivs + 1]; derivs + 1];
        let knot_span_index_u = self.u_knots.find_knot_span_index(n, self.u_degree, u);
        let knot_span_index_v = self.v_knots.find_knot_span_index(m, self.v_degree, v);
        let uders = self
            .u_knots
            .derivative_basis_functions(knot_span_index_u, u, self.u_degree, n);
        let vders = self
            .v_knots
            .derivative_basis_functions(knot_span_index_v, v, self.v_degree, m);
        let mut temp = vec![OPoint::<T, D>::origin(); self.v_degree + 1];

        for k in 0..=du {
            for s in 0..=self.v_degree {
                temp[s] = OPoint::<T, D>::origin();
                for r in 0..=self.u_degree {
                    let w = &self.control_points[knot_span_index_u - self.u_degree + r]
                        [knot_span_index_v - self.v_degree + s]
                        * uders[k][r];
                    let column = temp.get_mut(s).unwrap();
                    w.coords.iter().enumerate().for_each(|(i, v)| {
                        column[i] += *v;
                    });
                }
            }

            let nk = derivs - k;
            let dd = if nk < dv { nk } else { dv };

            for l in 0..=dd {
                for (s, item) in temp.iter().enumerate().take(self.v_degree + 1) {
                    let w = item * vders[l][s];
                    let column = skl[k].get_mut(l).unwrap();
                    w.coords.iter().enumerate().for_each(|(i, v)| {
                        column[i] += *v;
                    });
                }
            }
        }

        skl
    }

    /// Get the Euclidean control point at grid position `(i, j)`
    pub fn control_point_at(
        &self,
        i: usize,
        j: usize,
    ) -> Result<OPoint<T, DimNameDiff<D, U1>>, SplineError> {
        self.check_index(i, j)?;
        Ok(dehomogenize(&self.control_points[i][j]).unwrap())
    }

    /// Get the weight of the control point at grid position `(i, j)`
    pub fn weight_at(&self, i: usize, j: usize) -> Result<T, SplineError> {
        self.check_index(i, j)?;
        Ok(self.control_points[i][j][D::dim() - 1])
    }

    /// Replace the control point at `(i, j)`, preserving its weight
    pub fn set_point(
        &mut self,
        i: usize,
        j: usize,
        point: &OPoint<T, DimNameDiff<D, U1>>,
    ) -> Result<(), SplineError> {
        self.check_index(i, j)?;
        let weight = self.control_points[i][j][D::dim() - 1];
        self.control_points[i][j] = homogenize(point, weight);
        Ok(())
    }

    /// Replace all control points, preserving the per-point weights.
    /// The replacement grid must have the same dimensions as the current one.
    pub fn set_points(
        &mut self,
        points: &[Vec<OPoint<T, DimNameDiff<D, U1>>>],
    ) -> Result<(), SplineError> {
        if points.len() != self.control_points.len() {
            return Err(SplineError::PointCountMismatch {
                expected: self.control_points.len(),
                got: points.len(),
            });
        }
        for (row, current) in points.iter().zip(self.control_points.iter()) {
            if row.len() != current.len() {
                return Err(SplineError::PointCountMismatch {
                    expected: current.len(),
                    got: row.len(),
                });
            }
        }
        let replaced: Vec<Vec<_>> = points
            .iter()
            .zip(self.control_points.iter())
            .map(|(point_row, current_row)| {
                point_row
                    .iter()
                    .zip(current_row.iter())
                    .map(|(p, c)| homogenize(p, c[D::dim() - 1]))
                    .collect()
            })
            .collect();
        self.control_points = replaced;
        Ok(())
    }

    /// Replace the weight of the control point at `(i, j)`.
    /// The weight must be non-zero.
    pub fn set_weight(&mut self, i: usize, j: usize, weight: T) -> Result<(), SplineError> {
        self.check_index(i, j)?;
        if weight == T::zero() {
            return Err(SplineError::ZeroWeight);
        }
        let point = dehomogenize(&self.control_points[i][j]).unwrap();
        self.control_points[i][j] = homogenize(&point, weight);
        Ok(())
    }

    /// Replace all weights.
    /// The replacement grid must have the same dimensions as the current
    /// one, and every weight must be non-zero.
    pub fn set_weights(&mut self, weights: &[Vec<T>]) -> Result<(), SplineError> {
        if weights.len() != self.control_points.len() {
            return Err(SplineError::WeightCountMismatch {
                expected: self.control_points.len(),
                got: weights.len(),
            });
        }
        for (row, current) in weights.iter().zip(self.control_points.iter()) {
            if row.len() != current.len() {
                return Err(SplineError::WeightCountMismatch {
                    expected: current.len(),
                    got: row.len(),
                });
            }
        }
        if weights.iter().flatten().any(|w| *w == T::zero()) {
            return Err(SplineError::ZeroWeight);
        }
        let reweighted: Vec<Vec<_>> = self
            .control_points
            .iter()
            .zip(weights.iter())
            .map(|(current_row, weight_row)| {
                current_row
                    .iter()
                    .zip(weight_row.iter())
                    .map(|(p, w)| homogenize(&dehomogenize(p).unwrap(), *w))
                    .collect()
            })
            .collect();
        self.control_points = reweighted;
        Ok(())
    }

    fn check_index(&self, i: usize, j: usize) -> Result<(), SplineError> {
        if i >= self.control_points.len() {
            return Err(SplineError::IndexOutOfBounds {
                index: i,
                len: self.control_points.len(),
            });
        }
        if j >= self.control_points[i].len() {
            return Err(SplineError::IndexOutOfBounds {
                index: j,
                len: self.control_points[i].len(),
            });
        }
        Ok(())
    }

    pub fn u_degree(&self) -> usize {
        self.u_degree
    }

    pub fn v_degree(&self) -> usize {
        self.v_degree
    }

    pub fn u_knots(&self) -> &KnotVector<T> {
        &self.u_knots
    }

    pub fn v_knots(&self) -> &KnotVector<T> {
        &self.v_knots
    }

    /// The homogeneous control point grid
    pub fn control_points(&self) -> &Vec<Vec<OPoint<T, D>>> {
        &self.control_points
    }

    /// Return the dehomogenized control point grid
    pub fn dehomogenized_control_points(&self) -> Vec<Vec<OPoint<T, DimNameDiff<D, U1>>>> {
        self.control_points
            .iter()
            .map(|row| row.iter().map(|p| dehomogenize(p).unwrap()).collect())
            .collect()
    }

    pub fn weights(&self) -> Vec<Vec<T>> {
        self.control_points
            .iter()
            .map(|row| row.iter().map(|p| p[D::dim() - 1]).collect())
            .collect()
    }
}

/// Compute the rational derivatives from homogeneous derivatives
fn rational_derivatives<T, D>(
    ders: &[Vec<OVector<T, D>>],
    derivs: usize,
) -> Vec<Vec<OVector<T, DimNameDiff<D, U1>>>>
where
    T: FloatingPoint,
    D: DimName,
    DefaultAllocator: Allocator<D>,
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    let a_ders: Vec<_> = ders
        .iter()
        .map(|row| {
            row.iter()
                .map(|d| {
                    let mut a_ders = vec![];
                    for i in 0..D::dim() - 1 {
                        a_ders.push(d[i]);
                    }
                    OVector::<T, DimNameDiff<D, U1>>::from_vec(a_ders)
                })
                .collect::<Vec<_>>()
        })
        .collect();
    let w_ders: Vec<_> = ders
        .iter()
        .map(|row| row.iter().map(|d| d[D::dim() - 1]).collect::<Vec<_>>())
        .collect();

    let mut skl: Vec<Vec<OVector<T, DimNameDiff<D, U1>>>> = vec![];
    let mut binom = Binomial::<T>::new();

    for k in 0..=derivs {
        let mut row = vec![];

        for l in 0..=(derivs - k) {
            let mut v = a_ders[k][l].clone();
            for j in 1..=l {
                let coef = binom.get(l, j) * w_ders[0][j];
                v -= &row[l - j] * coef;
            }

            for i in 1..=k {
                let coef = binom.get(k, i) * w_ders[i][0];
                v -= &skl[k - i][l] * coef;
                let mut v2 = OVector::<T, DimNameDiff<D, U1>>::zeros();
                for j in 1..=l {
                    v2 += &skl[k - i][l - j] * binom.get(l, j) * w_ders[i][j];
                }
                v -= v2 * binom.get(k, i);
            }

            let v = v / w_ders[0][0];
            row.push(v);
        }

        skl.push(row);
    }

    skl
}
