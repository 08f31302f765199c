use std::ops::Index;

use itertools::Itertools;
use nalgebra::RealField;

use crate::errors::SplineError;
use crate::knot::KnotMultiplicity;

/// A non-decreasing sequence of knot values.
///
/// The knot vector partitions parameter space into spans over which the
/// basis functions are piecewise polynomial. For a curve with `n` control
/// points of degree `p`, the vector must hold `n + p + 1` knots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KnotVector<T>(Vec<T>);

impl<T: RealField + Copy> KnotVector<T> {
    /// Create a knot vector without checking monotonicity.
    /// The caller must guarantee the knots are non-decreasing.
    pub fn new(knots: Vec<T>) -> Self {
        Self(knots)
    }

    /// Create a knot vector from an explicit array,
    /// rejecting any decreasing pair of knots.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::*;
    /// assert!(KnotVector::try_new(vec![0., 0., 1., 2., 2.]).is_ok());
    /// assert!(KnotVector::<f64>::try_new(vec![0., 1., 0.5, 2.]).is_err());
    /// ```
    pub fn try_new(knots: Vec<T>) -> Result<Self, SplineError> {
        if let Some((index, _)) = knots.iter().tuple_windows().find_position(|(a, b)| a > b) {
            return Err(SplineError::DecreasingKnots { index: index + 1 });
        }
        Ok(Self(knots))
    }

    /// Create a clamped uniform knot vector for `count` control points of
    /// the given degree. Every interior span has length 1 and the first and
    /// last knots repeat `degree + 1` times.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::KnotVector;
    /// let knots: KnotVector<f64> = KnotVector::uniform(4, 2);
    /// assert_eq!(knots.to_vec(), vec![0., 0., 0., 1., 2., 2., 2.]);
    /// ```
    pub fn uniform(count: usize, degree: usize) -> Self {
        let knots = (0..count + degree + 1)
            .map(|i| T::from_usize(i.min(count).saturating_sub(degree)).unwrap())
            .collect();
        Self(knots)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_vec(&self) -> Vec<T> {
        self.0.clone()
    }

    pub fn iter(&self) -> std::slice::Iter<T> {
        self.0.iter()
    }

    /// The valid parametric domain of the knot vector for a given degree.
    pub fn domain(&self, degree: usize) -> (T, T) {
        (self.0[degree], self.0[self.0.len() - 1 - degree])
    }

    /// Clamp a parameter into the valid domain.
    pub fn clamp(&self, degree: usize, u: T) -> T {
        let (min, max) = self.domain(degree);
        u.clamp(min, max)
    }

    /// Get the multiplicity of each distinct knot value.
    /// # Example
    /// ```
    /// use spliner::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let mult = knots.multiplicity();
    /// assert_eq!(mult[0].multiplicity(), 3);
    /// assert_eq!(mult[1].multiplicity(), 1);
    /// assert_eq!(mult[2].multiplicity(), 1);
    /// assert_eq!(mult[3].multiplicity(), 3);
    /// ```
    pub fn multiplicity(&self) -> Vec<KnotMultiplicity<T>> {
        let mut mult = vec![];

        let mut current = KnotMultiplicity::new(self.0[0], 0);
        self.iter().for_each(|knot| {
            if (*knot - *current.knot()).abs() > T::default_epsilon() {
                mult.push(current.clone());
                current = KnotMultiplicity::new(*knot, 0);
            }
            current.increment_multiplicity();
        });
        mult.push(current);

        mult
    }

    /// Check if the knot vector is clamped,
    /// meaning its first and last knots repeat more than `degree` times.
    /// A clamped vector forces the curve through its end control points.
    pub fn is_clamped(&self, degree: usize) -> bool {
        let multiplicity = self.multiplicity();
        match (multiplicity.first(), multiplicity.last()) {
            (Some(start), Some(end)) => {
                start.multiplicity() > degree && end.multiplicity() > degree
            }
            _ => false,
        }
    }

    /// Find the knot span index containing `u` by binary search.
    ///
    /// At the upper end of the domain the last non-degenerate span is
    /// returned, so the basis functions still sum to one at `u == last knot`.
    ///
    /// # Example
    /// ```
    /// use spliner::prelude::KnotVector;
    /// let knots = KnotVector::new(vec![0., 0., 0., 1., 2., 3., 3., 3.]);
    /// let idx = knots.find_knot_span_index(6, 2, 2.5);
    /// assert_eq!(idx, 4);
    /// ```
    pub fn find_knot_span_index(&self, n: usize, degree: usize, u: T) -> usize {
        if u > self[n + 1] - T::default_epsilon() {
            return n;
        }

        if u < self[degree] + T::default_epsilon() {
            return degree;
        }

        let mut low = degree;
        let mut high = n + 1;
        let mut mid = (low + high) / 2;
        while u < self[mid] || self[mid + 1] <= u {
            if u < self[mid] {
                high = mid;
            } else {
                low = mid;
            }
            let next = (low + high) / 2;
            if mid == next {
                break;
            }
            mid = next;
        }

        mid
    }

    /// Compute the `degree + 1` non-vanishing basis function values at `u`
    /// with the iterative triangular-table form of the Cox-de Boor recursion.
    /// Degenerate spans contribute zero instead of dividing by zero.
    pub fn basis_functions(&self, knot_span_index: usize, u: T, degree: usize) -> Vec<T> {
        let mut basis = vec![T::zero(); degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        basis[0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_span_index + 1 - j];
            right[j] = self[knot_span_index + j] - u;
            let mut saved = T::zero();

            for r in 0..j {
                let temp = basis[r] / (right[r + 1] + left[j - r]);
                basis[r] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }

            basis[j] = saved;
        }

        basis
    }

    /// Compute the non-vanishing basis functions and their derivatives.
    /// Returns a 2d array of size `(n + 1, degree + 1)` whose k-th row holds
    /// the k-th derivative values; row zero holds the basis values themselves.
    pub fn derivative_basis_functions(
        &self,
        knot_index: usize,
        u: T,
        degree: usize,
        n: usize, // number of derivatives to compute
    ) -> Vec<Vec<T>> {
        let mut ndu = vec![vec![T::zero(); degree + 1]; degree + 1];
        let mut left = vec![T::zero(); degree + 1];
        let mut right = vec![T::zero(); degree + 1];

        ndu[0][0] = T::one();

        for j in 1..=degree {
            left[j] = u - self[knot_index + 1 - j];
            right[j] = self[knot_index + j] - u;

            let mut saved = T::zero();
            for r in 0..j {
                // lower triangle stores knot differences
                ndu[j][r] = right[r + 1] + left[j - r];
                let temp = ndu[r][j - 1] / ndu[j][r];

                // upper triangle stores basis values
                ndu[r][j] = saved + right[r + 1] * temp;
                saved = left[j - r] * temp;
            }
            ndu[j][j] = saved;
        }

        let mut ders = vec![vec![T::zero(); degree + 1]; n + 1];
        let mut a = vec![vec![T::zero(); degree + 1]; 2];

        for j in 0..=degree {
            ders[0][j] = ndu[j][degree];
        }

        let idegree = degree as isize;
        let n = n as isize;

        for r in 0..=idegree {
            // a holds the two most recent rows of coefficients
            let mut s1 = 0;
            let mut s2 = 1;
            a[0][0] = T::one();

            for k in 1..=n {
                let mut d = T::zero();
                let rk = r - k;
                let pk = idegree - k;

                if r >= k {
                    a[s2][0] = a[s1][0] / ndu[(pk + 1) as usize][rk as usize];
                    d = a[s2][0] * ndu[rk as usize][pk as usize];
                }

                let j1 = if rk >= -1 { 1 } else { -rk };
                let j2 = if r - 1 <= pk { k - 1 } else { idegree - r };

                for j in j1..=j2 {
                    a[s2][j as usize] = (a[s1][j as usize] - a[s1][j as usize - 1])
                        / ndu[(pk + 1) as usize][(rk + j) as usize];
                    d += a[s2][j as usize] * ndu[(rk + j) as usize][pk as usize];
                }

                let uk = k as usize;
                let ur = r as usize;
                if r <= pk {
                    a[s2][uk] = -a[s1][(k - 1) as usize] / ndu[(pk + 1) as usize][ur];
                    d += a[s2][uk] * ndu[ur][pk as usize];
                }

                ders[uk][ur] = d;

                std::mem::swap(&mut s1, &mut s2);
            }
        }

        // multiply through by the correct factors
        let mut acc = idegree;
        for k in 1..=n {
            for j in 0..=idegree {
                ders[k as usize][j as usize] *= T::from_isize(acc).unwrap();
            }
            acc *= idegree - k;
        }
        ders
    }

    /// Compute basis functions at evenly spaced parameters across the domain.
    /// Returns the knot span and basis values per sample, `divs + 1` in total.
    /// Pre-computing these is faster than evaluating samples one by one.
    pub fn sampled_basis_functions(&self, degree: usize, divs: usize) -> (Vec<usize>, Vec<Vec<T>>) {
        let (start, _end, step, n) = self.sampled_span(degree, divs);

        let mut bases = vec![];
        let mut knot_spans = vec![];
        let mut u = start;
        let mut knot_index = self.find_knot_span_index(n, degree, u);

        for _i in 0..=divs {
            while u >= self[knot_index + 1] && knot_index < n {
                knot_index += 1;
            }
            knot_spans.push(knot_index);
            bases.push(self.basis_functions(knot_index, u, degree));
            u += step;
        }

        (knot_spans, bases)
    }

    /// The domain endpoints, step size and max span index for sampling the
    /// knot vector at `divs` evenly spaced divisions.
    pub fn sampled_span(&self, degree: usize, divs: usize) -> (T, T, T, usize) {
        let n = self.len() - degree - 2;
        let (start, end) = self.domain(degree);
        let step = (end - start) / T::from_usize(divs).unwrap();
        (start, end, step, n)
    }
}

impl<T> Index<usize> for KnotVector<T> {
    type Output = T;
    fn index(&self, index: usize) -> &Self::Output {
        &self.0[index]
    }
}
