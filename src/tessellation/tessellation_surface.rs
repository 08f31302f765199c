use nalgebra::{
    allocator::Allocator, DefaultAllocator, DimName, DimNameDiff, DimNameSub, Vector2, U1,
};

use crate::errors::SplineError;
use crate::misc::FloatingPoint;
use crate::surface::NurbsSurface;

use super::{SurfaceTessellation, Tessellation};

impl<T: FloatingPoint, D: DimName> Tessellation<(usize, usize)> for NurbsSurface<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    type Output = Result<SurfaceTessellation<T, D>, SplineError>;

    /// Tessellate the surface into a triangle mesh over a regular
    /// `(divs_u + 1) x (divs_v + 1)` grid of samples, two triangles per
    /// sampled quad with consistent winding
    fn tessellate(&self, (divs_u, divs_v): (usize, usize)) -> Self::Output {
        if divs_u < 1 {
            return Err(SplineError::InvalidDivisionCount(divs_u));
        }
        if divs_v < 1 {
            return Err(SplineError::InvalidDivisionCount(divs_v));
        }

        let (u_start, _, u_step, _) = self.u_knots().sampled_span(self.u_degree(), divs_u);
        let (v_start, _, v_step, _) = self.v_knots().sampled_span(self.v_degree(), divs_v);

        let mut points = vec![];
        let mut normals = vec![];
        let mut uvs = vec![];

        for i in 0..=divs_u {
            let u = u_start + u_step * T::from_usize(i).unwrap();
            for j in 0..=divs_v {
                let v = v_start + v_step * T::from_usize(j).unwrap();

                let ders = self.rational_derivatives(u, v, 1);
                let normal = ders[1][0].cross(&ders[0][1]).normalize();
                points.push(ders[0][0].clone().into());
                normals.push(normal);
                uvs.push(Vector2::new(u, v));
            }
        }

        let faces = (0..divs_u)
            .flat_map(|iu| {
                let ioff = iu * (divs_v + 1);
                (0..divs_v).flat_map(move |iv| {
                    [
                        [ioff + iv, ioff + iv + 1, ioff + iv + divs_v + 2],
                        [ioff + iv, ioff + iv + divs_v + 2, ioff + iv + divs_v + 1],
                    ]
                })
            })
            .collect();

        #[cfg(feature = "log")]
        log::trace!(
            "tessellated surface into {} points and {} triangles",
            points.len(),
            divs_u * divs_v * 2
        );

        Ok(SurfaceTessellation {
            points,
            normals,
            faces,
            uvs,
        })
    }
}
