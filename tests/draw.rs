use approx::assert_relative_eq;
use nalgebra::{Const, Point3, Vector3};

use spliner::prelude::*;

/// A renderer that records everything it is asked to draw.
#[derive(Default)]
struct RecordingRenderer {
    polylines: Vec<Vec<Point3<f64>>>,
    meshes: Vec<Vec<Vec<Point3<f64>>>>,
}

impl Renderer<f64, Const<3>> for RecordingRenderer {
    fn polyline(&mut self, points: &[Point3<f64>]) {
        self.polylines.push(points.to_vec());
    }

    fn mesh(&mut self, grid: &[Vec<Point3<f64>>]) {
        self.meshes.push(grid.to_vec());
    }
}

#[test]
fn degree_one_curve_draws_a_straight_polyline() {
    let p0 = Point3::new(0., 0., 0.);
    let p1 = Point3::new(4., 2., 0.);
    let curve = NurbsCurve3D::try_from_descriptor(CurveDescriptor::new(vec![p0, p1])).unwrap();

    let mut renderer = RecordingRenderer::default();
    curve.draw(&mut renderer, 4).unwrap();

    assert_eq!(renderer.polylines.len(), 1);
    let polyline = &renderer.polylines[0];
    assert_eq!(polyline.len(), 5);
    for (i, p) in polyline.iter().enumerate() {
        let t = i as f64 / 4.0;
        assert_relative_eq!(*p, p0 + (p1 - p0) * t, epsilon = 1e-10);
    }
}

#[test]
fn drawing_requires_at_least_one_segment() {
    let curve = NurbsCurve3D::try_from_descriptor(CurveDescriptor::new(vec![
        Point3::origin(),
        Point3::new(1., 0., 0.),
    ]))
    .unwrap();

    let mut renderer = RecordingRenderer::default();
    let err = curve.draw(&mut renderer, 0).unwrap_err();
    assert_eq!(err, SplineError::InvalidDivisionCount(0));
    assert!(renderer.polylines.is_empty());
}

fn quadratic_patch() -> NurbsSurface3D<f64> {
    let grid: Vec<Vec<Point3<f64>>> = (0..3)
        .map(|i| {
            (0..3)
                .map(|j| {
                    let z = if i == 1 && j == 1 { 1.0 } else { 0.0 };
                    Point3::new(i as f64, j as f64, z)
                })
                .collect()
        })
        .collect();
    NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap()
}

#[test]
fn surface_draw_forwards_a_full_grid() {
    let surface = quadratic_patch();

    let mut renderer = RecordingRenderer::default();
    surface.draw(&mut renderer, (2, 3)).unwrap();

    assert_eq!(renderer.meshes.len(), 1);
    let grid = &renderer.meshes[0];
    assert_eq!(grid.len(), 3);
    assert!(grid.iter().all(|row| row.len() == 4));

    // grid samples agree with direct evaluation
    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    for (i, row) in grid.iter().enumerate() {
        for (j, p) in row.iter().enumerate() {
            let u = u0 + (u1 - u0) * (i as f64) / 2.0;
            let v = v0 + (v1 - v0) * (j as f64) / 3.0;
            assert_relative_eq!(*p, surface.point_at(u, v), epsilon = 1e-10);
        }
    }
}

#[test]
fn surface_draw_regular_uses_the_same_count_in_both_directions() {
    let surface = quadratic_patch();
    let mut renderer = RecordingRenderer::default();
    surface.draw_regular(&mut renderer, 5).unwrap();

    let grid = &renderer.meshes[0];
    assert_eq!(grid.len(), 6);
    assert!(grid.iter().all(|row| row.len() == 6));
}

#[test]
fn surface_tessellation_produces_two_triangles_per_quad() {
    let surface = quadratic_patch();
    let divs_u = 4;
    let divs_v = 6;
    let tess = surface.tessellate((divs_u, divs_v)).unwrap();

    assert_eq!(tess.points().len(), (divs_u + 1) * (divs_v + 1));
    assert_eq!(tess.normals().len(), tess.points().len());
    assert_eq!(tess.uvs().len(), tess.points().len());
    assert_eq!(tess.faces().len(), divs_u * divs_v * 2);

    for face in tess.faces() {
        assert!(face.iter().all(|i| *i < tess.points().len()));
    }
}

#[test]
fn planar_tessellation_has_consistent_winding() {
    let grid: Vec<Vec<Point3<f64>>> = (0..3)
        .map(|i| (0..3).map(|j| Point3::new(i as f64, j as f64, 0.)).collect())
        .collect();
    let surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap();
    let tess = surface.tessellate((4, 4)).unwrap();

    // all triangles of a planar patch must face the same way
    let mut signs = vec![];
    for [a, b, c] in tess.faces() {
        let pa = &tess.points()[*a];
        let pb = &tess.points()[*b];
        let pc = &tess.points()[*c];
        let n: Vector3<f64> = (pb - pa).cross(&(pc - pa));
        assert!(n.norm() > 1e-12);
        signs.push(n.z.signum());
    }
    assert!(signs.windows(2).all(|w| w[0] == w[1]));
}
