use approx::assert_relative_eq;
use nalgebra::{Point3, Vector3};

use crate::errors::SplineError;
use crate::surface::{NurbsSurface3D, SurfaceDescriptor};

fn dome_grid() -> Vec<Vec<Point3<f64>>> {
    // 3x3 grid with a raised center point
    (0..3)
        .map(|i| {
            (0..3)
                .map(|j| {
                    let z = if i == 1 && j == 1 { 1.0 } else { 0.0 };
                    Point3::new(i as f64, j as f64, z)
                })
                .collect()
        })
        .collect()
}

#[test]
fn corner_parameters_reproduce_corner_control_points() {
    let grid = dome_grid();
    let surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid.clone()))
        .unwrap();
    assert_eq!(surface.u_degree(), 2);
    assert_eq!(surface.v_degree(), 2);

    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    assert_relative_eq!(surface.point_at(u0, v0), grid[0][0]);
    assert_relative_eq!(surface.point_at(u0, v1), grid[0][2]);
    assert_relative_eq!(surface.point_at(u1, v0), grid[2][0]);
    assert_relative_eq!(surface.point_at(u1, v1), grid[2][2]);
}

#[test]
fn planar_grid_evaluates_in_plane() {
    let grid: Vec<Vec<Point3<f64>>> = (0..4)
        .map(|i| (0..4).map(|j| Point3::new(i as f64, j as f64, 0.)).collect())
        .collect();
    let surface = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(grid).with_degrees(2, 2),
    )
    .unwrap();

    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    for i in 0..=8 {
        for j in 0..=8 {
            let u = u0 + (u1 - u0) * (i as f64) / 8.0;
            let v = v0 + (v1 - v0) * (j as f64) / 8.0;
            let p = surface.point_at(u, v);
            assert_relative_eq!(p.z, 0.0, epsilon = 1e-10);
            // the convex hull property bounds the sample inside the grid
            assert!((0.0..=3.0).contains(&p.x));
            assert!((0.0..=3.0).contains(&p.y));
        }
    }

    // the surface normal of a planar grid points along z
    let normal = surface
        .normal_at((u0 + u1) / 2.0, (v0 + v1) / 2.0)
        .normalize();
    assert_relative_eq!(normal.abs(), Vector3::z(), epsilon = 1e-10);
}

#[test]
fn domain_clamping_matches_corner_evaluation() {
    let grid = dome_grid();
    let surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap();
    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    assert_relative_eq!(surface.point_at(u0 - 5., v0 - 5.), surface.point_at(u0, v0));
    assert_relative_eq!(surface.point_at(u1 + 5., v1 + 5.), surface.point_at(u1, v1));
}

#[test]
fn sampled_grid_matches_pointwise_evaluation() {
    let grid = dome_grid();
    let surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap();

    let divs_u = 6;
    let divs_v = 4;
    let sampled = surface.sample_regular_grid(divs_u, divs_v).unwrap();
    assert_eq!(sampled.len(), divs_u + 1);

    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    for (i, row) in sampled.iter().enumerate() {
        assert_eq!(row.len(), divs_v + 1);
        for (j, p) in row.iter().enumerate() {
            let u = u0 + (u1 - u0) * (i as f64) / divs_u as f64;
            let v = v0 + (v1 - v0) * (j as f64) / divs_v as f64;
            assert_relative_eq!(*p, surface.point_at(u, v), epsilon = 1e-10);
        }
    }
}

#[test]
fn raising_a_weight_pulls_the_surface() {
    let grid = dome_grid();
    let mut surface =
        NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid.clone())).unwrap();
    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    let mid_u = (u0 + u1) / 2.0;
    let mid_v = (v0 + v1) / 2.0;

    let before = (surface.point_at(mid_u, mid_v) - grid[1][1]).norm();
    surface.set_weight(1, 1, 8.).unwrap();
    let after = (surface.point_at(mid_u, mid_v) - grid[1][1]).norm();
    assert!(after < before);
}

#[test]
fn out_of_bounds_setters_leave_state_intact() {
    let grid = dome_grid();
    let mut surface = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid)).unwrap();
    let before = surface.control_points().clone();

    let err = surface.set_point(3, 0, &Point3::origin()).unwrap_err();
    assert_eq!(err, SplineError::IndexOutOfBounds { index: 3, len: 3 });
    let err = surface.set_weight(0, 7, 2.).unwrap_err();
    assert_eq!(err, SplineError::IndexOutOfBounds { index: 7, len: 3 });
    assert_eq!(surface.control_points(), &before);
}

#[test]
fn setters_apply_in_place() {
    let grid = dome_grid();
    let mut surface =
        NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(grid.clone())).unwrap();

    let replacement = Point3::new(0., 0., 3.);
    surface.set_point(0, 0, &replacement).unwrap();
    assert_relative_eq!(surface.control_point_at(0, 0).unwrap(), replacement);

    surface.set_weight(2, 2, 3.).unwrap();
    assert_relative_eq!(surface.weight_at(2, 2).unwrap(), 3.);
    assert_relative_eq!(surface.control_point_at(2, 2).unwrap(), grid[2][2]);

    // the clamped surface interpolates the moved corner
    let (u0, _) = surface.u_knots_domain();
    let (v0, _) = surface.v_knots_domain();
    assert_relative_eq!(surface.point_at(u0, v0), replacement);
}

#[test]
fn invalid_descriptors_are_rejected() {
    let mut ragged = dome_grid();
    ragged[1].pop();
    let err = NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(ragged)).unwrap_err();
    assert_eq!(err, SplineError::RaggedGrid);

    let err = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(dome_grid()).with_weights(vec![vec![1.; 3]; 2]),
    )
    .unwrap_err();
    assert_eq!(err, SplineError::WeightCountMismatch { expected: 3, got: 2 });

    let err = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(dome_grid()).with_u_knots(vec![0., 0., 1., 1.]),
    )
    .unwrap_err();
    assert_eq!(
        err,
        SplineError::KnotSizeMismatch {
            expected: 6,
            got: 4,
            count: 3,
            degree: 2
        }
    );

    let err = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(dome_grid()).with_degrees(3, 2),
    )
    .unwrap_err();
    assert_eq!(err, SplineError::TooFewControlPoints { degree: 3, count: 3 });
}

#[test]
fn tensor_product_bases_form_a_partition_of_unity() {
    let grid: Vec<Vec<Point3<f64>>> = (0..4)
        .map(|i| (0..4).map(|j| Point3::new(i as f64, j as f64, 0.)).collect())
        .collect();
    let surface = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(grid).with_degrees(2, 2),
    )
    .unwrap();

    let nu = surface.u_knots().len() - surface.u_degree() - 2;
    let nv = surface.v_knots().len() - surface.v_degree() - 2;
    let (u0, u1) = surface.u_knots_domain();
    let (v0, v1) = surface.v_knots_domain();
    for i in 0..=12 {
        for j in 0..=12 {
            let u = u0 + (u1 - u0) * (i as f64) / 12.0;
            let v = v0 + (v1 - v0) * (j as f64) / 12.0;
            let span_u = surface.u_knots().find_knot_span_index(nu, surface.u_degree(), u);
            let span_v = surface.v_knots().find_knot_span_index(nv, surface.v_degree(), v);
            let bases_u = surface.u_knots().basis_functions(span_u, u, surface.u_degree());
            let bases_v = surface.v_knots().basis_functions(span_v, v, surface.v_degree());
            let sum: f64 = bases_u
                .iter()
                .flat_map(|bu| bases_v.iter().map(move |bv| bu * bv))
                .sum();
            assert!((sum - 1.0).abs() < 1e-10, "sum {} at ({}, {})", sum, u, v);
        }
    }
}

#[test]
fn zero_weights_are_rejected() {
    let mut weights = vec![vec![1.; 3]; 3];
    weights[1][1] = 0.;
    let err = NurbsSurface3D::try_from_descriptor(
        SurfaceDescriptor::new(dome_grid()).with_weights(weights),
    )
    .unwrap_err();
    assert_eq!(err, SplineError::ZeroWeight);

    let mut surface =
        NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(dome_grid())).unwrap();
    let before = surface.control_points().clone();
    assert_eq!(
        surface.set_weight(0, 2, 0.).unwrap_err(),
        SplineError::ZeroWeight
    );
    let mut replacement = vec![vec![1.; 3]; 3];
    replacement[2][0] = 0.;
    assert_eq!(
        surface.set_weights(&replacement).unwrap_err(),
        SplineError::ZeroWeight
    );
    assert_eq!(surface.control_points(), &before);
}

#[test]
fn bulk_setters_validate_dimensions() {
    let mut surface =
        NurbsSurface3D::try_from_descriptor(SurfaceDescriptor::new(dome_grid())).unwrap();

    let err = surface.set_weights(&vec![vec![1.; 3]; 4]).unwrap_err();
    assert_eq!(err, SplineError::WeightCountMismatch { expected: 3, got: 4 });

    let err = surface
        .set_points(&vec![vec![Point3::origin(); 2]; 3])
        .unwrap_err();
    assert_eq!(err, SplineError::PointCountMismatch { expected: 3, got: 2 });

    // valid replacement applies everywhere
    let flat: Vec<Vec<Point3<f64>>> = (0..3)
        .map(|i| (0..3).map(|j| Point3::new(i as f64, j as f64, 0.)).collect())
        .collect();
    surface.set_points(&flat).unwrap();
    assert_relative_eq!(surface.control_point_at(1, 1).unwrap(), flat[1][1]);
}
