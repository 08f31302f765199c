use nalgebra::{
    allocator::Allocator, Const, DefaultAllocator, DimName, DimNameDiff, DimNameSub, OPoint,
    OVector, Vector2, U1,
};

use crate::misc::FloatingPoint;

/// A triangle mesh tessellated from a surface:
/// flattened sample points with matching normals and uv parameters,
/// plus triangle faces indexing into them.
#[derive(Clone, Debug)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(bound(
        serialize = "T: serde::Serialize, OPoint<T, DimNameDiff<D, U1>>: serde::Serialize, OVector<T, DimNameDiff<D, U1>>: serde::Serialize",
        deserialize = "T: serde::Deserialize<'de>, OPoint<T, DimNameDiff<D, U1>>: serde::Deserialize<'de>, OVector<T, DimNameDiff<D, U1>>: serde::Deserialize<'de>"
    ))
)]
pub struct SurfaceTessellation<T: FloatingPoint, D: DimName>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    pub(crate) points: Vec<OPoint<T, DimNameDiff<D, U1>>>,
    pub(crate) normals: Vec<OVector<T, DimNameDiff<D, U1>>>,
    pub(crate) faces: Vec<[usize; 3]>,
    pub(crate) uvs: Vec<Vector2<T>>,
}

/// 2D tessellation alias
pub type SurfaceTessellation2D<T> = SurfaceTessellation<T, Const<3>>;

/// 3D tessellation alias
pub type SurfaceTessellation3D<T> = SurfaceTessellation<T, Const<4>>;

impl<T: FloatingPoint, D: DimName> SurfaceTessellation<T, D>
where
    D: DimNameSub<U1>,
    DefaultAllocator: Allocator<D>,
    DefaultAllocator: Allocator<DimNameDiff<D, U1>>,
{
    pub fn points(&self) -> &Vec<OPoint<T, DimNameDiff<D, U1>>> {
        &self.points
    }

    pub fn normals(&self) -> &Vec<OVector<T, DimNameDiff<D, U1>>> {
        &self.normals
    }

    /// Triangle faces as index triples into `points`,
    /// two per sampled quad with consistent winding
    pub fn faces(&self) -> &Vec<[usize; 3]> {
        &self.faces
    }

    pub fn uvs(&self) -> &Vec<Vector2<T>> {
        &self.uvs
    }
}
