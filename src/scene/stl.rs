//! STL model loading (ASCII or binary)

use std::fs::OpenOptions;
use std::path::Path;
use super::mesh::SoupTriangle;
use crate::error::Result;
use crate::rasterizer::Vec3;

/// Read every facet of an STL file as a soup triangle.
///
/// Facets with a zero normal get one from their winding order.
pub fn load_stl<P: AsRef<Path>>(path: P) -> Result<Vec<SoupTriangle>> {
    let path = path.as_ref();
    let mut file = OpenOptions::new().read(true).open(path)?;
    let reader = stl_io::create_stl_reader(&mut file)?;

    let mut tris = Vec::new();
    for facet in reader {
        let facet = facet?;
        let [a, b, c] = facet.vertices.map(to_vec3);
        let normal = to_vec3(facet.normal);
        let tri = if normal.len_squared() > 0.0 {
            SoupTriangle::new(a, b, c, normal.normalize())
        } else {
            SoupTriangle::from_winding(a, b, c)
        };
        tris.push(tri);
    }

    log::debug!("read {} facets from {}", tris.len(), path.display());
    Ok(tris)
}

fn to_vec3(v: stl_io::Vector<f32>) -> Vec3 {
    Vec3::new(f64::from(v[0]), f64::from(v[1]), f64::from(v[2]))
}
