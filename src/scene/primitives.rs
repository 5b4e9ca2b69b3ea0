//! Built-in triangle soups for scenes that don't load geometry from disk

use std::f64::consts::{PI, TAU};
use super::mesh::SoupTriangle;
use crate::rasterizer::Vec3;

/// Axis-aligned cube of side 1 centered on the origin, outward normals
pub fn unit_cube() -> Vec<SoupTriangle> {
    // (normal, two in-face axes u and v with u x v = normal)
    let faces = [
        (Vec3::X, Vec3::Y, Vec3::Z),
        (-Vec3::X, Vec3::Z, Vec3::Y),
        (Vec3::Y, Vec3::Z, Vec3::X),
        (-Vec3::Y, Vec3::X, Vec3::Z),
        (Vec3::Z, Vec3::X, Vec3::Y),
        (-Vec3::Z, Vec3::Y, Vec3::X),
    ];

    let mut tris = Vec::with_capacity(12);
    for (normal, u, v) in faces {
        let center = normal * 0.5;
        let corner = |su: f64, sv: f64| center + u * (0.5 * su) + v * (0.5 * sv);
        let (a, b, c, d) = (corner(-1.0, -1.0), corner(1.0, -1.0), corner(1.0, 1.0), corner(-1.0, 1.0));

        // Two triangles per face
        tris.push(SoupTriangle::new(a, b, c, normal));
        tris.push(SoupTriangle::new(a, c, d, normal));
    }
    tris
}

/// Latitude/longitude sphere of radius 0.5 centered on the origin.
///
/// `segments` around the Z axis (at least 3), `rings` from pole to pole
/// (at least 2). Face normals point away from the center.
pub fn uv_sphere(segments: usize, rings: usize) -> Vec<SoupTriangle> {
    let segments = segments.max(3);
    let rings = rings.max(2);
    let radius = 0.5;

    let point = |seg: usize, ring: usize| {
        let theta = TAU * seg as f64 / segments as f64;
        let phi = PI * ring as f64 / rings as f64;
        Vec3::new(phi.sin() * theta.cos(), phi.sin() * theta.sin(), phi.cos()) * radius
    };
    let outward = |a: Vec3, b: Vec3, c: Vec3| {
        let tri = SoupTriangle::from_winding(a, b, c);
        let centroid = (a + b + c) / 3.0;
        if tri.normal.dot(centroid) < 0.0 {
            SoupTriangle::new(a, c, b, -tri.normal)
        } else {
            tri
        }
    };

    let mut tris = Vec::with_capacity(segments * rings * 2);
    for ring in 0..rings {
        for seg in 0..segments {
            let next = (seg + 1) % segments;
            let a = point(seg, ring);
            let b = point(next, ring);
            let c = point(next, ring + 1);
            let d = point(seg, ring + 1);

            // Pole rows collapse to a single triangle
            if ring != 0 {
                tris.push(outward(a, b, c));
            }
            if ring != rings - 1 {
                tris.push(outward(a, c, d));
            }
        }
    }
    tris
}
