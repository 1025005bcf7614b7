//! Ray/element intersection primitives for element search on the sphere.
//!
//! Target points live on the sphere surface while mesh elements are flat
//! chords below it, so element location casts a ray from the surface point
//! toward the geocenter and intersects it with candidate elements. The
//! parametric coordinates of the hit double as interpolation coordinates:
//! `(u, v)` barycentric for triangles, bilinear for quadrilaterals.

use super::{add, cross, dot, norm, scale, sub, Vec3};

/// Result of a ray/element intersection: parametric coordinates within the
/// element and the ray parameter of the hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersect {
    pub u: f64,
    pub v: f64,
    pub t: f64,
}

/// Half-line `orig + t * dir`, `t >= 0`.
#[derive(Debug, Clone, Copy)]
pub struct Ray {
    pub orig: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(orig: Vec3, dir: Vec3) -> Self {
        Self { orig, dir }
    }

    /// Ray from a point on (or above) the sphere surface aimed at the
    /// geocenter.
    pub fn from_surface_point(p: Vec3) -> Self {
        Self {
            orig: p,
            dir: scale(p, -1.0),
        }
    }

    #[inline]
    pub fn at(&self, t: f64) -> Vec3 {
        add(self.orig, scale(self.dir, t))
    }
}

/// Triangle in Cartesian space, vertices counter-clockwise.
#[derive(Debug, Clone, Copy)]
pub struct Triag3D {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
}

impl Triag3D {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3) -> Self {
        Self { v0, v1, v2 }
    }

    pub fn area(&self) -> f64 {
        let e1 = sub(self.v1, self.v0);
        let e2 = sub(self.v2, self.v0);
        0.5 * norm(cross(e1, e2))
    }

    /// Möller–Trumbore intersection.
    ///
    /// `edge_epsilon` widens the parametric acceptance interval to
    /// `[-edge_epsilon, 1 + edge_epsilon]` so that hits on shared element
    /// edges are not lost to roundoff. The caller scales it with the element
    /// size. Returns `None` for misses, back-of-origin hits and rays parallel
    /// to the triangle plane.
    pub fn intersects(&self, ray: &Ray, edge_epsilon: f64) -> Option<Intersect> {
        let e1 = sub(self.v1, self.v0);
        let e2 = sub(self.v2, self.v0);
        let p = cross(ray.dir, e2);
        let det = dot(e1, p);
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let tv = sub(ray.orig, self.v0);
        let u = dot(tv, p) * inv_det;
        if u < -edge_epsilon || u > 1.0 + edge_epsilon {
            return None;
        }
        let q = cross(tv, e1);
        let v = dot(ray.dir, q) * inv_det;
        if v < -edge_epsilon || u + v > 1.0 + edge_epsilon {
            return None;
        }
        let t = dot(e2, q) * inv_det;
        if t < 0.0 {
            return None;
        }
        Some(Intersect { u, v, t })
    }
}

/// Quadrilateral in Cartesian space, vertices counter-clockwise:
/// `v0 = (0,0)`, `v1 = (1,0)`, `v2 = (1,1)`, `v3 = (0,1)` in parametric
/// coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Quad3D {
    pub v0: Vec3,
    pub v1: Vec3,
    pub v2: Vec3,
    pub v3: Vec3,
}

impl Quad3D {
    pub fn new(v0: Vec3, v1: Vec3, v2: Vec3, v3: Vec3) -> Self {
        Self { v0, v1, v2, v3 }
    }

    pub fn area(&self) -> f64 {
        Triag3D::new(self.v0, self.v1, self.v2).area()
            + Triag3D::new(self.v2, self.v3, self.v0).area()
    }

    /// Intersect with the quad's supporting plane, then invert the bilinear
    /// map to parametric `(u, v)`. Exact for planar quads; mesh cells on the
    /// sphere are planar chords, so the plane defined by the diagonals is the
    /// element itself.
    pub fn intersects(&self, ray: &Ray, edge_epsilon: f64) -> Option<Intersect> {
        let normal = cross(sub(self.v2, self.v0), sub(self.v3, self.v1));
        let denom = dot(normal, ray.dir);
        if denom.abs() < f64::EPSILON {
            return None;
        }
        let t = dot(normal, sub(self.v0, ray.orig)) / denom;
        if t < 0.0 {
            return None;
        }
        let hit = ray.at(t);

        // Work in 2D: drop the axis where the plane normal is largest.
        let drop = {
            let n = [normal[0].abs(), normal[1].abs(), normal[2].abs()];
            if n[0] >= n[1] && n[0] >= n[2] {
                0
            } else if n[1] >= n[2] {
                1
            } else {
                2
            }
        };
        let pick = |p: Vec3| -> [f64; 2] {
            match drop {
                0 => [p[1], p[2]],
                1 => [p[0], p[2]],
                _ => [p[0], p[1]],
            }
        };
        let (a, b, c, d) = (pick(self.v0), pick(self.v1), pick(self.v2), pick(self.v3));
        let p = pick(hit);

        let (u, v) = inverse_bilinear(a, b, c, d, p, edge_epsilon)?;
        Some(Intersect { u, v, t })
    }
}

#[inline]
fn cross2(a: [f64; 2], b: [f64; 2]) -> f64 {
    a[0] * b[1] - a[1] * b[0]
}

/// Invert `p = (1-u)(1-v) a + u(1-v) b + u v c + (1-u) v d` for `(u, v)`,
/// accepting coordinates within `[-eps, 1 + eps]`.
fn inverse_bilinear(
    a: [f64; 2],
    b: [f64; 2],
    c: [f64; 2],
    d: [f64; 2],
    p: [f64; 2],
    eps: f64,
) -> Option<(f64, f64)> {
    let e = [b[0] - a[0], b[1] - a[1]];
    let f = [d[0] - a[0], d[1] - a[1]];
    let g = [a[0] - b[0] + c[0] - d[0], a[1] - b[1] + c[1] - d[1]];
    let h = [p[0] - a[0], p[1] - a[1]];

    let k2 = cross2(g, f);
    let k1 = cross2(e, f) + cross2(h, g);
    let k0 = cross2(h, e);

    let in_range = |x: f64| (-eps..=1.0 + eps).contains(&x);
    let u_for = |v: f64| -> Option<f64> {
        let denom_x = e[0] + g[0] * v;
        let denom_y = e[1] + g[1] * v;
        let u = if denom_x.abs() >= denom_y.abs() {
            if denom_x.abs() < f64::EPSILON {
                return None;
            }
            (h[0] - f[0] * v) / denom_x
        } else {
            (h[1] - f[1] * v) / denom_y
        };
        in_range(u).then_some(u)
    };

    if k2.abs() < f64::EPSILON {
        // Parallelogram: the map is affine in v.
        if k1.abs() < f64::EPSILON {
            return None;
        }
        let v = -k0 / k1;
        if !in_range(v) {
            return None;
        }
        return u_for(v).map(|u| (u, v));
    }

    let disc = k1 * k1 - 4.0 * k2 * k0;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    for v in [(-k1 + sq) / (2.0 * k2), (-k1 - sq) / (2.0 * k2)] {
        if in_range(v) {
            if let Some(u) = u_for(v) {
                return Some((u, v));
            }
        }
    }
    None
}
