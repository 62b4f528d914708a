use serde::{Deserialize, Serialize};

use super::point::Point3d;
use super::vector::Vec3;
use crate::operations::OperationError;

/// Knot spacing for Catmull-Rom interpolation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Parameterization {
    /// Equal knot spacing with tension 0.5.
    Uniform,
    /// Knots spaced by the square root of chord length. Never forms cusps or
    /// self-intersections within a segment.
    #[default]
    Centripetal,
    /// Knots spaced by chord length.
    Chordal,
}

/// An open interpolating Catmull-Rom spline through a sequence of points.
///
/// Parameter `u` in `[0, 1]` is split evenly across the `n - 1` segments.
/// The curve passes through every control point; the missing neighbours at
/// the two ends are extrapolated by reflection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatmullRom {
    points: Vec<Point3d>,
    parameterization: Parameterization,
}

/// Cubic coefficients for one segment of one coordinate.
#[derive(Debug, Clone, Copy)]
struct Cubic {
    c0: f64,
    c1: f64,
    c2: f64,
    c3: f64,
}

impl Cubic {
    /// Hermite form from endpoint values and tangents.
    fn hermite(x0: f64, x1: f64, t0: f64, t1: f64) -> Self {
        Self {
            c0: x0,
            c1: t0,
            c2: -3.0 * x0 + 3.0 * x1 - 2.0 * t0 - t1,
            c3: 2.0 * x0 - 2.0 * x1 + t0 + t1,
        }
    }

    fn uniform(x0: f64, x1: f64, x2: f64, x3: f64, tension: f64) -> Self {
        Self::hermite(x1, x2, tension * (x2 - x0), tension * (x3 - x1))
    }

    fn nonuniform(x: [f64; 4], dt0: f64, dt1: f64, dt2: f64) -> Self {
        let [x0, x1, x2, x3] = x;
        let t1 = (x1 - x0) / dt0 - (x2 - x0) / (dt0 + dt1) + (x2 - x1) / dt1;
        let t2 = (x2 - x1) / dt1 - (x3 - x1) / (dt1 + dt2) + (x3 - x2) / dt2;
        Self::hermite(x1, x2, t1 * dt1, t2 * dt1)
    }

    fn eval(&self, t: f64) -> f64 {
        let t2 = t * t;
        self.c0 + self.c1 * t + self.c2 * t2 + self.c3 * t2 * t
    }
}

impl CatmullRom {
    pub fn new(points: Vec<Point3d>, parameterization: Parameterization) -> Result<Self, OperationError> {
        if points.len() < 2 {
            return Err(OperationError::InsufficientPath {
                required: 2,
                provided: points.len(),
            });
        }
        Ok(Self {
            points,
            parameterization,
        })
    }

    pub fn centripetal(points: Vec<Point3d>) -> Result<Self, OperationError> {
        Self::new(points, Parameterization::Centripetal)
    }

    pub fn control_points(&self) -> &[Point3d] {
        &self.points
    }

    pub fn segment_count(&self) -> usize {
        self.points.len() - 1
    }

    /// Evaluate at `u` in `[0, 1]` (clamped).
    pub fn evaluate(&self, u: f64) -> Point3d {
        let n = self.points.len();
        let p = (n - 1) as f64 * u.clamp(0.0, 1.0);
        let mut seg = p.floor() as usize;
        let mut weight = p - seg as f64;
        if seg >= n - 1 {
            seg = n - 2;
            weight = 1.0;
        }

        let p1 = self.points[seg];
        let p2 = self.points[seg + 1];
        let p0 = if seg > 0 {
            self.points[seg - 1]
        } else {
            p1 - (p2 - p1)
        };
        let p3 = if seg + 2 < n {
            self.points[seg + 2]
        } else {
            p2 + (p2 - p1)
        };

        let coords = |f: fn(&Point3d) -> f64| [f(&p0), f(&p1), f(&p2), f(&p3)];
        let xs = coords(|p| p.x);
        let ys = coords(|p| p.y);
        let zs = coords(|p| p.z);

        let cubics = match self.parameterization {
            Parameterization::Uniform => [xs, ys, zs].map(|c| Cubic::uniform(c[0], c[1], c[2], c[3], 0.5)),
            Parameterization::Centripetal | Parameterization::Chordal => {
                let exponent = if self.parameterization == Parameterization::Centripetal {
                    0.25
                } else {
                    0.5
                };
                let knot = |a: &Point3d, b: &Point3d| {
                    let d2 = (*b - *a).dot(&(*b - *a));
                    d2.powf(exponent)
                };
                let mut dt0 = knot(&p0, &p1);
                let mut dt1 = knot(&p1, &p2);
                let mut dt2 = knot(&p2, &p3);
                // Guard against repeated points.
                if dt1 < 1e-4 {
                    dt1 = 1.0;
                }
                if dt0 < 1e-4 {
                    dt0 = dt1;
                }
                if dt2 < 1e-4 {
                    dt2 = dt1;
                }
                [xs, ys, zs].map(|c| Cubic::nonuniform(c, dt0, dt1, dt2))
            }
        };

        Point3d::new(
            cubics[0].eval(weight),
            cubics[1].eval(weight),
            cubics[2].eval(weight),
        )
    }

    /// Unit tangent at `u`, by central difference.
    pub fn tangent(&self, u: f64) -> Vec3 {
        let delta = 1e-4;
        let u0 = (u - delta).max(0.0);
        let u1 = (u + delta).min(1.0);
        (self.evaluate(u1) - self.evaluate(u0)).normalize_or(Vec3::X)
    }

    /// `divisions + 1` evenly spaced samples from start to end.
    pub fn sample(&self, divisions: usize) -> Vec<Point3d> {
        let divisions = divisions.max(1);
        (0..=divisions)
            .map(|i| self.evaluate(i as f64 / divisions as f64))
            .collect()
    }

    pub fn approximate_length(&self, divisions: usize) -> f64 {
        self.sample(divisions)
            .windows(2)
            .map(|w| w[0].distance_to(&w[1]))
            .sum()
    }
}
