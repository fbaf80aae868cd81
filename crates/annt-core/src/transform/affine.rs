//! 2x3 affine matrices in image coordinates.
//!
//! Points are column vectors `(x, y, 1)`, with x to the right and y down:
//! ```text
//! | x' |   | m00 m01 m02 |   | x |
//! | y' | = | m10 m11 m12 | * | y |
//!                            | 1 |
//! ```

/// A 2D affine transform stored as the top two rows of a 3x3 matrix.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Affine2 {
    pub m: [[f64; 3]; 2],
}

impl Default for Affine2 {
    fn default() -> Self {
        Self::identity()
    }
}

impl Affine2 {
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
        }
    }

    /// Rotation about `center` by `angle_degrees`, then uniform `scale`.
    ///
    /// Positive angles rotate counter-clockwise as seen on screen (y down):
    /// ```text
    /// | a   b  (1-a)*cx - b*cy |
    /// | -b  a  b*cx + (1-a)*cy |
    /// ```
    /// with `a = scale * cos(angle)` and `b = scale * sin(angle)`.
    pub fn rotation(center: (f64, f64), angle_degrees: f64, scale: f64) -> Self {
        let angle = angle_degrees.to_radians();
        let a = scale * angle.cos();
        let b = scale * angle.sin();
        let (cx, cy) = center;

        Self {
            m: [
                [a, b, (1.0 - a) * cx - b * cy],
                [-b, a, b * cx + (1.0 - a) * cy],
            ],
        }
    }

    /// This transform followed by a translation of `(dx, dy)`.
    pub fn translated(mut self, dx: f64, dy: f64) -> Self {
        self.m[0][2] += dx;
        self.m[1][2] += dy;
        self
    }

    /// Map a point through the transform.
    #[inline]
    pub fn apply(&self, (x, y): (f64, f64)) -> (f64, f64) {
        let m = &self.m;
        (
            m[0][0] * x + m[0][1] * y + m[0][2],
            m[1][0] * x + m[1][1] * y + m[1][2],
        )
    }

    /// This transform followed by `next`.
    pub fn then(&self, next: &Affine2) -> Affine2 {
        let a = &self.m;
        let b = &next.m;
        let mut out = [[0.0; 3]; 2];
        for (row, out_row) in out.iter_mut().enumerate() {
            for col in 0..3 {
                out_row[col] = b[row][0] * a[0][col] + b[row][1] * a[1][col];
            }
            out_row[2] += b[row][2];
        }
        Affine2 { m: out }
    }

    /// Inverse transform, or `None` when the linear part is singular.
    pub fn inverse(&self) -> Option<Affine2> {
        let [[a, b, tx], [c, d, ty]] = self.m;
        let det = a * d - b * c;
        if det.abs() < f64::EPSILON {
            return None;
        }
        let inv_det = 1.0 / det;
        let (ia, ib) = (d * inv_det, -b * inv_det);
        let (ic, id) = (-c * inv_det, a * inv_det);

        Some(Affine2 {
            m: [
                [ia, ib, -(ia * tx + ib * ty)],
                [ic, id, -(ic * tx + id * ty)],
            ],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_point_near(actual: (f64, f64), expected: (f64, f64)) {
        assert!(
            (actual.0 - expected.0).abs() < 1e-9 && (actual.1 - expected.1).abs() < 1e-9,
            "expected {:?}, got {:?}",
            expected,
            actual
        );
    }

    #[test]
    fn test_identity() {
        let m = Affine2::identity();
        assert_eq!(m.apply((3.5, -2.0)), (3.5, -2.0));
    }

    #[test]
    fn test_zero_rotation_is_identity() {
        let m = Affine2::rotation((50.0, 100.0), 0.0, 1.0);
        assert_eq!(m, Affine2::identity());
    }

    #[test]
    fn test_rotation_keeps_center() {
        let m = Affine2::rotation((50.0, 25.0), 33.0, 1.0);
        assert_point_near(m.apply((50.0, 25.0)), (50.0, 25.0));
    }

    #[test]
    fn test_quarter_turn_is_counter_clockwise() {
        // A point right of the center moves above it (y down)
        let m = Affine2::rotation((0.0, 0.0), 90.0, 1.0);
        assert_point_near(m.apply((10.0, 0.0)), (0.0, -10.0));
    }

    #[test]
    fn test_scale() {
        let m = Affine2::rotation((0.0, 0.0), 0.0, 2.0);
        assert_point_near(m.apply((3.0, 4.0)), (6.0, 8.0));
    }

    #[test]
    fn test_translated() {
        let m = Affine2::identity().translated(5.0, -3.0);
        assert_eq!(m.apply((1.0, 1.0)), (6.0, -2.0));
    }

    #[test]
    fn test_then_composes_in_order() {
        let rotate = Affine2::rotation((0.0, 0.0), 90.0, 1.0);
        let shift = Affine2::identity().translated(10.0, 0.0);

        // Rotate first, then shift
        let m = rotate.then(&shift);
        assert_point_near(m.apply((1.0, 0.0)), (10.0, -1.0));

        // Shift first, then rotate
        let m = shift.then(&rotate);
        assert_point_near(m.apply((1.0, 0.0)), (0.0, -11.0));
    }

    #[test]
    fn test_inverse_round_trip() {
        let m = Affine2::rotation((40.0, 30.0), 27.0, 1.0).translated(12.0, -7.0);
        let inv = m.inverse().unwrap();

        let p = (13.0, 71.0);
        assert_point_near(inv.apply(m.apply(p)), p);
        assert_point_near(m.then(&inv).apply(p), p);
    }

    #[test]
    fn test_singular_has_no_inverse() {
        let m = Affine2::rotation((0.0, 0.0), 45.0, 0.0);
        assert!(m.inverse().is_none());
    }
}
