use core::ops::Mul;

use crate::Vec4;

/// Row-major 4×4 matrix.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Mat4 {
    pub data: [[f64; 4]; 4],
}

impl Mat4 {
    #[inline]
    pub const fn new(data: [[f64; 4]; 4]) -> Self {
        Self { data }
    }

    #[inline]
    pub const fn identity() -> Self {
        Self::new([
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[inline]
    pub fn row(&self, index: usize) -> Vec4 {
        debug_assert!(index < 4, "mat4 row index out of range: {index}");
        let r = self.data[index];
        Vec4::new(r[0], r[1], r[2], r[3])
    }

    #[inline]
    pub fn column(&self, index: usize) -> Vec4 {
        debug_assert!(index < 4, "mat4 column index out of range: {index}");
        Vec4::new(
            self.data[0][index],
            self.data[1][index],
            self.data[2][index],
            self.data[3][index],
        )
    }

    #[inline]
    pub fn set_column(&mut self, index: usize, column: Vec4) {
        debug_assert!(index < 4, "mat4 column index out of range: {index}");
        self.data[0][index] = column.x;
        self.data[1][index] = column.y;
        self.data[2][index] = column.z;
        self.data[3][index] = column.w;
    }

    #[inline]
    pub const fn scale(x: f64, y: f64, z: f64) -> Self {
        Self::new([
            [x, 0.0, 0.0, 0.0],
            [0.0, y, 0.0, 0.0],
            [0.0, 0.0, z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    #[inline]
    pub const fn translate(x: f64, y: f64, z: f64) -> Self {
        Self::new([
            [1.0, 0.0, 0.0, x],
            [0.0, 1.0, 0.0, y],
            [0.0, 0.0, 1.0, z],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Rotation by Euler angles (radians) around the X, Y and Z axes,
    /// applied in X-Y-Z order.
    pub fn rotate(x: f64, y: f64, z: f64) -> Self {
        let (sx, cx) = x.sin_cos();
        let (sy, cy) = y.sin_cos();
        let (sz, cz) = z.sin_cos();
        Self::new([
            [
                cy * cz,
                sx * sy * cz - cx * sz,
                cx * sy * cz + sx * sz,
                0.0,
            ],
            [
                cy * sz,
                sx * sy * sz + cx * cz,
                cx * sy * sz - sx * cz,
                0.0,
            ],
            [-sy, sx * cy, cx * cy, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Translate · Rotate · Scale, the usual model matrix.
    pub fn trs(
        translation: (f64, f64, f64),
        rotation: (f64, f64, f64),
        scale: (f64, f64, f64),
    ) -> Self {
        let t = Self::translate(translation.0, translation.1, translation.2);
        let r = Self::rotate(rotation.0, rotation.1, rotation.2);
        let s = Self::scale(scale.0, scale.1, scale.2);
        t * (r * s)
    }

    /// View matrix for a camera at `position` with the given Euler `rotation`
    /// and per-axis zoom; the inverse transform of the camera's own TRS.
    pub fn view(position: (f64, f64, f64), rotation: (f64, f64, f64), zoom: (f64, f64, f64)) -> Self {
        Self::trs(
            (-position.0, -position.1, -position.2),
            (-rotation.0, -rotation.1, -rotation.2),
            zoom,
        )
    }

    /// Maps the axis-aligned box `[min, max]` onto the NDC cube `[-1, 1]³`.
    pub fn orthographic(
        x_min: f64,
        x_max: f64,
        y_min: f64,
        y_max: f64,
        z_min: f64,
        z_max: f64,
    ) -> Self {
        Self::new([
            [
                2.0 / (x_max - x_min),
                0.0,
                0.0,
                -(x_max + x_min) / (x_max - x_min),
            ],
            [
                0.0,
                2.0 / (y_max - y_min),
                0.0,
                -(y_max + y_min) / (y_max - y_min),
            ],
            [
                0.0,
                0.0,
                2.0 / (z_max - z_min),
                -(z_max + z_min) / (z_max - z_min),
            ],
            [0.0, 0.0, 0.0, 1.0],
        ])
    }

    /// Maps the frustum defined by the near-plane rectangle and the
    /// `[z_near, z_far]` range onto the NDC cube. Output `w` is the view-space
    /// depth, which is what the pipeline's perspective divide expects.
    pub fn perspective(
        x_min_near: f64,
        x_max_near: f64,
        y_min_near: f64,
        y_max_near: f64,
        z_near: f64,
        z_far: f64,
    ) -> Self {
        let squash = Self::new([
            [z_near, 0.0, 0.0, 0.0],
            [0.0, z_near, 0.0, 0.0],
            [0.0, 0.0, z_near + z_far, -z_near * z_far],
            [0.0, 0.0, 1.0, 0.0],
        ]);
        let ortho = Self::orthographic(x_min_near, x_max_near, y_min_near, y_max_near, z_near, z_far);
        ortho * squash
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, rhs: Vec4) -> Vec4 {
        Vec4::new(
            self.row(0).dot(rhs),
            self.row(1).dot(rhs),
            self.row(2).dot(rhs),
            self.row(3).dot(rhs),
        )
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = Mat4::default();
        for i in 0..4 {
            out.set_column(i, self * rhs.column(i));
        }
        out
    }
}
