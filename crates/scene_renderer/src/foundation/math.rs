//! Math utilities and types
//!
//! Provides the fundamental math types used by the renderer. All matrices use
//! column vectors (`world = parent * local`) and OpenGL clip conventions
//! (NDC depth in `[-1, 1]`).

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;

    /// Radians to degrees conversion factor
    pub const RAD_TO_DEG: f32 = 180.0 / PI;
}

/// Math utility functions
pub mod utils {
    use super::{constants, Vec3};

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Convert radians to degrees
    pub fn rad_to_deg(radians: f32) -> f32 {
        radians * constants::RAD_TO_DEG
    }

    /// Clamp every component of a color to `[0, 1]`
    pub fn saturate(color: Vec3) -> Vec3 {
        color.map(|c| c.clamp(0.0, 1.0))
    }

    /// Convert a `[x, y, z]` array into a vector
    pub fn vec3(values: [f32; 3]) -> Vec3 {
        Vec3::new(values[0], values[1], values[2])
    }
}

/// Extension trait for Mat4 with additional convenience methods
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a perspective projection matrix (`fov_y` in radians)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix
    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4;

    /// Create a right-handed look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Translation part of an affine transform
    fn translation(&self) -> Vec3;

    /// Local +Z axis of an affine transform expressed in world space
    fn front_vector(&self) -> Vec3;

    /// Rebuild the rotation basis so the local +Z axis points along `front`,
    /// keeping translation and per-axis scale.
    fn set_front_and_orthonormalize(&mut self, front: Vec3);

    /// Post-multiply a translation (moves along the local axes)
    fn translate_local(&mut self, offset: Vec3);
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    // `Perspective3`/`Orthographic3` assert on degenerate bounds, these must not
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let f = 1.0 / (fov_y * 0.5).tan();
        let mut m = Mat4::zeros();
        m[(0, 0)] = f / aspect;
        m[(1, 1)] = f;
        m[(2, 2)] = (far + near) / (near - far);
        m[(2, 3)] = 2.0 * far * near / (near - far);
        m[(3, 2)] = -1.0;
        m
    }

    fn orthographic(left: f32, right: f32, bottom: f32, top: f32, near: f32, far: f32) -> Mat4 {
        let mut m = Mat4::identity();
        m[(0, 0)] = 2.0 / (right - left);
        m[(1, 1)] = 2.0 / (top - bottom);
        m[(2, 2)] = -2.0 / (far - near);
        m[(0, 3)] = -(right + left) / (right - left);
        m[(1, 3)] = -(top + bottom) / (top - bottom);
        m[(2, 3)] = -(far + near) / (far - near);
        m
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        Mat4::look_at_rh(&Point3::from(eye), &Point3::from(target), &up)
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }

    fn front_vector(&self) -> Vec3 {
        Vec3::new(self[(0, 2)], self[(1, 2)], self[(2, 2)])
    }

    fn set_front_and_orthonormalize(&mut self, front: Vec3) {
        let Some(front) = front.try_normalize(f32::EPSILON) else {
            return;
        };
        // Pick a helper up axis that is not parallel to the new front
        let helper = if front.y.abs() > 0.999 { Vec3::z() } else { Vec3::y() };
        let right = helper.cross(&front).normalize();
        let up = front.cross(&right);

        let scale = Vec3::new(
            self.fixed_view::<3, 1>(0, 0).norm(),
            self.fixed_view::<3, 1>(0, 1).norm(),
            self.fixed_view::<3, 1>(0, 2).norm(),
        );
        self.fixed_view_mut::<3, 1>(0, 0).copy_from(&(right * scale.x));
        self.fixed_view_mut::<3, 1>(0, 1).copy_from(&(up * scale.y));
        self.fixed_view_mut::<3, 1>(0, 2).copy_from(&(front * scale.z));
    }

    fn translate_local(&mut self, offset: Vec3) {
        *self *= Mat4::new_translation(&offset);
    }
}
