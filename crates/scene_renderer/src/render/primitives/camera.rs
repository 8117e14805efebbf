//! # 3D Camera System
//!
//! Camera abstraction shared by the main view and every light's shadow view.
//!
//! ## Design Principles
//! - **Library-agnostic**: No graphics API dependencies in camera math
//! - **On-demand matrices**: View and projection are derived from the current
//!   parameters on every call, so a camera can never hand out a stale matrix
//! - **OpenGL clip conventions**: Right-handed view space, NDC depth in [-1, 1]

use crate::foundation::math::{utils, Mat4, Mat4Ext, Vec3};
use crate::scene::scene_graph::Frustum;

/// Projection model of a camera
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection
    Perspective {
        /// Vertical field of view in radians
        fov: f32,
        /// Aspect ratio (width / height)
        aspect: f32,
    },
    /// Orthographic projection given by its view-space bounds
    Orthographic {
        /// Left bound
        left: f32,
        /// Right bound
        right: f32,
        /// Bottom bound
        bottom: f32,
        /// Top bound
        top: f32,
    },
}

/// 3D Camera for perspective and orthographic projections
///
/// Represents a camera in 3D space with eye position, look-at point, up
/// vector and projection parameters.
///
/// # Coordinate System
/// Uses standard right-handed Y-up coordinates in view space:
/// - X+ = Right
/// - Y+ = Up
/// - Z- = Forward (the camera looks down -Z)
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Camera position in world space
    pub eye: Vec3,

    /// Point the camera is looking at in world space
    pub center: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection model and its shape parameters
    pub projection: Projection,

    /// Distance to near clipping plane (may be negative for orthographic)
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,
}

impl Camera {
    /// Create a new perspective camera with standard Y-up orientation
    ///
    /// # Arguments
    /// * `eye` - Camera position in world space
    /// * `fov_degrees` - Field of view angle in degrees (converted to radians internally)
    /// * `aspect` - Aspect ratio (width / height) of the viewport
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    ///
    /// # Example
    /// ```rust
    /// use scene_renderer::foundation::math::Vec3;
    /// use scene_renderer::render::primitives::Camera;
    ///
    /// let camera = Camera::perspective(
    ///     Vec3::new(0.0, 2.0, 5.0),  // Position 5 units back, 2 up
    ///     60.0,                       // 60-degree field of view
    ///     16.0 / 9.0,                 // Widescreen aspect ratio
    ///     0.1,                        // Near plane at 10cm
    ///     100.0,                      // Far plane at 100 meters
    /// );
    /// assert_eq!(camera.center, Vec3::zeros());
    /// ```
    ///
    /// The camera looks at the origin with +Y up until [`Camera::look_at`] is called.
    pub fn perspective(eye: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            eye,
            center: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective {
                fov: utils::deg_to_rad(fov_degrees),
                aspect,
            },
            near,
            far,
        }
    }

    /// Switch to a perspective projection
    ///
    /// `fov` is the vertical field of view in radians.
    pub fn set_perspective(&mut self, fov: f32, aspect: f32, near: f32, far: f32) {
        self.projection = Projection::Perspective { fov, aspect };
        self.near = near;
        self.far = far;
    }

    /// Switch to an orthographic projection
    pub fn set_orthographic(
        &mut self,
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    ) {
        self.projection = Projection::Orthographic { left, right, bottom, top };
        self.near = near;
        self.far = far;
    }

    /// Place the camera at `eye`, looking at `center`, with `up` as the up hint
    ///
    /// The up vector doesn't need to be perpendicular to the view direction;
    /// the view matrix orthonormalizes the basis.
    pub fn look_at(&mut self, eye: Vec3, center: Vec3, up: Vec3) {
        self.eye = eye;
        self.center = center;
        self.up = up;
        log::trace!("Camera look_at updated - eye: {eye:?}, center: {center:?}, up: {up:?}");
    }

    /// Translate eye and look-at point together
    pub fn move_by(&mut self, delta: Vec3) {
        self.eye += delta;
        self.center += delta;
    }

    /// Normalized viewing direction
    pub fn front(&self) -> Vec3 {
        (self.center - self.eye).normalize()
    }

    /// Generate view matrix for world-to-camera space transformation
    pub fn get_view_matrix(&self) -> Mat4 {
        Mat4::look_at(self.eye, self.center, self.up)
    }

    /// Generate the projection matrix for the current projection model
    pub fn get_projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov, aspect } => {
                Mat4::perspective(fov, aspect, self.near, self.far)
            }
            Projection::Orthographic { left, right, bottom, top } => {
                Mat4::orthographic(left, right, bottom, top, self.near, self.far)
            }
        }
    }

    /// Generate combined view-projection matrix
    ///
    /// For rendering individual objects, multiply this result by the model
    /// matrix: `Final = ViewProjection × Model × Vertex`
    pub fn get_view_projection_matrix(&self) -> Mat4 {
        self.get_projection_matrix() * self.get_view_matrix()
    }

    /// Inverse view-projection, used to reconstruct world positions from depth
    ///
    /// Returns `None` when the matrix is singular.
    pub fn get_inverse_view_projection_matrix(&self) -> Option<Mat4> {
        self.get_view_projection_matrix().try_inverse()
    }

    /// Frustum planes of the current view-projection
    pub fn frustum(&self) -> Frustum {
        Frustum::from_matrix(&self.get_view_projection_matrix())
    }

    /// Test whether a world-space box (center + half-size) overlaps the view
    pub fn test_box_in_frustum(&self, center: Vec3, half_size: Vec3) -> bool {
        self.frustum().intersects_box(center, half_size)
    }
}

impl Default for Camera {
    /// Create a default perspective camera with sensible settings
    ///
    /// # Default Configuration
    /// - Eye: (0, 3, 3) - Above and behind origin
    /// - Center: (0, 0, 0) - Looking at origin
    /// - Up: (0, 1, 0) - Standard Y-up orientation
    /// - FOV: 45 degrees
    /// - Aspect: 16:9
    /// - Near / far: 0.1 / 1000.0
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 3.0, 3.0),
            center: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective {
                fov: std::f32::consts::FRAC_PI_4,
                aspect: 16.0 / 9.0,
            },
            near: 0.1,
            far: 1000.0,
        }
    }
}
