//! Typed uniform values

use crate::foundation::math::{Vec2, Vec3, Vec4, Mat4};

/// A value uploaded to a shader uniform
#[derive(Debug, Clone, PartialEq)]
pub enum UniformValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i32),
    /// Scalar
    Float(f32),
    /// 2-component vector
    Vec2(Vec2),
    /// 3-component vector
    Vec3(Vec3),
    /// 4-component vector
    Vec4(Vec4),
    /// 4x4 matrix
    Mat4(Mat4),
    /// Array of integers
    IntArray(Vec<i32>),
    /// Array of scalars
    FloatArray(Vec<f32>),
    /// Array of 3-component vectors, flattened to `x0 y0 z0 x1 y1 z1 ...`
    Vec3Array(Vec<f32>),
}

impl UniformValue {
    /// Scalar payload, if this is a scalar
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Vector payload, if this is a 3-component vector
    pub fn as_vec3(&self) -> Option<Vec3> {
        match self {
            Self::Vec3(v) => Some(*v),
            _ => None,
        }
    }

    /// Number of array elements (1 for non-array values)
    pub fn element_count(&self) -> usize {
        match self {
            Self::IntArray(values) => values.len(),
            Self::FloatArray(values) => values.len(),
            Self::Vec3Array(values) => values.len() / 3,
            _ => 1,
        }
    }
}

impl From<bool> for UniformValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for UniformValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for UniformValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<Vec2> for UniformValue {
    fn from(value: Vec2) -> Self {
        Self::Vec2(value)
    }
}

impl From<Vec3> for UniformValue {
    fn from(value: Vec3) -> Self {
        Self::Vec3(value)
    }
}

impl From<Vec4> for UniformValue {
    fn from(value: Vec4) -> Self {
        Self::Vec4(value)
    }
}

impl From<Mat4> for UniformValue {
    fn from(value: Mat4) -> Self {
        Self::Mat4(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_count() {
        assert_eq!(UniformValue::Vec3Array(vec![0.0; 9]).element_count(), 3);
        assert_eq!(UniformValue::IntArray(vec![1, 2]).element_count(), 2);
        assert_eq!(UniformValue::from(1.5_f32).element_count(), 1);
    }

    #[test]
    fn test_accessors() {
        assert_eq!(UniformValue::from(2.0_f32).as_float(), Some(2.0));
        assert_eq!(UniformValue::from(Vec3::x()).as_vec3(), Some(Vec3::x()));
        assert_eq!(UniformValue::from(true).as_float(), None);
    }
}
