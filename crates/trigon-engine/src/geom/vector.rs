use core::ops::{Add, Div, Mul, Neg, Sub};

use bytemuck::{Pod, Zeroable};

/// Scalar type used throughout the geometry layer.
pub type Scalar = f32;

/// Square root usable in const contexts.
///
/// `f32::sqrt` is not a `const fn`; Newton-Raphson converges to the fixed
/// point in a handful of iterations, so `length()` can fold at compile time.
const fn sqrt_newton(x: f64) -> f64 {
    if x < 0.0 || x == f64::INFINITY || x != x {
        return f64::NAN;
    }
    let mut current = x;
    let mut previous = 0.0;
    while current != previous {
        previous = current;
        current = 0.5 * (current + x / current);
    }
    current
}

const fn const_sqrt(x: f32) -> f32 {
    sqrt_newton(x as f64) as f32
}

/// 2D vector.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector2 {
    pub x: f32,
    pub y: f32,
}

/// 3D vector.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// 4D vector.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vector4 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

/// A single point of per-vertex data: three floats.
pub type Vertex = Vector3;

impl Vector2 {
    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0 }
    }

    #[inline]
    pub const fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    #[inline]
    pub const fn length(self) -> f32 {
        const_sqrt(self.length_squared())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Vector3 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0 }
    }

    #[inline]
    pub const fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z
    }

    #[inline]
    pub const fn length(self) -> f32 {
        const_sqrt(self.length_squared())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Vector4 {
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    #[inline]
    pub const fn zero() -> Self {
        Self { x: 0.0, y: 0.0, z: 0.0, w: 0.0 }
    }

    #[inline]
    pub const fn length_squared(self) -> f32 {
        self.x * self.x + self.y * self.y + self.z * self.z + self.w * self.w
    }

    #[inline]
    pub const fn length(self) -> f32 {
        const_sqrt(self.length_squared())
    }

    #[inline]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite() && self.w.is_finite()
    }
}

/// Shorthand constructors.
#[inline]
pub const fn vec2(x: f32, y: f32) -> Vector2 {
    Vector2::new(x, y)
}

#[inline]
pub const fn vec3(x: f32, y: f32, z: f32) -> Vector3 {
    Vector3::new(x, y, z)
}

#[inline]
pub const fn vec4(x: f32, y: f32, z: f32, w: f32) -> Vector4 {
    Vector4::new(x, y, z, w)
}

// Componentwise operators. Scalar operands apply to every component.
macro_rules! componentwise_ops {
    ($ty:ident { $($field:ident),+ }) => {
        impl Add for $ty {
            type Output = $ty;
            #[inline]
            fn add(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field + rhs.$field),+ }
            }
        }

        impl Sub for $ty {
            type Output = $ty;
            #[inline]
            fn sub(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field - rhs.$field),+ }
            }
        }

        impl Mul for $ty {
            type Output = $ty;
            #[inline]
            fn mul(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field * rhs.$field),+ }
            }
        }

        impl Div for $ty {
            type Output = $ty;
            #[inline]
            fn div(self, rhs: $ty) -> $ty {
                $ty { $($field: self.$field / rhs.$field),+ }
            }
        }

        impl Add<Scalar> for $ty {
            type Output = $ty;
            #[inline]
            fn add(self, rhs: Scalar) -> $ty {
                $ty { $($field: self.$field + rhs),+ }
            }
        }

        impl Sub<Scalar> for $ty {
            type Output = $ty;
            #[inline]
            fn sub(self, rhs: Scalar) -> $ty {
                $ty { $($field: self.$field - rhs),+ }
            }
        }

        impl Mul<Scalar> for $ty {
            type Output = $ty;
            #[inline]
            fn mul(self, rhs: Scalar) -> $ty {
                $ty { $($field: self.$field * rhs),+ }
            }
        }

        impl Div<Scalar> for $ty {
            type Output = $ty;
            #[inline]
            fn div(self, rhs: Scalar) -> $ty {
                $ty { $($field: self.$field / rhs),+ }
            }
        }

        impl Neg for $ty {
            type Output = $ty;
            #[inline]
            fn neg(self) -> $ty {
                $ty { $($field: -self.$field),+ }
            }
        }
    };
}

componentwise_ops!(Vector2 { x, y });
componentwise_ops!(Vector3 { x, y, z });
componentwise_ops!(Vector4 { x, y, z, w });

// Widening conversions fill the extra components with zero; narrowing
// conversions truncate.

impl From<Vector2> for Vector3 {
    #[inline]
    fn from(v: Vector2) -> Self {
        Vector3::new(v.x, v.y, 0.0)
    }
}

impl From<Vector2> for Vector4 {
    #[inline]
    fn from(v: Vector2) -> Self {
        Vector4::new(v.x, v.y, 0.0, 0.0)
    }
}

impl From<Vector3> for Vector4 {
    #[inline]
    fn from(v: Vector3) -> Self {
        Vector4::new(v.x, v.y, v.z, 0.0)
    }
}

impl From<Vector3> for Vector2 {
    #[inline]
    fn from(v: Vector3) -> Self {
        Vector2::new(v.x, v.y)
    }
}

impl From<Vector4> for Vector3 {
    #[inline]
    fn from(v: Vector4) -> Self {
        Vector3::new(v.x, v.y, v.z)
    }
}

impl From<Vector4> for Vector2 {
    #[inline]
    fn from(v: Vector4) -> Self {
        Vector2::new(v.x, v.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── length ────────────────────────────────────────────────────────────

    #[test]
    fn length_of_3_4_0_is_5() {
        let v = Vector3::new(3.0, 4.0, 0.0);
        assert!((v.length() - 5.0).abs() < 1e-6);
    }

    #[test]
    fn length_folds_in_const_context() {
        const LEN: f32 = Vector3::new(3.0, 4.0, 0.0).length();
        assert!((LEN - 5.0).abs() < 1e-6);
    }

    #[test]
    fn length_of_zero_vector() {
        assert_eq!(Vector3::zero().length(), 0.0);
        assert_eq!(Vector2::zero().length(), 0.0);
    }

    #[test]
    fn length_squared() {
        assert_eq!(Vector2::new(3.0, 4.0).length_squared(), 25.0);
        assert_eq!(Vector4::new(1.0, 2.0, 2.0, 4.0).length_squared(), 25.0);
    }

    #[test]
    fn const_sqrt_matches_std() {
        for x in [0.25_f32, 1.0, 2.0, 9.0, 144.0, 1e6] {
            assert!((const_sqrt(x) - x.sqrt()).abs() < 1e-3, "sqrt({x})");
        }
    }

    // ── arithmetic ────────────────────────────────────────────────────────

    #[test]
    fn componentwise_vector_ops() {
        let a = vec3(1.0, 2.0, 3.0);
        let b = vec3(4.0, 5.0, 6.0);
        assert_eq!(a + b, vec3(5.0, 7.0, 9.0));
        assert_eq!(b - a, vec3(3.0, 3.0, 3.0));
        assert_eq!(a * b, vec3(4.0, 10.0, 18.0));
        assert_eq!(b / a, vec3(4.0, 2.5, 2.0));
    }

    #[test]
    fn scalar_ops_touch_every_component() {
        let v = vec2(1.0, 2.0);
        assert_eq!(v + 1.0, vec2(2.0, 3.0));
        assert_eq!(v - 1.0, vec2(0.0, 1.0));
        assert_eq!(v * 2.0, vec2(2.0, 4.0));
        assert_eq!(v / 2.0, vec2(0.5, 1.0));
    }

    #[test]
    fn negation() {
        assert_eq!(-vec3(1.0, -2.0, 3.0), vec3(-1.0, 2.0, -3.0));
        assert_eq!(-vec4(1.0, 2.0, 3.0, 4.0), vec4(-1.0, -2.0, -3.0, -4.0));
    }

    // ── conversions ───────────────────────────────────────────────────────

    #[test]
    fn widening_fills_with_zero() {
        assert_eq!(Vector3::from(vec2(1.0, 2.0)), vec3(1.0, 2.0, 0.0));
        assert_eq!(Vector4::from(vec2(1.0, 2.0)), vec4(1.0, 2.0, 0.0, 0.0));
        assert_eq!(Vector4::from(vec3(1.0, 2.0, 3.0)), vec4(1.0, 2.0, 3.0, 0.0));
    }

    #[test]
    fn narrowing_truncates() {
        assert_eq!(Vector2::from(vec3(1.0, 2.0, 3.0)), vec2(1.0, 2.0));
        assert_eq!(Vector3::from(vec4(1.0, 2.0, 3.0, 4.0)), vec3(1.0, 2.0, 3.0));
        assert_eq!(Vector2::from(vec4(1.0, 2.0, 3.0, 4.0)), vec2(1.0, 2.0));
    }

    // ── byte layout ───────────────────────────────────────────────────────

    #[test]
    fn vertex_is_three_tightly_packed_floats() {
        assert_eq!(std::mem::size_of::<Vertex>(), 12);
        let v = Vertex::new(1.0, 0.0, 0.0);
        let bytes = bytemuck::bytes_of(&v);
        let floats: &[f32] = bytemuck::cast_slice(bytes);
        assert_eq!(floats, &[1.0, 0.0, 0.0]);
    }
}
