//! Geometry value types shared across the engine and demo code.
//!
//! Vectors are flat `repr(C)` structs (no layout inheritance across
//! dimensions); widening/narrowing between them goes through explicit
//! `From` conversions. All of them are `Pod` so they can be pushed into a
//! vertex buffer byte-for-byte.

mod shape;
mod vector;

pub use shape::{Shape, Square, Triangle};
pub use vector::{vec2, vec3, vec4, Scalar, Vector2, Vector3, Vector4, Vertex};
