// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Field values.
//!
//! [`Value`] is a closed sum over the parameter types a field can hold. Every
//! merge and write path matches on it exhaustively; there is no per-field
//! boxing or dynamic dispatch.

use core::fmt;

/// A linear RGBA color.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Color {
    /// Red channel.
    pub r: f32,
    /// Green channel.
    pub g: f32,
    /// Blue channel.
    pub b: f32,
    /// Alpha channel.
    pub a: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const CLEAR: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from its four channels.
    #[must_use]
    #[inline]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque color.
    #[must_use]
    #[inline]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::new(r, g, b, 1.0)
    }

    /// Returns the channels as an array.
    #[must_use]
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "RGBA({:.3}, {:.3}, {:.3}, {:.3})",
            self.r, self.g, self.b, self.a
        )
    }
}

/// A four-component vector.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
pub struct Vec4 {
    /// X component.
    pub x: f32,
    /// Y component.
    pub y: f32,
    /// Z component.
    pub z: f32,
    /// W component.
    pub w: f32,
}

impl Vec4 {
    /// The zero vector.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a vector from its components.
    #[must_use]
    #[inline]
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }

    /// Returns the components as an array.
    #[must_use]
    #[inline]
    pub const fn to_array(self) -> [f32; 4] {
        [self.x, self.y, self.z, self.w]
    }
}

impl fmt::Display for Vec4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {}, {})", self.x, self.y, self.z, self.w)
    }
}

/// An opaque handle to a host texture.
///
/// Handles compare by identity only; two handles are equal iff they refer to
/// the same host object. The crate never looks behind the handle.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(u64);

impl TextureHandle {
    /// Wraps a host-assigned texture identity.
    #[must_use]
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the host-assigned identity.
    #[must_use]
    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

/// The tag of a [`Value`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// [`Value::Color`].
    Color,
    /// [`Value::Float`].
    Float,
    /// [`Value::Int`].
    Int,
    /// [`Value::Texture`].
    Texture,
    /// [`Value::Vector`].
    Vector,
}

impl ValueKind {
    /// Returns a short lowercase name for diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Color => "color",
            Self::Float => "float",
            Self::Int => "int",
            Self::Texture => "texture",
            Self::Vector => "vector",
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A field value.
///
/// A field holds exactly one value of exactly one tag at a time.
///
/// # Example
///
/// ```rust
/// use undercoat_props::{Color, Value, ValueKind};
///
/// let value = Value::from(Color::rgb(1.0, 0.0, 0.0));
/// assert_eq!(value.kind(), ValueKind::Color);
/// assert_eq!(value.as_color(), Some(Color::rgb(1.0, 0.0, 0.0)));
/// assert_eq!(value.as_float(), None);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Value {
    /// An RGBA color.
    Color(Color),
    /// A scalar float.
    Float(f32),
    /// An integer.
    Int(i32),
    /// A texture handle.
    Texture(TextureHandle),
    /// A four-component vector.
    Vector(Vec4),
}

impl Value {
    /// Returns the tag of this value.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ValueKind {
        match self {
            Self::Color(_) => ValueKind::Color,
            Self::Float(_) => ValueKind::Float,
            Self::Int(_) => ValueKind::Int,
            Self::Texture(_) => ValueKind::Texture,
            Self::Vector(_) => ValueKind::Vector,
        }
    }

    /// Returns the color, if this is a color value.
    #[must_use]
    pub const fn as_color(&self) -> Option<Color> {
        match self {
            Self::Color(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns the float, if this is a float value.
    #[must_use]
    pub const fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the integer, if this is an integer value.
    #[must_use]
    pub const fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Returns the texture handle, if this is a texture value.
    #[must_use]
    pub const fn as_texture(&self) -> Option<TextureHandle> {
        match self {
            Self::Texture(t) => Some(*t),
            _ => None,
        }
    }

    /// Returns the vector, if this is a vector value.
    #[must_use]
    pub const fn as_vector(&self) -> Option<Vec4> {
        match self {
            Self::Vector(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Color(c) => c.fmt(f),
            Self::Float(v) => v.fmt(f),
            Self::Int(v) => v.fmt(f),
            Self::Texture(t) => write!(f, "texture#{}", t.raw()),
            Self::Vector(v) => v.fmt(f),
        }
    }
}

impl From<Color> for Value {
    fn from(value: Color) -> Self {
        Self::Color(value)
    }
}

impl From<f32> for Value {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<TextureHandle> for Value {
    fn from(value: TextureHandle) -> Self {
        Self::Texture(value)
    }
}

impl From<Vec4> for Value {
    fn from(value: Vec4) -> Self {
        Self::Vector(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::format;

    #[test]
    fn kinds_match_variants() {
        assert_eq!(Value::from(Color::WHITE).kind(), ValueKind::Color);
        assert_eq!(Value::from(1.5_f32).kind(), ValueKind::Float);
        assert_eq!(Value::from(3_i32).kind(), ValueKind::Int);
        assert_eq!(
            Value::from(TextureHandle::new(9)).kind(),
            ValueKind::Texture
        );
        assert_eq!(Value::from(Vec4::ZERO).kind(), ValueKind::Vector);
    }

    #[test]
    fn accessors_reject_other_tags() {
        let value = Value::Int(7);
        assert_eq!(value.as_int(), Some(7));
        assert_eq!(value.as_float(), None);
        assert_eq!(value.as_color(), None);
        assert_eq!(value.as_texture(), None);
        assert_eq!(value.as_vector(), None);
    }

    #[test]
    fn texture_handles_compare_by_identity() {
        assert_eq!(TextureHandle::new(1), TextureHandle::new(1));
        assert_ne!(TextureHandle::new(1), TextureHandle::new(2));
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(format!("{}", Value::Int(4)), "4");
        assert_eq!(format!("{}", Value::Texture(TextureHandle::new(3))), "texture#3");
        assert_eq!(
            format!("{}", Value::Color(Color::rgb(1.0, 0.5, 0.0))),
            "RGBA(1.000, 0.500, 0.000, 1.000)"
        );
        assert_eq!(ValueKind::Vector.name(), "vector");
    }
}
