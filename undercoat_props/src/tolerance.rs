// Copyright 2025 the Undercoat Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Approximate equality for change detection.
//!
//! Setting a field to a value that is "close enough" to the stored one must
//! not mark anything dirty, otherwise floating point accumulation in callers
//! (fades, tints, opacity ramps) would trigger a recompile every frame.
//!
//! - Colors use a per-channel absolute epsilon close to visual
//!   imperceptibility.
//! - Floats and vectors use a combined absolute + relative test: the absolute
//!   epsilon covers values near zero, the relative epsilon covers large
//!   magnitudes.
//! - Integers and texture handles compare exactly.

use crate::value::{Color, Value, Vec4};

/// Tolerances used to decide whether a new value differs from the stored one.
///
/// # Example
///
/// ```rust
/// use undercoat_props::{Color, Tolerance};
///
/// let tol = Tolerance::DEFAULT;
/// assert!(tol.color_eq(Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.995, 0.0, 0.0)));
/// assert!(!tol.color_eq(Color::rgb(1.0, 0.0, 0.0), Color::rgb(0.9, 0.0, 0.0)));
///
/// assert!(tol.float_eq(1.0, 1.00001));
/// assert!(!tol.float_eq(1.0, 1.001));
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Tolerance {
    /// Absolute per-channel epsilon for colors.
    pub color: f32,
    /// Absolute epsilon for floats and vector components.
    pub abs: f32,
    /// Relative epsilon for floats and vector components.
    pub rel: f32,
}

impl Tolerance {
    /// Default tolerances.
    pub const DEFAULT: Self = Self {
        color: 1e-2,
        abs: 1e-4,
        rel: f32::EPSILON,
    };

    /// Exact comparison for every tag.
    pub const EXACT: Self = Self {
        color: 0.0,
        abs: 0.0,
        rel: 0.0,
    };

    /// Compares two colors channel by channel against the absolute epsilon.
    #[must_use]
    pub fn color_eq(&self, a: Color, b: Color) -> bool {
        a.to_array()
            .into_iter()
            .zip(b.to_array())
            .all(|(a, b)| (b - a).abs() <= self.color)
    }

    /// Compares two floats with the combined absolute and relative test.
    #[must_use]
    pub fn float_eq(&self, a: f32, b: f32) -> bool {
        if a == b {
            return true;
        }

        let diff = (a - b).abs();
        if diff < self.abs {
            return true;
        }

        let (a, b) = (a.abs(), b.abs());
        let largest = if b > a { b } else { a };
        diff <= largest * self.rel
    }

    /// Compares two vectors component by component with [`Self::float_eq`].
    #[must_use]
    pub fn vector_eq(&self, a: Vec4, b: Vec4) -> bool {
        a.to_array()
            .into_iter()
            .zip(b.to_array())
            .all(|(a, b)| self.float_eq(a, b))
    }

    /// Compares two values.
    ///
    /// Values of different tags are never equal.
    #[must_use]
    pub fn value_eq(&self, a: &Value, b: &Value) -> bool {
        match (a, b) {
            (Value::Color(a), Value::Color(b)) => self.color_eq(*a, *b),
            (Value::Float(a), Value::Float(b)) => self.float_eq(*a, *b),
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Texture(a), Value::Texture(b)) => a == b,
            (Value::Vector(a), Value::Vector(b)) => self.vector_eq(*a, *b),
            _ => false,
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::TextureHandle;

    #[test]
    fn color_uses_absolute_channel_epsilon() {
        let tol = Tolerance::DEFAULT;
        let base = Color::new(0.5, 0.5, 0.5, 1.0);
        assert!(tol.color_eq(base, Color::new(0.505, 0.495, 0.5, 1.0)));
        assert!(!tol.color_eq(base, Color::new(0.5, 0.5, 0.5, 0.9)));
    }

    #[test]
    fn float_absolute_epsilon_near_zero() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.float_eq(0.0, 5e-5));
        assert!(tol.float_eq(-5e-5, 5e-6));
        assert!(!tol.float_eq(0.0, 1e-3));
    }

    #[test]
    fn float_relative_epsilon_for_large_values() {
        let tol = Tolerance {
            color: 1e-2,
            abs: 1e-4,
            rel: 1e-3,
        };
        assert!(tol.float_eq(10_000.0, 10_005.0));
        assert!(!tol.float_eq(10_000.0, 10_050.0));
    }

    #[test]
    fn vector_requires_every_component() {
        let tol = Tolerance::DEFAULT;
        let a = Vec4::new(1.0, 2.0, 3.0, 4.0);
        assert!(tol.vector_eq(a, Vec4::new(1.00001, 2.0, 3.0, 4.0)));
        assert!(!tol.vector_eq(a, Vec4::new(1.0, 2.0, 3.0, 4.5)));
    }

    #[test]
    fn exact_tags_and_mismatched_tags() {
        let tol = Tolerance::DEFAULT;
        assert!(tol.value_eq(&Value::Int(3), &Value::Int(3)));
        assert!(!tol.value_eq(&Value::Int(3), &Value::Int(4)));
        assert!(tol.value_eq(
            &Value::Texture(TextureHandle::new(1)),
            &Value::Texture(TextureHandle::new(1))
        ));
        assert!(!tol.value_eq(
            &Value::Texture(TextureHandle::new(1)),
            &Value::Texture(TextureHandle::new(2))
        ));
        assert!(!tol.value_eq(&Value::Int(1), &Value::Float(1.0)));
    }

    #[test]
    fn sign_does_not_matter_for_relative_test() {
        let tol = Tolerance {
            color: 1e-2,
            abs: 1e-4,
            rel: 1e-3,
        };
        assert!(tol.float_eq(-10_000.0, -10_005.0));
        assert!(!tol.float_eq(-10_000.0, 10_000.0));
    }

    #[test]
    fn exact_tolerance_detects_tiny_changes() {
        let tol = Tolerance::EXACT;
        assert!(tol.float_eq(0.25, 0.25));
        assert!(!tol.float_eq(0.25, 0.250_001));
    }
}
