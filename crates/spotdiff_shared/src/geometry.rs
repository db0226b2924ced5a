//! 2D geometry for click classification.
//!
//! Three coordinate spaces are involved:
//!
//! - **client**: raw pointer position reported by the display
//! - **rendered**: client position relative to the image element's top-left
//! - **native**: rendered position scaled to the image's natural resolution
//!
//! Targets are always expressed in native space. Marks are expressed as a
//! percentage of the rendered element so they survive resizes.

use serde::{Deserialize, Serialize};
use std::ops::Sub;
use thiserror::Error;

/// 2D point.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// X component
    pub x: f64,
    /// Y component
    pub y: f64,
}

impl Point {
    /// Creates a new point
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Origin
    pub const ZERO: Self = Self::new(0.0, 0.0);

    /// Distance squared (avoids sqrt)
    #[must_use]
    pub fn distance_squared(self, other: Self) -> f64 {
        let d = self - other;
        d.x * d.x + d.y * d.y
    }

    /// Distance to another point
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Returns true if `other` lies strictly inside the circle of `radius` around `self`.
    #[inline]
    #[must_use]
    pub fn within(self, other: Self, radius: f64) -> bool {
        self.distance_squared(other) < radius * radius
    }

    /// Returns true if both components are finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Sub for Point {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Axis-aligned bounding rectangle of a rendered element, in client space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Width
    pub width: f64,
    /// Height
    pub height: f64,
}

impl Rect {
    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    /// True when the rectangle has no usable area.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        !(self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0)
    }
}

/// A pointer-down event as reported by the image display.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PointerDown {
    /// Client X
    pub client_x: f64,
    /// Client Y
    pub client_y: f64,
}

impl PointerDown {
    /// Creates a new pointer event.
    #[must_use]
    pub const fn new(client_x: f64, client_y: f64) -> Self {
        Self { client_x, client_y }
    }
}

/// Geometry could not be used for conversion.
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum GeometryError {
    /// Rendered element has zero, negative or non-finite size.
    #[error("degenerate rendered rectangle: {width}x{height}")]
    DegenerateRect {
        /// Rendered width
        width: f64,
        /// Rendered height
        height: f64,
    },

    /// Image reports zero, negative or non-finite natural size.
    #[error("degenerate natural image size: {width}x{height}")]
    DegenerateImage {
        /// Natural width
        width: f64,
        /// Natural height
        height: f64,
    },

    /// Pointer coordinates are not finite.
    #[error("non-finite pointer coordinates")]
    NonFinitePointer,
}

/// Everything needed to map a click on a rendered image into native space.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ImageGeometry {
    /// Bounding rectangle of the rendered image element.
    pub rect: Rect,
    /// Natural (native) width of the image.
    pub natural_width: f64,
    /// Natural (native) height of the image.
    pub natural_height: f64,
}

impl ImageGeometry {
    /// Creates geometry for an image rendered at `rect`.
    #[must_use]
    pub const fn new(rect: Rect, natural_width: f64, natural_height: f64) -> Self {
        Self { rect, natural_width, natural_height }
    }

    /// Geometry where rendered size equals natural size, anchored at the origin.
    #[must_use]
    pub const fn identity(width: f64, height: f64) -> Self {
        Self::new(Rect::new(0.0, 0.0, width, height), width, height)
    }

    fn validate(&self, pointer: PointerDown) -> Result<(), GeometryError> {
        if self.rect.is_degenerate() {
            return Err(GeometryError::DegenerateRect {
                width: self.rect.width,
                height: self.rect.height,
            });
        }
        let natural_ok = self.natural_width.is_finite()
            && self.natural_height.is_finite()
            && self.natural_width > 0.0
            && self.natural_height > 0.0;
        if !natural_ok {
            return Err(GeometryError::DegenerateImage {
                width: self.natural_width,
                height: self.natural_height,
            });
        }
        if !(pointer.client_x.is_finite() && pointer.client_y.is_finite()) {
            return Err(GeometryError::NonFinitePointer);
        }
        Ok(())
    }

    /// Pointer position relative to the rendered element's top-left corner.
    fn rendered(&self, pointer: PointerDown) -> Point {
        Point::new(pointer.client_x - self.rect.left, pointer.client_y - self.rect.top)
    }

    /// Converts a pointer position to native image coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when the rectangle or natural size is degenerate.
    pub fn to_native(&self, pointer: PointerDown) -> Result<Point, GeometryError> {
        self.validate(pointer)?;
        let p = self.rendered(pointer);
        let x_ratio = self.natural_width / self.rect.width;
        let y_ratio = self.natural_height / self.rect.height;
        Ok(Point::new(p.x * x_ratio, p.y * y_ratio))
    }

    /// Converts a pointer position to percentage-of-rendered-element coordinates.
    ///
    /// # Errors
    ///
    /// Returns an error when the rectangle or natural size is degenerate.
    pub fn to_percent(&self, pointer: PointerDown) -> Result<Point, GeometryError> {
        self.validate(pointer)?;
        let p = self.rendered(pointer);
        Ok(Point::new(p.x / self.rect.width * 100.0, p.y / self.rect.height * 100.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_is_strict() {
        let a = Point::new(0.0, 0.0);
        assert!(a.within(Point::new(29.9, 0.0), 30.0));
        assert!(!a.within(Point::new(30.0, 0.0), 30.0));
    }

    #[test]
    fn test_scaled_conversion() {
        // 1000x500 image drawn at half size, offset by (10, 20)
        let geo = ImageGeometry::new(Rect::new(10.0, 20.0, 500.0, 250.0), 1000.0, 500.0);
        let native = geo.to_native(PointerDown::new(60.0, 70.0)).unwrap();
        assert_eq!(native, Point::new(100.0, 100.0));

        let pct = geo.to_percent(PointerDown::new(260.0, 145.0)).unwrap();
        assert_eq!(pct, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_zero_rect_rejected() {
        let geo = ImageGeometry::new(Rect::new(0.0, 0.0, 0.0, 100.0), 800.0, 600.0);
        assert!(matches!(
            geo.to_native(PointerDown::new(1.0, 1.0)),
            Err(GeometryError::DegenerateRect { .. })
        ));
    }

    #[test]
    fn test_zero_natural_size_rejected() {
        let geo = ImageGeometry::new(Rect::new(0.0, 0.0, 100.0, 100.0), 0.0, 600.0);
        assert!(matches!(
            geo.to_percent(PointerDown::new(1.0, 1.0)),
            Err(GeometryError::DegenerateImage { .. })
        ));
    }

    #[test]
    fn test_nan_pointer_rejected() {
        let geo = ImageGeometry::identity(100.0, 100.0);
        assert_eq!(
            geo.to_native(PointerDown::new(f64::NAN, 1.0)),
            Err(GeometryError::NonFinitePointer)
        );
    }
}
