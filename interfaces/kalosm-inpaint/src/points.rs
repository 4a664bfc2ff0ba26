use image::{Rgb, RgbImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;

use crate::CanonicalImage;

/// A click in canonical image coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal pixel offset from the left edge.
    pub x: u32,
    /// Vertical pixel offset from the top edge.
    pub y: u32,
}

impl Point {
    /// Create a new point.
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

impl From<(u32, u32)> for Point {
    fn from((x, y): (u32, u32)) -> Self {
        Self { x, y }
    }
}

/// The ordered clicks of one session.
///
/// Points can only be appended; the set is cleared as a whole when the session ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PointSet {
    points: Vec<Point>,
}

impl PointSet {
    /// Create an empty point set.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    /// The points in click order.
    pub fn as_slice(&self) -> &[Point] {
        &self.points
    }

    /// Iterate the points in click order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// The number of clicks recorded.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Returns true if no click was recorded.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

impl<'a> IntoIterator for &'a PointSet {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// How click markers are drawn on the preview image.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MarkerStyle {
    /// Marker color as RGB.
    pub color: [u8; 3],
    /// Distance from the center to the end of each arm.
    pub size: u32,
    /// Stroke width of each arm.
    pub width: u32,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            color: [0, 128, 0],
            size: 10,
            width: 5,
        }
    }
}

impl MarkerStyle {
    /// Draw a cross at every point on a copy of `image`.
    pub fn draw(&self, image: &CanonicalImage, points: &PointSet) -> RgbImage {
        let mut canvas = image.as_rgb().clone();
        for point in points {
            self.draw_cross(&mut canvas, *point);
        }
        canvas
    }

    fn draw_cross(&self, canvas: &mut RgbImage, point: Point) {
        let half = self.width / 2;
        let (long, short) = (2 * self.size + 1, 2 * half + 1);
        let (size, half) = (self.size as i32, half as i32);
        let (x, y) = (point.x as i32, point.y as i32);
        let color = Rgb(self.color);
        // horizontal arm
        draw_filled_rect_mut(canvas, Rect::at(x - size, y - half).of_size(long, short), color);
        // vertical arm
        draw_filled_rect_mut(canvas, Rect::at(x - half, y - size).of_size(short, long), color);
    }
}
