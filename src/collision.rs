//! Overlap tests. Pure functions, no state.

/// Axis-aligned box centred on `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
}

impl Circle {
    pub fn new(x: f32, y: f32, radius: f32) -> Self {
        Self { x, y, radius }
    }
}

/// Anything with a collision box.
pub trait Bounds {
    fn bounds(&self) -> Rect;
}

impl Bounds for Rect {
    fn bounds(&self) -> Rect {
        *self
    }
}

/// True when the boxes overlap on both axes.
///
/// Both comparisons are strict, so boxes whose edges coincide exactly do
/// not collide (left at x=100 w=50 and x=150 w=50 → `125 > 125` fails).
/// A zero-sized box strictly inside another one still collides.
pub fn check_collision(a: &Rect, b: &Rect) -> bool {
    a.x - a.width / 2.0 < b.x + b.width / 2.0
        && a.x + a.width / 2.0 > b.x - b.width / 2.0
        && a.y - a.height / 2.0 < b.y + b.height / 2.0
        && a.y + a.height / 2.0 > b.y - b.height / 2.0
}

/// [`check_collision`] over anything with [`Bounds`].
pub fn overlaps(a: &impl Bounds, b: &impl Bounds) -> bool {
    check_collision(&a.bounds(), &b.bounds())
}

/// True when the centre distance is strictly less than the sum of the radii.
pub fn check_circle_collision(a: &Circle, b: &Circle) -> bool {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    (dx * dx + dy * dy).sqrt() < a.radius + b.radius
}
