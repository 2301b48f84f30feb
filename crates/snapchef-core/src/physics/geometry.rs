//! Screen-space geometry. The y axis points down, as on screen.

use std::ops::{Add, AddAssign, Mul};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;

    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

/// Axis-aligned rectangle; `(x, y)` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn min_x(&self) -> f64 {
        self.x
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge.
    pub fn min_y(&self) -> f64 {
        self.y
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Whether `[left, right]` overlaps this rectangle horizontally.
    pub fn overlaps_horizontally(&self, left: f64, right: f64) -> bool {
        right >= self.min_x() && left <= self.max_x()
    }
}

impl std::str::FromStr for Rect {
    type Err = String;

    /// Parse `x,y,width,height`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|e| format!("invalid rect '{s}': {e}"))?;
        match parts.as_slice() {
            [x, y, w, h] if *w >= 0.0 && *h >= 0.0 => Ok(Rect::new(*x, *y, *w, *h)),
            [_, _, _, _] => Err(format!("rect '{s}' has a negative size")),
            _ => Err(format!("rect '{s}' must be x,y,width,height")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_overlap_includes_edges() {
        let rect = Rect::new(100.0, 400.0, 200.0, 50.0);
        assert!(rect.overlaps_horizontally(80.0, 100.0));
        assert!(rect.overlaps_horizontally(150.0, 170.0));
        assert!(rect.overlaps_horizontally(300.0, 320.0));
        assert!(!rect.overlaps_horizontally(301.0, 330.0));
        assert!(!rect.overlaps_horizontally(40.0, 99.0));
    }

    #[test]
    fn parses_rect_from_cli_form() {
        let rect: Rect = "20, 600, 335, 56".parse().unwrap();
        assert_eq!(rect, Rect::new(20.0, 600.0, 335.0, 56.0));
        assert!("1,2,3".parse::<Rect>().is_err());
        assert!("1,2,-3,4".parse::<Rect>().is_err());
        assert!("a,b,c,d".parse::<Rect>().is_err());
    }

    #[test]
    fn vector_math() {
        let mut v = Vec2::new(1.0, 2.0);
        v += Vec2::new(0.5, -1.0) * 2.0;
        assert_eq!(v, Vec2::new(2.0, 0.0));
    }
}
