//! Axial hex coordinates and the arithmetic built on top of them.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Six neighbour directions in fixed clockwise order starting at East.
/// This order is load-bearing: ring()/spiral() and any code that needs
/// deterministic iteration over neighbours depends on it.
pub const HEX_DIRECTIONS: [(i32, i32); 6] = [
    (1, 0),   // E
    (0, 1),   // SE
    (-1, 1),  // SW
    (-1, 0),  // W
    (0, -1),  // NW
    (1, -1),  // NE
];

/// A direction index into [`HEX_DIRECTIONS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    E = 0,
    SE = 1,
    SW = 2,
    W = 3,
    NW = 4,
    NE = 5,
}

/// Axial hex coordinate `(q, r)`. The cube coordinate `s = -q - r` is
/// always derivable and never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HexCoord {
    pub q: i32,
    pub r: i32,
}

impl HexCoord {
    pub fn new(q: i32, r: i32) -> Self {
        HexCoord { q, r }
    }

    pub fn s(&self) -> i32 {
        -self.q - self.r
    }

    pub fn cube(&self) -> (i32, i32, i32) {
        (self.q, self.r, self.s())
    }

    /// Hex (Manhattan-in-cube-space) distance to another coordinate.
    pub fn distance(&self, other: HexCoord) -> i32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        (dq + dr + ds) / 2
    }

    /// The six neighbours in fixed E/SE/SW/W/NW/NE order.
    pub fn neighbors(&self) -> [HexCoord; 6] {
        let mut out = [HexCoord::new(0, 0); 6];
        for (i, (dq, dr)) in HEX_DIRECTIONS.iter().enumerate() {
            out[i] = HexCoord::new(self.q + dq, self.r + dr);
        }
        out
    }

    pub fn neighbor(&self, direction: usize) -> HexCoord {
        let (dq, dr) = HEX_DIRECTIONS[direction % 6];
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// Straight line of hexes from `self` to `other`, inclusive of both ends.
    pub fn line_to(&self, other: HexCoord) -> Vec<HexCoord> {
        let n = self.distance(other);
        if n == 0 {
            return vec![*self];
        }
        let mut results = Vec::with_capacity(n as usize + 1);
        for i in 0..=n {
            let t = i as f64 / n as f64;
            let q = self.q as f64 + (other.q - self.q) as f64 * t;
            let r = self.r as f64 + (other.r - self.r) as f64 * t;
            let s = self.s() as f64 + (other.s() - self.s()) as f64 * t;
            results.push(cube_round(q, r, s));
        }
        results
    }

    /// All hexes exactly `radius` away from `self`. `radius == 0` returns `[self]`.
    pub fn ring(&self, radius: i32) -> Vec<HexCoord> {
        if radius == 0 {
            return vec![*self];
        }
        let mut results = Vec::with_capacity(6 * radius as usize);
        let (dq, dr) = HEX_DIRECTIONS[4]; // NW
        let mut current = HexCoord::new(self.q + dq * radius, self.r + dr * radius);
        for direction in 0..6 {
            for _ in 0..radius {
                results.push(current);
                current = current.neighbor(direction);
            }
        }
        results
    }

    /// All hexes within `radius`, ordered by increasing ring (`self` first).
    pub fn spiral(&self, radius: i32) -> Vec<HexCoord> {
        let mut out = Vec::new();
        for r in 0..=radius {
            out.extend(self.ring(r));
        }
        out
    }

    /// Angular bearing from `self` toward `other`, in radians, using the
    /// hex's pointy-top pixel projection. Used by cone AoE resolution.
    pub fn angle_to(&self, other: HexCoord) -> f64 {
        let (x1, y1) = self.to_pixel();
        let (x2, y2) = other.to_pixel();
        (y2 - y1).atan2(x2 - x1)
    }

    fn to_pixel(&self) -> (f64, f64) {
        let x = self.q as f64 + self.r as f64 / 2.0;
        let y = self.r as f64 * 0.75_f64.sqrt() * 2.0;
        (x, y)
    }

    /// Public pixel projection, reused by projectile flight.
    pub fn pixel(&self) -> (f64, f64) {
        self.to_pixel()
    }
}

impl fmt::Display for HexCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.q, self.r)
    }
}

impl std::ops::Add for HexCoord {
    type Output = HexCoord;
    fn add(self, rhs: HexCoord) -> HexCoord {
        HexCoord::new(self.q + rhs.q, self.r + rhs.r)
    }
}

impl std::ops::Sub for HexCoord {
    type Output = HexCoord;
    fn sub(self, rhs: HexCoord) -> HexCoord {
        HexCoord::new(self.q - rhs.q, self.r - rhs.r)
    }
}

impl std::ops::Mul<i32> for HexCoord {
    type Output = HexCoord;
    fn mul(self, scalar: i32) -> HexCoord {
        HexCoord::new(self.q * scalar, self.r * scalar)
    }
}

impl std::ops::Neg for HexCoord {
    type Output = HexCoord;
    fn neg(self) -> HexCoord {
        HexCoord::new(-self.q, -self.r)
    }
}

/// Rounds fractional cube coordinates to the nearest valid hex, correcting
/// whichever axis has the largest rounding error so that q + r + s == 0.
fn cube_round(q: f64, r: f64, s: f64) -> HexCoord {
    let mut rq = q.round();
    let mut rr = r.round();
    let rs = s.round();

    let dq = (rq - q).abs();
    let dr = (rr - r).abs();
    let ds = (rs - s).abs();

    if dq > dr && dq > ds {
        rq = -rr - rs;
    } else if dr > ds {
        rr = -rq - rs;
    }
    HexCoord::new(rq as i32, rr as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn distance_matches_known_example() {
        let a = HexCoord::new(0, 0);
        let b = HexCoord::new(2, 1);
        assert_eq!(a.distance(b), 3);
    }

    #[test]
    fn neighbors_are_in_fixed_order() {
        let n = HexCoord::new(0, 0).neighbors();
        assert_eq!(n[0], HexCoord::new(1, 0));
        assert_eq!(n[1], HexCoord::new(0, 1));
        assert_eq!(n[2], HexCoord::new(-1, 1));
        assert_eq!(n[3], HexCoord::new(-1, 0));
        assert_eq!(n[4], HexCoord::new(0, -1));
        assert_eq!(n[5], HexCoord::new(1, -1));
    }

    #[test]
    fn line_to_straight_east() {
        let line = HexCoord::new(0, 0).line_to(HexCoord::new(3, 0));
        assert_eq!(
            line,
            vec![
                HexCoord::new(0, 0),
                HexCoord::new(1, 0),
                HexCoord::new(2, 0),
                HexCoord::new(3, 0)
            ]
        );
    }

    #[test]
    fn line_to_self_is_single_hex() {
        let a = HexCoord::new(2, 2);
        assert_eq!(a.line_to(a), vec![a]);
    }

    #[test]
    fn ring_zero_is_self() {
        let a = HexCoord::new(1, 1);
        assert_eq!(a.ring(0), vec![a]);
    }

    #[test]
    fn ring_radius_one_has_six_hexes() {
        let ring = HexCoord::new(0, 0).ring(1);
        assert_eq!(ring.len(), 6);
        let mut sorted = ring.clone();
        sorted.sort_by_key(|h| (h.q, h.r));
        let mut expected = HexCoord::new(0, 0).neighbors().to_vec();
        expected.sort_by_key(|h| (h.q, h.r));
        assert_eq!(sorted, expected);
    }

    #[test]
    fn cube_coordinate_always_sums_to_zero() {
        let h = HexCoord::new(5, -3);
        let (q, r, s) = h.cube();
        assert_eq!(q + r + s, 0);
    }
}
