//! Rigid-body transforms restricted to quarter-turn rotations.

use serde::{Deserialize, Serialize};

use super::Point;
use crate::error::{ReticleError, Result};

/// Counter-clockwise rotation in quarter turns.
///
/// Serialized as integer degrees (`0`, `90`, `180`, `270`; `-90` is accepted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Convert an angle in degrees (counter-clockwise, may be negative).
    ///
    /// `-90` maps to `R270`. Anything that is not a multiple of 90 is rejected.
    pub fn from_degrees(degrees: i32) -> Result<Self> {
        let normalized = degrees.rem_euclid(360);
        if normalized % 90 != 0 {
            return Err(ReticleError::InvalidRotation(degrees));
        }
        Ok(Self::from_quarter_turns((normalized / 90) as u8))
    }

    fn from_quarter_turns(turns: u8) -> Self {
        match turns % 4 {
            0 => Rotation::R0,
            1 => Rotation::R90,
            2 => Rotation::R180,
            _ => Rotation::R270,
        }
    }

    fn quarter_turns(self) -> u8 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 1,
            Rotation::R180 => 2,
            Rotation::R270 => 3,
        }
    }

    pub fn degrees(self) -> i32 {
        self.quarter_turns() as i32 * 90
    }

    /// Rotation applied after `self`.
    pub fn then(self, other: Rotation) -> Rotation {
        Self::from_quarter_turns(self.quarter_turns() + other.quarter_turns())
    }

    /// Rotate a point about the origin.
    #[inline]
    pub fn apply(self, p: Point) -> Point {
        match self {
            Rotation::R0 => p,
            Rotation::R90 => Point::new(-p.y, p.x),
            Rotation::R180 => Point::new(-p.x, -p.y),
            Rotation::R270 => Point::new(p.y, -p.x),
        }
    }
}

impl From<Rotation> for i32 {
    fn from(rotation: Rotation) -> i32 {
        rotation.degrees()
    }
}

impl TryFrom<i32> for Rotation {
    type Error = ReticleError;

    fn try_from(degrees: i32) -> Result<Self> {
        Rotation::from_degrees(degrees)
    }
}

/// `p' = offset + rotation(magnification * p)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Transform {
    pub magnification: f64,
    pub rotation: Rotation,
    pub offset: Point,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        magnification: 1.0,
        rotation: Rotation::R0,
        offset: Point::ORIGIN,
    };

    pub fn translation(offset: Point) -> Self {
        Self {
            offset,
            ..Self::IDENTITY
        }
    }

    pub fn rotation(rotation: Rotation) -> Self {
        Self {
            rotation,
            ..Self::IDENTITY
        }
    }

    pub fn magnification(magnification: f64) -> Self {
        Self {
            magnification,
            ..Self::IDENTITY
        }
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        self.offset + self.rotation.apply(p * self.magnification)
    }

    /// The transform equivalent to applying `self` first, then `outer`.
    pub fn then(&self, outer: &Transform) -> Transform {
        Transform {
            magnification: self.magnification * outer.magnification,
            rotation: self.rotation.then(outer.rotation),
            offset: outer.apply(self.offset),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rotation_from_degrees() {
        assert_eq!(Rotation::from_degrees(0).unwrap(), Rotation::R0);
        assert_eq!(Rotation::from_degrees(90).unwrap(), Rotation::R90);
        assert_eq!(Rotation::from_degrees(-90).unwrap(), Rotation::R270);
        assert_eq!(Rotation::from_degrees(540).unwrap(), Rotation::R180);
        assert!(matches!(
            Rotation::from_degrees(45),
            Err(ReticleError::InvalidRotation(45))
        ));
    }

    #[test]
    fn test_rotation_apply() {
        let p = Point::new(2.0, 1.0);
        assert_eq!(Rotation::R90.apply(p), Point::new(-1.0, 2.0));
        assert_eq!(Rotation::R180.apply(p), Point::new(-2.0, -1.0));
        assert_eq!(Rotation::R270.apply(p), Point::new(1.0, -2.0));
    }

    #[test]
    fn test_rotation_then_wraps() {
        assert_eq!(Rotation::R270.then(Rotation::R180), Rotation::R90);
        assert_eq!(Rotation::R90.then(Rotation::R270), Rotation::R0);
    }

    #[test]
    fn test_transform_apply_order() {
        // magnify, then rotate, then translate
        let t = Transform {
            magnification: 2.0,
            rotation: Rotation::R90,
            offset: Point::new(10.0, 0.0),
        };
        assert_eq!(t.apply(Point::new(1.0, 0.0)), Point::new(10.0, 2.0));
    }

    #[test]
    fn test_transform_then_matches_sequential_application() {
        let a = Transform {
            magnification: 4.0,
            rotation: Rotation::R270,
            offset: Point::new(3.0, -5.0),
        };
        let b = Transform {
            magnification: 0.5,
            rotation: Rotation::R90,
            offset: Point::new(-100.0, 7.0),
        };
        let p = Point::new(11.0, 13.0);
        assert_eq!(a.then(&b).apply(p), b.apply(a.apply(p)));
    }

    #[test]
    fn test_rotation_serializes_as_degrees() {
        assert_eq!(serde_json::to_string(&Rotation::R270).unwrap(), "270");
        let parsed: Rotation = serde_json::from_str("-90").unwrap();
        assert_eq!(parsed, Rotation::R270);
        assert!(serde_json::from_str::<Rotation>("45").is_err());
    }

    #[test]
    fn test_identity_default() {
        assert_eq!(Transform::default(), Transform::IDENTITY);
        let p = Point::new(1.5, -2.5);
        assert_eq!(Transform::IDENTITY.apply(p), p);
    }
}
