//! Grumpkin points in the form the circuits and the contract use
//!
//! A point is a bare `(x, y)` pair of base-field elements. There is no
//! infinity flag on the wire; `(0, 0)` stands in for the identity (it is not
//! on the curve, since `0 != -17`). That same pair marks a balance slot that
//! has never been written.

use std::fmt;

use ark_ec::{AffineRepr, CurveGroup};
use ark_grumpkin::{Affine, Fq, Projective};
use ark_ff::Zero;
use serde::{Deserialize, Serialize};

use crate::error::CryptoError;
use crate::field::{FIELD_BYTES, fq_from_be_bytes, fq_to_be_bytes, fq_to_decimal, fq_to_hex, parse_fq};
use crate::scalar::Scalar;

/// Encoded width of a point: `x || y`, big-endian
pub const POINT_BYTES: usize = 2 * FIELD_BYTES;

/// Affine coordinates as carried by circuit inputs and contract storage
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "PointRepr", into = "PointRepr")]
pub struct Point {
    pub x: Fq,
    pub y: Fq,
}

#[derive(Serialize, Deserialize)]
struct PointRepr {
    x: String,
    y: String,
}

impl Point {
    /// The `(0, 0)` sentinel
    pub fn zero() -> Self {
        Self { x: Fq::zero(), y: Fq::zero() }
    }

    pub fn is_zero(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// The fixed generator `G = (1, 17631683881184975370165255887551781615748388533673675138860)`
    pub fn generator() -> Self {
        Self::from_affine(&Affine::generator())
    }

    /// Build a point from coordinates, checking it lies on the curve.
    /// `(0, 0)` is accepted as the identity.
    pub fn new(x: Fq, y: Fq) -> Result<Self, CryptoError> {
        let point = Self { x, y };
        point.to_affine().map(|_| point)
    }

    pub fn from_affine(affine: &Affine) -> Self {
        if affine.infinity {
            return Self::zero();
        }
        Self { x: affine.x, y: affine.y }
    }

    pub fn from_projective(projective: &Projective) -> Self {
        Self::from_affine(&projective.into_affine())
    }

    /// Lift to an arkworks affine point, rejecting coordinates off the curve
    pub fn to_affine(&self) -> Result<Affine, CryptoError> {
        if self.is_zero() {
            return Ok(Affine::identity());
        }
        let affine = Affine::new_unchecked(self.x, self.y);
        if !affine.is_on_curve() || !affine.is_in_correct_subgroup_assuming_on_curve() {
            return Err(CryptoError::InvalidPoint {
                x: fq_to_decimal(&self.x),
                y: fq_to_decimal(&self.y),
            });
        }
        Ok(affine)
    }

    pub fn to_projective(&self) -> Result<Projective, CryptoError> {
        self.to_affine().map(Projective::from)
    }

    /// `k·P`
    pub fn mul(&self, k: &Scalar) -> Result<Self, CryptoError> {
        let p = self.to_projective()?;
        Ok(Self::from_projective(&(p * k.to_field())))
    }

    /// Parse from two coordinate strings (hex or decimal)
    pub fn from_strs(x: &str, y: &str) -> Result<Self, CryptoError> {
        Self::new(parse_fq(x)?, parse_fq(y)?)
    }

    /// Parse hex coordinates; the `0x` prefix is optional
    pub fn from_hex(x: &str, y: &str) -> Result<Self, CryptoError> {
        let prefixed = |s: &str| {
            let s = s.trim();
            if s.starts_with("0x") || s.starts_with("0X") {
                s.to_string()
            } else {
                format!("0x{s}")
            }
        };
        Self::from_strs(&prefixed(x), &prefixed(y))
    }

    /// Parse decimal coordinates, the representation circuit inputs use
    pub fn from_decimal(x: &str, y: &str) -> Result<Self, CryptoError> {
        for s in [x, y] {
            if s.trim().starts_with("0x") || s.trim().starts_with("0X") {
                return Err(CryptoError::InvalidFieldElement(s.to_string()));
            }
        }
        Self::from_strs(x, y)
    }

    /// Decode `x || y`. Coordinates are reduced mod `p` and checked on-curve.
    pub fn from_bytes(bytes: &[u8; POINT_BYTES]) -> Result<Self, CryptoError> {
        let mut x = [0u8; FIELD_BYTES];
        let mut y = [0u8; FIELD_BYTES];
        x.copy_from_slice(&bytes[..FIELD_BYTES]);
        y.copy_from_slice(&bytes[FIELD_BYTES..]);
        Self::new(fq_from_be_bytes(&x), fq_from_be_bytes(&y))
    }

    pub fn to_bytes(&self) -> [u8; POINT_BYTES] {
        let mut out = [0u8; POINT_BYTES];
        out[..FIELD_BYTES].copy_from_slice(&fq_to_be_bytes(&self.x));
        out[FIELD_BYTES..].copy_from_slice(&fq_to_be_bytes(&self.y));
        out
    }

    pub fn x_decimal(&self) -> String {
        fq_to_decimal(&self.x)
    }

    pub fn y_decimal(&self) -> String {
        fq_to_decimal(&self.y)
    }
}

impl fmt::Debug for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Point")
            .field("x", &fq_to_hex(&self.x))
            .field("y", &fq_to_hex(&self.y))
            .finish()
    }
}

impl TryFrom<PointRepr> for Point {
    type Error = CryptoError;

    fn try_from(repr: PointRepr) -> Result<Self, Self::Error> {
        Self::from_strs(&repr.x, &repr.y)
    }
}

impl From<Point> for PointRepr {
    fn from(point: Point) -> Self {
        Self {
            x: fq_to_hex(&point.x),
            y: fq_to_hex(&point.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::parse_fq;

    #[test]
    fn test_generator_coordinates() {
        let g = Point::generator();
        assert_eq!(g.x_decimal(), "1");
        assert_eq!(
            g.y_decimal(),
            "17631683881184975370165255887551781615748388533673675138860"
        );
    }

    #[test]
    fn test_zero_is_identity() {
        let zero = Point::zero();
        assert!(zero.is_zero());
        assert!(zero.to_affine().unwrap().is_zero());
        assert_eq!(Point::from_affine(&Affine::identity()), zero);
    }

    #[test]
    fn test_off_curve_rejected() {
        let bad = Point::new(parse_fq("1").unwrap(), parse_fq("2").unwrap());
        assert!(matches!(bad, Err(CryptoError::InvalidPoint { .. })));
    }

    #[test]
    fn test_new_keeps_valid_coordinates() {
        let g = Point::generator();
        assert_eq!(Point::new(g.x, g.y).unwrap(), g);
        assert!(Point::new(Fq::from(0u64), Fq::from(0u64)).unwrap().is_zero());
    }

    #[test]
    fn test_mul_matches_repeated_add() {
        let g = Point::generator();
        let three_g = g.mul(&Scalar::from_u64(3)).unwrap();
        let gp = g.to_projective().unwrap();
        assert_eq!(three_g, Point::from_projective(&(gp + gp + gp)));
        assert!(g.mul(&Scalar::zero()).unwrap().is_zero());
    }

    #[test]
    fn test_bytes_roundtrip() {
        let p = Point::generator().mul(&Scalar::from_u64(99)).unwrap();
        let bytes = p.to_bytes();
        assert_eq!(Point::from_bytes(&bytes).unwrap(), p);
        assert_eq!(Point::from_bytes(&[0u8; POINT_BYTES]).unwrap(), Point::zero());
    }

    #[test]
    fn test_hex_and_decimal_parsing_agree() {
        let g = Point::generator();
        let from_dec = Point::from_decimal(&g.x_decimal(), &g.y_decimal()).unwrap();
        let from_hex = Point::from_hex(&fq_to_hex(&g.x), fq_to_hex(&g.y).trim_start_matches("0x")).unwrap();
        assert_eq!(from_dec, g);
        assert_eq!(from_hex, g);
        assert!(Point::from_decimal("0x01", "0x02").is_err());
    }

    #[test]
    fn test_serde_uses_hex_coordinates() {
        let g = Point::generator();
        let json = serde_json::to_value(g).unwrap();
        assert_eq!(json["x"], format!("0x{:0>64}", "1"));
        let back: Point = serde_json::from_value(json).unwrap();
        assert_eq!(back, g);
    }
}
