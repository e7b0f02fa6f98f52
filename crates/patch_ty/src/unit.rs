use std::fmt;

use crate::{Axis, Payload, PayloadKind};

/// Semantic tag attached to a payload. Units are distinct even when the bits
/// are identical at runtime — `phase01` and `scalar` are both an `f32`, but
/// one is cyclic and the other is not, and that difference is the entire
/// reason the adapter layer exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Unit {
    None,
    Scalar,
    /// Clamped to [0, 1].
    Norm01,
    /// Cyclic over [0, 1).
    Phase01,
    Radians,
    Degrees,
    Ms,
    Seconds,
    Count,
    Ndc2,
    Ndc3,
    World2,
    World3,
    Rgba01,
    Hsl,
}

impl Unit {
    /// The fixed payload/unit compatibility table.
    pub fn accepts(self, payload: PayloadKind) -> bool {
        use PayloadKind::*;
        match self {
            Unit::None => matches!(payload, Float | Bool | Vec2 | Vec3 | CameraProjection(_)),
            Unit::Scalar
            | Unit::Norm01
            | Unit::Phase01
            | Unit::Radians
            | Unit::Degrees
            | Unit::Seconds => matches!(payload, Float),
            Unit::Ms | Unit::Count => matches!(payload, Int),
            Unit::Ndc2 | Unit::World2 => matches!(payload, Vec2),
            Unit::Ndc3 | Unit::World3 => matches!(payload, Vec3),
            Unit::Rgba01 | Unit::Hsl => matches!(payload, Color),
        }
    }
}

/// Check a (payload, unit) pairing, treating variables on either side as
/// provisionally valid — they are re-checked once resolution pins them down.
pub fn is_valid_payload_unit(payload: &Payload, unit: &Axis<Unit>) -> bool {
    match (payload, unit) {
        (Axis::Inst(p), Axis::Inst(u)) => u.accepts(*p),
        _ => true,
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Unit::None => "none",
            Unit::Scalar => "scalar",
            Unit::Norm01 => "norm01",
            Unit::Phase01 => "phase01",
            Unit::Radians => "radians",
            Unit::Degrees => "degrees",
            Unit::Ms => "ms",
            Unit::Seconds => "seconds",
            Unit::Count => "count",
            Unit::Ndc2 => "ndc2",
            Unit::Ndc3 => "ndc3",
            Unit::World2 => "world2",
            Unit::World3 => "world3",
            Unit::Rgba01 => "rgba01",
            Unit::Hsl => "hsl",
        };
        f.write_str(name)
    }
}
