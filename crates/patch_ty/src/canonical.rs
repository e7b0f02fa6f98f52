use std::fmt;

use smol_str::SmolStr;

use crate::{
    is_valid_payload_unit, Axis, Extent, InstanceRef, Payload, PayloadKind, Unit,
};

/// The full type of a port: payload shape + semantic unit + five-axis extent.
///
/// Values are immutable snapshots; resolution produces new `CanonicalType`s
/// rather than mutating variables in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalType {
    pub payload: Payload,
    pub unit: Axis<Unit>,
    pub extent: Extent,
}

impl CanonicalType {
    /// A single continuous lane of a concrete payload/unit pair.
    pub fn signal(payload: PayloadKind, unit: Unit) -> Self {
        debug_assert!(
            unit.accepts(payload),
            "signal({payload}, {unit}): invalid payload/unit pair"
        );
        CanonicalType {
            payload: Axis::Inst(payload),
            unit: Axis::Inst(unit),
            extent: Extent::signal(),
        }
    }

    /// A signal whose payload and unit are both definition-level variables.
    /// The usual shape of an elementwise block's ports.
    pub fn signal_var(payload_var: impl Into<SmolStr>, unit_var: impl Into<SmolStr>) -> Self {
        CanonicalType {
            payload: Axis::var(payload_var),
            unit: Axis::var(unit_var),
            extent: Extent::signal(),
        }
    }

    /// Many continuous lanes aligned to `instance`.
    pub fn field(payload: PayloadKind, unit: Unit, instance: InstanceRef) -> Self {
        debug_assert!(
            unit.accepts(payload),
            "field({payload}, {unit}): invalid payload/unit pair"
        );
        CanonicalType {
            payload: Axis::Inst(payload),
            unit: Axis::Inst(unit),
            extent: Extent::field(instance),
        }
    }

    /// An event occurrence stream. payload=bool, unit=none is an invariant of
    /// the constructor — there is no way to build an event type carrying
    /// anything else.
    pub fn event() -> Self {
        CanonicalType {
            payload: Axis::Inst(PayloadKind::Bool),
            unit: Axis::Inst(Unit::None),
            extent: Extent::event(),
        }
    }

    /// A compile-time constant (cardinality zero).
    pub fn constant(payload: PayloadKind, unit: Unit) -> Self {
        debug_assert!(
            unit.accepts(payload),
            "constant({payload}, {unit}): invalid payload/unit pair"
        );
        CanonicalType {
            payload: Axis::Inst(payload),
            unit: Axis::Inst(unit),
            extent: Extent::constant(),
        }
    }

    /// The same type with the payload pinned to `payload`.
    pub fn with_payload(&self, payload: PayloadKind) -> Self {
        CanonicalType {
            payload: Axis::Inst(payload),
            ..self.clone()
        }
    }

    /// The same type with the unit pinned to `unit`.
    pub fn with_unit(&self, unit: Unit) -> Self {
        CanonicalType {
            unit: Axis::Inst(unit),
            ..self.clone()
        }
    }

    pub fn is_concrete(&self) -> bool {
        !self.payload.is_var() && !self.unit.is_var()
    }

    /// Payload/unit table check; variables are provisionally valid.
    pub fn is_valid(&self) -> bool {
        is_valid_payload_unit(&self.payload, &self.unit)
    }
}

impl fmt::Display for CanonicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.payload, self.unit, self.extent)
    }
}
