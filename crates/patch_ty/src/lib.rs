mod axis;
mod canonical;
mod extent;
mod pattern;
mod payload;
mod unit;

pub use axis::{unify_axis, Axis, AxisConflict, VarId};
pub use canonical::CanonicalType;
pub use extent::{
    unify_extent, Binding, Branch, Cardinality, Extent, ExtentAxis, ExtentConflict, InstanceRef,
    Perspective, Temporality,
};
pub use pattern::{
    CardinalityPattern, ExtentConstraint, ExtentPattern, PayloadPattern, TypePattern, UnitPattern,
};
pub use payload::{Payload, PayloadKind, ProjectionMode};
pub use unit::{is_valid_payload_unit, Unit};
