//! The standard adapter block set.
//!
//! Every legal automatic conversion is a block registered here; a conversion
//! being *absent* is a design decision, not an oversight. In particular there
//! is no direct `phase01 ↔ norm01` and no `degrees → phase01`: cyclic and
//! bounded [0,1] values mean different things, so those trips must pass
//! through a dimensionless intermediate explicitly, one registered hop at a
//! time. The registry never composes rules.

use patch_ty::{CanonicalType, CardinalityPattern, PayloadKind, TypePattern, Unit};

use crate::{AdapterSpec, BlockDef, BlockRegistry, BlockRegistryBuilder, CardinalityMode};

/// A one-input one-output unit-conversion block: concrete `in`/`out` types
/// and an adapter rule with exact from/to patterns.
fn conversion(
    from_payload: PayloadKind,
    from_unit: Unit,
    to_payload: PayloadKind,
    to_unit: Unit,
) -> BlockDef {
    BlockDef::new()
        .input("in", CanonicalType::signal(from_payload, from_unit))
        .output("out", CanonicalType::signal(to_payload, to_unit))
        .cardinality_mode(CardinalityMode::Preserve)
        .adapter(AdapterSpec::new(
            TypePattern::exact(from_payload, from_unit),
            TypePattern::exact(to_payload, to_unit),
        ))
}

/// Register the standard adapters into `builder`. Declaration order is the
/// tie-break order for equal-priority rules, so this list is ordered
/// deliberately.
pub fn install_standard_adapters(builder: &mut BlockRegistryBuilder) {
    use PayloadKind::Float;
    use PayloadKind::Int;

    builder.register(
        "phase-to-scalar",
        conversion(Float, Unit::Phase01, Float, Unit::Scalar),
    );
    builder.register(
        "scalar-to-phase",
        conversion(Float, Unit::Scalar, Float, Unit::Phase01),
    );
    builder.register(
        "phase-to-radians",
        conversion(Float, Unit::Phase01, Float, Unit::Radians),
    );
    builder.register(
        "radians-to-phase",
        conversion(Float, Unit::Radians, Float, Unit::Phase01),
    );
    builder.register(
        "degrees-to-radians",
        conversion(Float, Unit::Degrees, Float, Unit::Radians),
    );
    builder.register(
        "radians-to-degrees",
        conversion(Float, Unit::Radians, Float, Unit::Degrees),
    );
    // The only payload-changing conversions: integer milliseconds to float
    // seconds and back.
    builder.register(
        "ms-to-seconds",
        conversion(Int, Unit::Ms, Float, Unit::Seconds),
    );
    builder.register(
        "seconds-to-ms",
        conversion(Float, Unit::Seconds, Int, Unit::Ms),
    );
    builder.register(
        "scalar-to-norm",
        conversion(Float, Unit::Scalar, Float, Unit::Norm01),
    );
    builder.register(
        "norm-to-scalar",
        conversion(Float, Unit::Norm01, Float, Unit::Scalar),
    );

    // Cardinality broadcast: one lane fanned out to an instance domain.
    // Payload and unit pass through unchanged; the directional one→many
    // check in the adapter registry keeps this from firing anywhere else.
    builder.register(
        "broadcast",
        BlockDef::new()
            .input(
                "in",
                CanonicalType::signal_var("broadcast.p", "broadcast.u"),
            )
            .output(
                "out",
                CanonicalType::signal_var("broadcast.p", "broadcast.u"),
            )
            .cardinality_mode(CardinalityMode::Transform)
            .adapter(AdapterSpec::new(
                TypePattern::any().with_cardinality(CardinalityPattern::One),
                TypePattern {
                    payload: patch_ty::PayloadPattern::Same,
                    unit: patch_ty::UnitPattern::Same,
                    extent: patch_ty::ExtentPattern::Any,
                }
                .with_cardinality(CardinalityPattern::Many),
            )),
    );
}

/// A registry holding exactly the standard adapter set. Callers with their
/// own block library start from `BlockRegistry::builder()` and call
/// `install_standard_adapters` alongside their own registrations.
pub fn standard_registry() -> BlockRegistry {
    let mut builder = BlockRegistry::builder();
    install_standard_adapters(&mut builder);
    builder.build()
}
