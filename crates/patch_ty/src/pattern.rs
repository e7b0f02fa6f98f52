use std::fmt;

use crate::{Axis, Cardinality, CanonicalType, PayloadKind, Temporality, Unit};

/// Payload matcher for one side of an adapter rule.
///
/// `Same` is only meaningful on the output side ("whatever came in goes
/// out"); structurally it matches anything, and the registry's refinement
/// step enforces the actual-equality it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadPattern {
    Any,
    Same,
    Is(PayloadKind),
}

impl PayloadPattern {
    pub fn matches(&self, payload: &Axis<PayloadKind>) -> bool {
        match (self, payload) {
            (PayloadPattern::Any | PayloadPattern::Same, _) => true,
            // Unresolved payloads match any matcher; resolution is deferred.
            (PayloadPattern::Is(_), Axis::Var(_)) => true,
            (PayloadPattern::Is(want), Axis::Inst(got)) => want == got,
        }
    }
}

/// Unit matcher, same shape as `PayloadPattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitPattern {
    Any,
    Same,
    Is(Unit),
}

impl UnitPattern {
    pub fn matches(&self, unit: &Axis<Unit>) -> bool {
        match (self, unit) {
            (UnitPattern::Any | UnitPattern::Same, _) => true,
            (UnitPattern::Is(_), Axis::Var(_)) => true,
            (UnitPattern::Is(want), Axis::Inst(got)) => want == got,
        }
    }
}

/// Cardinality matcher. `Many` is instance-agnostic: a rule about fields
/// applies to fields over any instance domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardinalityPattern {
    Zero,
    One,
    Many,
}

impl CardinalityPattern {
    pub fn matches(&self, cardinality: &Axis<Cardinality>) -> bool {
        match (self, cardinality) {
            // An unresolved axis satisfies any constraint at the structural
            // stage; directional refinements re-check with concrete values.
            (_, Axis::Var(_)) => true,
            (CardinalityPattern::Zero, Axis::Inst(c)) => matches!(c, Cardinality::Zero),
            (CardinalityPattern::One, Axis::Inst(c)) => matches!(c, Cardinality::One),
            (CardinalityPattern::Many, Axis::Inst(c)) => matches!(c, Cardinality::Many(_)),
        }
    }
}

/// A partial map of axis constraints. Absent axes are unconstrained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ExtentConstraint {
    pub cardinality: Option<CardinalityPattern>,
    pub temporality: Option<Temporality>,
}

/// Extent matcher: `Any`, or a partial axis-constraint map checked by
/// structural equality.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentPattern {
    Any,
    Axes(ExtentConstraint),
}

impl ExtentPattern {
    pub fn matches(&self, ty: &CanonicalType) -> bool {
        let constraint = match self {
            ExtentPattern::Any => return true,
            ExtentPattern::Axes(c) => c,
        };
        if let Some(card) = &constraint.cardinality {
            if !card.matches(&ty.extent.cardinality) {
                return false;
            }
        }
        if let Some(temporality) = &constraint.temporality {
            match &ty.extent.temporality {
                Axis::Var(_) => {}
                Axis::Inst(t) => {
                    if t != temporality {
                        return false;
                    }
                }
            }
        }
        true
    }
}

/// One side of an adapter rule: per-component matchers for payload, unit,
/// and extent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypePattern {
    pub payload: PayloadPattern,
    pub unit: UnitPattern,
    pub extent: ExtentPattern,
}

impl TypePattern {
    /// Matches everything; the usual starting point for builders.
    pub fn any() -> Self {
        TypePattern {
            payload: PayloadPattern::Any,
            unit: UnitPattern::Any,
            extent: ExtentPattern::Any,
        }
    }

    /// Concrete payload + unit, extent unconstrained. The shape of almost
    /// every unit-conversion rule.
    pub fn exact(payload: PayloadKind, unit: Unit) -> Self {
        TypePattern {
            payload: PayloadPattern::Is(payload),
            unit: UnitPattern::Is(unit),
            extent: ExtentPattern::Any,
        }
    }

    pub fn with_cardinality(mut self, cardinality: CardinalityPattern) -> Self {
        let mut constraint = match self.extent {
            ExtentPattern::Any => ExtentConstraint::default(),
            ExtentPattern::Axes(c) => c,
        };
        constraint.cardinality = Some(cardinality);
        self.extent = ExtentPattern::Axes(constraint);
        self
    }

    /// Structural match only; the registry applies disambiguation
    /// refinements on top of this.
    pub fn matches(&self, ty: &CanonicalType) -> bool {
        self.payload.matches(&ty.payload)
            && self.unit.matches(&ty.unit)
            && self.extent.matches(ty)
    }
}

impl fmt::Display for TypePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.payload {
            PayloadPattern::Any => f.write_str("*")?,
            PayloadPattern::Same => f.write_str("=")?,
            PayloadPattern::Is(p) => write!(f, "{p}")?,
        }
        f.write_str(":")?;
        match &self.unit {
            UnitPattern::Any => f.write_str("*")?,
            UnitPattern::Same => f.write_str("=")?,
            UnitPattern::Is(u) => write!(f, "{u}")?,
        }
        Ok(())
    }
}
