use std::fmt;

use smol_str::SmolStr;

use crate::{unify_axis, Axis};

/// Which repeated-element domain a `many` cardinality is aligned to (e.g. the
/// 500 circles created by one Array block). Two `many` extents unify only on
/// exact match — this is what stops two unrelated field populations from
/// being zipped together.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceRef {
    pub domain_type: SmolStr,
    pub instance: SmolStr,
}

impl InstanceRef {
    pub fn new(domain_type: impl Into<SmolStr>, instance: impl Into<SmolStr>) -> Self {
        Self {
            domain_type: domain_type.into(),
            instance: instance.into(),
        }
    }
}

impl fmt::Display for InstanceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.domain_type, self.instance)
    }
}

/// How many parallel lanes a value has.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// Compile-time constant, no runtime lanes.
    Zero,
    /// A single time-varying lane — a signal.
    One,
    /// N lanes aligned to a named instance domain — a field.
    Many(InstanceRef),
}

impl fmt::Display for Cardinality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cardinality::Zero => f.write_str("zero"),
            Cardinality::One => f.write_str("one"),
            Cardinality::Many(inst) => write!(f, "many({inst})"),
        }
    }
}

/// Whether a value exists every tick or only at event occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Temporality {
    Continuous,
    Discrete,
}

impl fmt::Display for Temporality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Temporality::Continuous => f.write_str("continuous"),
            Temporality::Discrete => f.write_str("discrete"),
        }
    }
}

/// Referential anchoring strength to an external referent. The referent
/// itself is opaque to the type layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Binding {
    Unbound,
    Weak,
    Strong,
    Identity,
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Binding::Unbound => "unbound",
            Binding::Weak => "weak",
            Binding::Strong => "strong",
            Binding::Identity => "identity",
        };
        f.write_str(name)
    }
}

/// Reserved for multi-viewpoint evaluation; one value today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Perspective {
    Single,
}

impl fmt::Display for Perspective {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("single")
    }
}

/// Reserved for multi-branch evaluation; one value today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Branch {
    Main,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("main")
    }
}

/// The five-axis coordinate describing where/when a value exists,
/// independent of its payload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Extent {
    pub cardinality: Axis<Cardinality>,
    pub temporality: Axis<Temporality>,
    pub binding: Axis<Binding>,
    pub perspective: Axis<Perspective>,
    pub branch: Axis<Branch>,
}

/// Names the extent axes for per-axis conflict reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtentAxis {
    Cardinality,
    Temporality,
    Binding,
    Perspective,
    Branch,
}

impl fmt::Display for ExtentAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExtentAxis::Cardinality => "cardinality",
            ExtentAxis::Temporality => "temporality",
            ExtentAxis::Binding => "binding",
            ExtentAxis::Perspective => "perspective",
            ExtentAxis::Branch => "branch",
        };
        f.write_str(name)
    }
}

/// A single-axis unification failure: which axis, and the two values that
/// refused to meet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtentConflict {
    pub axis: ExtentAxis,
    pub left: String,
    pub right: String,
}

impl fmt::Display for ExtentConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} mismatch: `{}` vs `{}`",
            self.axis, self.left, self.right
        )
    }
}

impl Extent {
    /// cardinality=one, temporality=continuous, no anchoring.
    pub fn signal() -> Self {
        Extent {
            cardinality: Axis::Inst(Cardinality::One),
            temporality: Axis::Inst(Temporality::Continuous),
            binding: Axis::Inst(Binding::Unbound),
            perspective: Axis::Inst(Perspective::Single),
            branch: Axis::Inst(Branch::Main),
        }
    }

    /// cardinality=many(instance), temporality=continuous.
    pub fn field(instance: InstanceRef) -> Self {
        Extent {
            cardinality: Axis::Inst(Cardinality::Many(instance)),
            ..Extent::signal()
        }
    }

    /// temporality=discrete, single lane.
    pub fn event() -> Self {
        Extent {
            temporality: Axis::Inst(Temporality::Discrete),
            ..Extent::signal()
        }
    }

    /// cardinality=zero: a compile-time constant.
    pub fn constant() -> Self {
        Extent {
            cardinality: Axis::Inst(Cardinality::Zero),
            ..Extent::signal()
        }
    }

    fn cardinality_or_fatal(&self, what: &str) -> &Cardinality {
        match &self.cardinality {
            Axis::Inst(c) => c,
            Axis::Var(v) => panic!("{what} asked of unresolved cardinality {v}"),
        }
    }

    fn temporality_or_fatal(&self, what: &str) -> Temporality {
        match &self.temporality {
            Axis::Inst(t) => *t,
            Axis::Var(v) => panic!("{what} asked of unresolved temporality {v}"),
        }
    }

    /// cardinality=one and temporality=continuous. Fatal on an unresolved
    /// deciding axis — classification never guesses.
    pub fn is_signal(&self) -> bool {
        matches!(self.cardinality_or_fatal("is_signal"), Cardinality::One)
            && self.temporality_or_fatal("is_signal") == Temporality::Continuous
    }

    /// cardinality=many and temporality=continuous.
    pub fn is_field(&self) -> bool {
        matches!(self.cardinality_or_fatal("is_field"), Cardinality::Many(_))
            && self.temporality_or_fatal("is_field") == Temporality::Continuous
    }

    /// temporality=discrete, at any cardinality.
    pub fn is_event(&self) -> bool {
        self.temporality_or_fatal("is_event") == Temporality::Discrete
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{}", self.cardinality, self.temporality)?;
        // The anchoring axes only show up when they carry information.
        if self.binding != Axis::Inst(Binding::Unbound) {
            write!(f, ",{}", self.binding)?;
        }
        f.write_str("]")
    }
}

/// Unify one axis, recording a conflict instead of failing so the remaining
/// axes still get checked. Falls back to the left value on conflict; the
/// fallback is never observed because a non-empty conflict list fails the
/// whole unification.
fn unify_one<T>(
    axis: ExtentAxis,
    a: &Axis<T>,
    b: &Axis<T>,
    conflicts: &mut Vec<ExtentConflict>,
) -> Axis<T>
where
    T: Clone + PartialEq + fmt::Display,
{
    match unify_axis(a, b) {
        Ok(v) => v,
        Err(c) => {
            conflicts.push(ExtentConflict {
                axis,
                left: c.left,
                right: c.right,
            });
            a.clone()
        }
    }
}

/// Unify all five axes independently, reporting every failing axis rather
/// than stopping at the first.
pub fn unify_extent(a: &Extent, b: &Extent) -> Result<Extent, Vec<ExtentConflict>> {
    let mut conflicts = Vec::new();

    let cardinality = unify_one(
        ExtentAxis::Cardinality,
        &a.cardinality,
        &b.cardinality,
        &mut conflicts,
    );
    let temporality = unify_one(
        ExtentAxis::Temporality,
        &a.temporality,
        &b.temporality,
        &mut conflicts,
    );
    let binding = unify_one(ExtentAxis::Binding, &a.binding, &b.binding, &mut conflicts);
    let perspective = unify_one(
        ExtentAxis::Perspective,
        &a.perspective,
        &b.perspective,
        &mut conflicts,
    );
    let branch = unify_one(ExtentAxis::Branch, &a.branch, &b.branch, &mut conflicts);

    if conflicts.is_empty() {
        Ok(Extent {
            cardinality,
            temporality,
            binding,
            perspective,
            branch,
        })
    } else {
        Err(conflicts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signal_field_event_classification() {
        assert!(Extent::signal().is_signal());
        assert!(!Extent::signal().is_field());
        assert!(!Extent::signal().is_event());

        let field = Extent::field(InstanceRef::new("circle", "array1"));
        assert!(field.is_field());
        assert!(!field.is_signal());

        assert!(Extent::event().is_event());
        assert!(!Extent::event().is_signal());
    }

    #[test]
    #[should_panic(expected = "unresolved cardinality")]
    fn classification_of_variable_axis_is_fatal() {
        let ext = Extent {
            cardinality: Axis::var("c"),
            ..Extent::signal()
        };
        let _ = ext.is_signal();
    }

    #[test]
    fn unify_identical_extents() {
        let a = Extent::signal();
        assert_eq!(unify_extent(&a, &a), Ok(a.clone()));
    }

    #[test]
    fn unify_var_against_concrete() {
        let open = Extent {
            cardinality: Axis::var("c"),
            temporality: Axis::var("t"),
            ..Extent::signal()
        };
        let resolved = unify_extent(&open, &Extent::signal()).unwrap();
        assert_eq!(resolved, Extent::signal());
    }

    #[test]
    fn mismatched_instances_do_not_unify() {
        let a = Extent::field(InstanceRef::new("circle", "array1"));
        let b = Extent::field(InstanceRef::new("circle", "array2"));
        let conflicts = unify_extent(&a, &b).unwrap_err();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].axis, ExtentAxis::Cardinality);
        assert_eq!(conflicts[0].left, "many(circle#array1)");
        assert_eq!(conflicts[0].right, "many(circle#array2)");
    }

    #[test]
    fn every_failing_axis_is_reported() {
        let a = Extent::signal();
        let b = Extent {
            cardinality: Axis::Inst(Cardinality::Zero),
            temporality: Axis::Inst(Temporality::Discrete),
            ..Extent::signal()
        };
        let conflicts = unify_extent(&a, &b).unwrap_err();
        let axes: Vec<_> = conflicts.iter().map(|c| c.axis).collect();
        assert_eq!(axes, vec![ExtentAxis::Cardinality, ExtentAxis::Temporality]);
    }
}
