use patch_graph::{BlockRegistry, BlockTypeId, PortName};
use patch_ty::{
    Axis, CanonicalType, Cardinality, CardinalityPattern, ExtentPattern, PayloadPattern,
    TypePattern, UnitPattern,
};

/// One row of the adapter-rule table: the block that performs a conversion
/// and the patterns describing which (from, to) pairs it bridges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterRule {
    pub block_type: BlockTypeId,
    pub from: TypePattern,
    pub to: TypePattern,
    pub input_port: PortName,
    pub output_port: PortName,
    pub priority: i32,
}

impl AdapterRule {
    /// A rule shaped like a cardinality broadcast: from-side constrained to
    /// one lane, to-side constrained to many. Such rules carry an extra
    /// directional check and are subject to the preserve-skip in the rewrite
    /// pass.
    pub fn is_broadcast(&self) -> bool {
        constrained_cardinality(&self.from) == Some(CardinalityPattern::One)
            && constrained_cardinality(&self.to) == Some(CardinalityPattern::Many)
    }
}

fn constrained_cardinality(pattern: &TypePattern) -> Option<CardinalityPattern> {
    match &pattern.extent {
        ExtentPattern::Any => None,
        ExtentPattern::Axes(c) => c.cardinality,
    }
}

/// Two endpoint types that need no bridging: payloads equal, units equal,
/// extents equal axis by axis — with variables on either side treated as
/// compatible, since an unresolved component cannot yet disagree.
pub fn directly_compatible(from: &CanonicalType, to: &CanonicalType) -> bool {
    fn axis_agrees<T: PartialEq>(a: &Axis<T>, b: &Axis<T>) -> bool {
        match (a, b) {
            (Axis::Inst(x), Axis::Inst(y)) => x == y,
            _ => true,
        }
    }

    axis_agrees(&from.payload, &to.payload)
        && axis_agrees(&from.unit, &to.unit)
        && axis_agrees(&from.extent.cardinality, &to.extent.cardinality)
        && axis_agrees(&from.extent.temporality, &to.extent.temporality)
        && axis_agrees(&from.extent.binding, &to.extent.binding)
        && axis_agrees(&from.extent.perspective, &to.extent.perspective)
        && axis_agrees(&from.extent.branch, &to.extent.branch)
}

/// The adapter-rule table: every adapter-capable block in the block
/// registry, sorted ascending by priority with declaration order breaking
/// ties. Built once per registry and shared across compiles; the block
/// registry is immutable, so the table never goes stale.
#[derive(Debug, Clone)]
pub struct AdapterRegistry {
    rules: Vec<AdapterRule>,
}

impl AdapterRegistry {
    pub fn new(registry: &BlockRegistry) -> Self {
        let mut rules: Vec<AdapterRule> = registry
            .iter()
            .filter_map(|(block_type, def)| {
                let spec = def.adapter.as_ref()?;
                Some(AdapterRule {
                    block_type: block_type.clone(),
                    from: spec.from.clone(),
                    to: spec.to.clone(),
                    input_port: spec.input_port.clone(),
                    output_port: spec.output_port.clone(),
                    priority: spec.priority,
                })
            })
            .collect();
        // Stable sort: equal priorities keep registry declaration order.
        rules.sort_by_key(|rule| rule.priority);
        log::debug!("adapter rule table built: {} rules", rules.len());
        AdapterRegistry { rules }
    }

    /// Rules in match order, mostly for diagnostics and tests.
    pub fn rules(&self) -> &[AdapterRule] {
        &self.rules
    }

    /// The single block that converts `from` to `to`, if any.
    ///
    /// `None` means either "already compatible" (checked first, so exact
    /// matches never route through a rule) or "no legal conversion exists".
    /// Callers distinguish the two with [`directly_compatible`]. There is
    /// deliberately no rule composition: a missing direct rule means the
    /// conversion must be spelled out by the user, one hop at a time.
    pub fn find_adapter(&self, from: &CanonicalType, to: &CanonicalType) -> Option<&AdapterRule> {
        if directly_compatible(from, to) {
            return None;
        }

        self.rules
            .iter()
            .find(|rule| rule_matches(rule, from, to))
    }
}

/// Structural pattern match plus the disambiguation refinements.
fn rule_matches(rule: &AdapterRule, from: &CanonicalType, to: &CanonicalType) -> bool {
    if !rule.from.matches(from) || !rule.to.matches(to) {
        return false;
    }

    // A passthrough-payload rule (wildcards on both sides) must not change
    // the payload kind between its endpoints.
    let from_payload_open = matches!(rule.from.payload, PayloadPattern::Any);
    let to_payload_open = matches!(
        rule.to.payload,
        PayloadPattern::Any | PayloadPattern::Same
    );
    if from_payload_open && to_payload_open {
        if let (Axis::Inst(l), Axis::Inst(r)) = (&from.payload, &to.payload) {
            if l != r {
                return false;
            }
        }
    }

    // Same-unit output (or wildcards on both sides) requires the actual
    // units to agree, unless either side is still an unresolved variable.
    let unit_must_agree = matches!(rule.to.unit, UnitPattern::Same)
        || (matches!(rule.from.unit, UnitPattern::Any) && matches!(rule.to.unit, UnitPattern::Any));
    if unit_must_agree {
        if let (Axis::Inst(l), Axis::Inst(r)) = (&from.unit, &to.unit) {
            if l != r {
                return false;
            }
        }
    }

    // Broadcast rules only fire for a proven one→many crossing. A variable
    // cardinality on either side can't prove the direction, so it doesn't
    // fire.
    if rule.is_broadcast() {
        let one_in = matches!(from.extent.cardinality, Axis::Inst(Cardinality::One));
        let many_out = matches!(to.extent.cardinality, Axis::Inst(Cardinality::Many(_)));
        if !(one_in && many_out) {
            return false;
        }
    }

    true
}
