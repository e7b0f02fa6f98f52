use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use smol_str::SmolStr;

use patch_ty::{CanonicalType, TypePattern};

use crate::{BlockTypeId, Direction, PortName};

/// How a block treats the cardinality of values flowing through it.
///
/// `Preserve` matters to the adapter pass: such blocks reshape their own
/// output to match downstream demand, so an explicit broadcast in front of
/// their consumers would double-broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardinalityMode {
    #[default]
    Transform,
    Preserve,
    SignalOnly,
    FieldOnly,
}

/// Adapters are pure and stable by definition; the fields exist so a future
/// impure or unstable conversion has somewhere to declare itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Purity {
    #[default]
    Pure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stability {
    #[default]
    Stable,
}

/// Declares a block as a type adapter: the (from, to) patterns it bridges,
/// its conversion ports, and its priority in the rule table (lower wins).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterSpec {
    pub from: TypePattern,
    pub to: TypePattern,
    pub input_port: PortName,
    pub output_port: PortName,
    pub priority: i32,
    pub purity: Purity,
    pub stability: Stability,
}

impl AdapterSpec {
    /// from/to patterns with the standard `in`/`out` conversion ports at
    /// priority 0.
    pub fn new(from: TypePattern, to: TypePattern) -> Self {
        AdapterSpec {
            from,
            to,
            input_port: "in".into(),
            output_port: "out".into(),
            priority: 0,
            purity: Purity::Pure,
            stability: Stability::Stable,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// The registry's entry for one block type: declared port types (possibly
/// containing definition-level variables), cardinality behavior, and an
/// optional adapter declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockDef {
    pub inputs: BTreeMap<PortName, CanonicalType>,
    pub outputs: BTreeMap<PortName, CanonicalType>,
    pub cardinality_mode: CardinalityMode,
    pub adapter: Option<AdapterSpec>,
}

impl BlockDef {
    pub fn new() -> Self {
        BlockDef {
            inputs: BTreeMap::new(),
            outputs: BTreeMap::new(),
            cardinality_mode: CardinalityMode::default(),
            adapter: None,
        }
    }

    pub fn input(mut self, name: impl Into<SmolStr>, ty: CanonicalType) -> Self {
        self.inputs.insert(name.into(), ty);
        self
    }

    pub fn output(mut self, name: impl Into<SmolStr>, ty: CanonicalType) -> Self {
        self.outputs.insert(name.into(), ty);
        self
    }

    pub fn cardinality_mode(mut self, mode: CardinalityMode) -> Self {
        self.cardinality_mode = mode;
        self
    }

    pub fn adapter(mut self, spec: AdapterSpec) -> Self {
        self.adapter = Some(spec);
        self
    }

    pub fn port(&self, name: &str, direction: Direction) -> Option<&CanonicalType> {
        match direction {
            Direction::In => self.inputs.get(name),
            Direction::Out => self.outputs.get(name),
        }
    }
}

impl Default for BlockDef {
    fn default() -> Self {
        Self::new()
    }
}

/// The immutable block-type registry. Built once at startup via
/// `BlockRegistryBuilder` and passed by reference into the resolver —
/// declaration order is preserved because adapter-rule tie-breaking depends
/// on it.
#[derive(Debug, Clone)]
pub struct BlockRegistry {
    defs: Vec<(BlockTypeId, BlockDef)>,
    index: FxHashMap<BlockTypeId, usize>,
}

impl BlockRegistry {
    pub fn builder() -> BlockRegistryBuilder {
        BlockRegistryBuilder::default()
    }

    pub fn get(&self, block_type: &BlockTypeId) -> Option<&BlockDef> {
        self.index.get(block_type).map(|&i| &self.defs[i].1)
    }

    /// Block types in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&BlockTypeId, &BlockDef)> {
        self.defs.iter().map(|(id, def)| (id, def))
    }

    pub fn len(&self) -> usize {
        self.defs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.defs.is_empty()
    }
}

#[derive(Debug, Clone, Default)]
pub struct BlockRegistryBuilder {
    defs: Vec<(BlockTypeId, BlockDef)>,
}

impl BlockRegistryBuilder {
    /// Register a block type. Re-registering a name replaces the earlier
    /// definition but keeps its declaration slot.
    pub fn register(&mut self, block_type: impl Into<SmolStr>, def: BlockDef) -> &mut Self {
        let id = BlockTypeId::new(block_type);
        if let Some(existing) = self.defs.iter_mut().find(|(other, _)| *other == id) {
            log::debug!("re-registering block type {id}");
            existing.1 = def;
        } else {
            self.defs.push((id, def));
        }
        self
    }

    pub fn build(self) -> BlockRegistry {
        let index = self
            .defs
            .iter()
            .enumerate()
            .map(|(i, (id, _))| (id.clone(), i))
            .collect();
        BlockRegistry {
            defs: self.defs,
            index,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use patch_ty::{PayloadKind, Unit};

    #[test]
    fn registry_preserves_declaration_order() {
        let mut builder = BlockRegistry::builder();
        builder.register("osc", BlockDef::new());
        builder.register("array", BlockDef::new());
        builder.register("circle", BlockDef::new());
        let registry = builder.build();

        let names: Vec<_> = registry.iter().map(|(id, _)| id.0.as_str()).collect();
        assert_eq!(names, vec!["osc", "array", "circle"]);
    }

    #[test]
    fn re_registering_keeps_the_slot() {
        let mut builder = BlockRegistry::builder();
        builder.register("a", BlockDef::new());
        builder.register("b", BlockDef::new());
        builder.register(
            "a",
            BlockDef::new().output("out", CanonicalType::signal(PayloadKind::Float, Unit::Scalar)),
        );
        let registry = builder.build();

        let names: Vec<_> = registry.iter().map(|(id, _)| id.0.as_str()).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert!(registry
            .get(&BlockTypeId::new("a"))
            .unwrap()
            .outputs
            .contains_key("out"));
    }

    #[test]
    fn port_lookup_respects_direction() {
        let def = BlockDef::new()
            .input("in", CanonicalType::signal(PayloadKind::Float, Unit::Scalar))
            .output("out", CanonicalType::signal(PayloadKind::Float, Unit::Scalar));
        assert!(def.port("in", Direction::In).is_some());
        assert!(def.port("in", Direction::Out).is_none());
        assert!(def.port("out", Direction::Out).is_some());
    }
}
