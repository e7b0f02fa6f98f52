use std::collections::BTreeMap;
use std::fmt;

use derive_more::Debug;
use smol_str::SmolStr;

/// Port names are plain interned strings ("in", "out", "phase", ...).
pub type PortName = SmolStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("BlockId({_0:?})")]
pub struct BlockId(pub SmolStr);

impl BlockId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        BlockId(id.into())
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("EdgeId({_0:?})")]
pub struct EdgeId(pub SmolStr);

impl EdgeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        EdgeId(id.into())
    }
}

impl fmt::Display for EdgeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names a block *type* in the registry, as opposed to a block instance in a
/// graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[debug("BlockTypeId({_0:?})")]
pub struct BlockTypeId(pub SmolStr);

impl BlockTypeId {
    pub fn new(id: impl Into<SmolStr>) -> Self {
        BlockTypeId(id.into())
    }
}

impl fmt::Display for BlockTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.write_str("in"),
            Direction::Out => f.write_str("out"),
        }
    }
}

/// A port on a specific block instance, without direction. The form edges
/// and lens declarations use to address ports.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    pub block: BlockId,
    pub port: PortName,
}

impl PortRef {
    pub fn new(block: impl Into<SmolStr>, port: impl Into<SmolStr>) -> Self {
        PortRef {
            block: BlockId::new(block),
            port: port.into(),
        }
    }
}

impl fmt::Display for PortRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.block, self.port)
    }
}

/// The key every resolved port type is filed under: block + port + direction.
/// `Ord` so result maps iterate in a stable order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortKey {
    pub block: BlockId,
    pub port: PortName,
    pub direction: Direction,
}

impl PortKey {
    pub fn input(port: &PortRef) -> Self {
        PortKey {
            block: port.block.clone(),
            port: port.port.clone(),
            direction: Direction::In,
        }
    }

    pub fn output(port: &PortRef) -> Self {
        PortKey {
            block: port.block.clone(),
            port: port.port.clone(),
            direction: Direction::Out,
        }
    }
}

impl fmt::Display for PortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.block, self.port, self.direction)
    }
}

/// A user-declared transformation attached to an input port. Unlike an
/// adapter, a lens is chosen by the author; the rewrite pass only turns the
/// declaration into a real block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LensDecl {
    pub id: SmolStr,
    pub block_type: BlockTypeId,
    /// When present, the lens applies only to edges arriving from this
    /// source; otherwise to every edge feeding the port.
    pub source: Option<PortRef>,
}

/// One block instance in a patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub block_type: BlockTypeId,
    /// Lens declarations per input port, consumed by lens expansion.
    pub lenses: BTreeMap<PortName, Vec<LensDecl>>,
}

impl Block {
    pub fn new(block_type: impl Into<SmolStr>) -> Self {
        Block {
            block_type: BlockTypeId::new(block_type),
            lenses: BTreeMap::new(),
        }
    }
}

/// A directed wire from one block's output port to another block's input
/// port. Disabled edges survive rewriting untouched and never unify types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub id: EdgeId,
    pub from: PortRef,
    pub to: PortRef,
    pub enabled: bool,
}

/// An immutable patch snapshot: blocks by ID plus directed edges. Every
/// rewrite pass returns a new `Graph`; nothing mutates in place once a pass
/// has started.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Graph {
    pub blocks: BTreeMap<BlockId, Block>,
    pub edges: Vec<Edge>,
}

impl Graph {
    pub fn new() -> Self {
        Graph::default()
    }

    pub fn add_block(&mut self, id: impl Into<SmolStr>, block_type: impl Into<SmolStr>) {
        self.blocks
            .insert(BlockId::new(id), Block::new(block_type));
    }

    pub fn add_lens(&mut self, block: &BlockId, port: impl Into<SmolStr>, lens: LensDecl) {
        let block = self
            .blocks
            .get_mut(block)
            .unwrap_or_else(|| panic!("add_lens: no block {block}"));
        block.lenses.entry(port.into()).or_default().push(lens);
    }

    pub fn connect(&mut self, id: impl Into<SmolStr>, from: PortRef, to: PortRef) {
        self.edges.push(Edge {
            id: EdgeId::new(id),
            from,
            to,
            enabled: true,
        });
    }

    pub fn enabled_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| e.enabled)
    }
}
