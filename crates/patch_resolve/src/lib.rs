//! Type resolution for patch graphs.
//!
//! Three fallible stages, run in fixed order by [`compile`]:
//!
//! 1. lens expansion — user-declared lens attachments become real blocks
//!    spliced into their edges ([`expand_lenses`]);
//! 2. constraint solving — every polymorphic payload/unit variable is pinned
//!    to a concrete value via union-find, yielding a total port→type map
//!    ([`solve`]);
//! 3. adapter insertion — edges whose endpoint types still disagree get a
//!    bridging adapter block from the [`AdapterRegistry`], or a
//!    `NoAdapterFound` error ([`insert_adapters`]).
//!
//! Every stage collects its full error list instead of stopping at the first
//! problem, and every stage is deterministic: the same input graph produces a
//! byte-identical output graph, inserted block IDs included.

mod adapters;
mod rewrite;
mod solve;
pub(crate) mod storage;

#[cfg(test)]
mod pbt;

pub use adapters::{directly_compatible, AdapterRegistry, AdapterRule};
pub use rewrite::{expand_lenses, insert_adapters};
pub use solve::{solve, PortTypes};

use patch_graph::{BlockRegistry, BlockTypeId, EdgeId, Graph, PortKey, PortRef};
use thiserror::Error;

/// The error taxonomy shared by all three stages. Type descriptions are
/// carried pre-rendered; by the time an error reaches a caller the internal
/// solver state that produced it is gone.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("unresolved payload on `{port}`: no connected, typed neighbor pins it down")]
    UnresolvedPayload { port: PortKey },

    #[error("unresolved unit on `{port}`: no connected, typed neighbor pins it down")]
    UnresolvedUnit { port: PortKey },

    #[error("conflicting payloads on edge `{edge}`: `{left}` vs `{right}`")]
    ConflictingPayloads {
        edge: EdgeId,
        left: String,
        right: String,
    },

    #[error("conflicting units on edge `{edge}`: `{left}` vs `{right}`")]
    ConflictingUnits {
        edge: EdgeId,
        left: String,
        right: String,
    },

    #[error("payload `{payload}` cannot carry unit `{unit}` on `{port}`")]
    InvalidUnit {
        port: PortKey,
        payload: String,
        unit: String,
    },

    #[error("edge `{edge}` references undeclared port `{port}`")]
    UnknownPort { edge: EdgeId, port: PortRef },

    #[error("unknown block type `{name}`")]
    UnknownBlockType { name: BlockTypeId },

    #[error("no adapter converts `{from}` to `{to}` on edge `{edge}`")]
    NoAdapterFound {
        edge: EdgeId,
        from: String,
        to: String,
    },
}

/// The produced surface for the IR-lowering stage: the rewritten graph and a
/// concrete type for every port in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiled {
    pub graph: Graph,
    pub port_types: PortTypes,
}

/// Run the whole pipeline with a freshly built adapter-rule table.
///
/// The table only depends on the registry, so callers compiling many graphs
/// against one registry should build an [`AdapterRegistry`] once and use
/// [`compile_with_adapters`] instead.
pub fn compile(graph: &Graph, registry: &BlockRegistry) -> Result<Compiled, Vec<TypeError>> {
    let adapters = AdapterRegistry::new(registry);
    compile_with_adapters(graph, registry, &adapters)
}

/// Lens expansion, then constraint solving, then adapter insertion. A stage
/// with errors stops the pipeline (later stages need its output) but each
/// stage's error list is complete for that stage.
pub fn compile_with_adapters(
    graph: &Graph,
    registry: &BlockRegistry,
    adapters: &AdapterRegistry,
) -> Result<Compiled, Vec<TypeError>> {
    let expanded = expand_lenses(graph, registry)?;
    let port_types = solve(&expanded, registry)?;
    let (graph, port_types) = insert_adapters(&expanded, registry, adapters, &port_types)?;
    Ok(Compiled { graph, port_types })
}
