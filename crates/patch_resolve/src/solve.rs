use std::collections::BTreeMap;

use rustc_hash::FxHashMap;

use patch_graph::{BlockRegistry, Direction, Edge, Graph, PortKey, PortRef};
use patch_ty::{Axis, CanonicalType, PayloadKind, Unit, VarId};

use crate::storage::{VarKey, VarStorage};
use crate::TypeError;

/// A concrete type for every port in the graph, keyed deterministically.
pub type PortTypes = BTreeMap<PortKey, CanonicalType>;

/// Resolve every payload and unit variable in `graph` or report the full
/// list of problems.
///
/// Payload and unit constraints are solved by two independent union-find
/// structures. Errors accumulate: every conflicting edge and every dangling
/// polymorphic port shows up in one pass.
pub fn solve(graph: &Graph, registry: &BlockRegistry) -> Result<PortTypes, Vec<TypeError>> {
    let mut solver = Solver::new();
    solver.instantiate(graph, registry);
    solver.unify_edges(graph);
    solver.resolve()
}

/// Per-port bookkeeping: the declared type and the instance-scoped variable
/// keys standing in for its payload and unit.
#[derive(Debug, Clone)]
struct PortEntry {
    declared: CanonicalType,
    payload: VarKey,
    unit: VarKey,
}

#[derive(Debug)]
struct Solver {
    payloads: VarStorage<PayloadKind>,
    units: VarStorage<Unit>,
    /// BTreeMap so resolution emits ports in a stable order.
    ports: BTreeMap<PortKey, PortEntry>,
    errors: Vec<TypeError>,
}

impl Solver {
    fn new() -> Self {
        Solver {
            payloads: VarStorage::new(),
            units: VarStorage::new(),
            ports: BTreeMap::new(),
            errors: Vec::new(),
        }
    }

    /// Step 1 + 2: give every exposed port instance-scoped payload/unit
    /// keys, and union the keys of ports that share a definition-level
    /// variable within the same block instance.
    ///
    /// Instance scoping is what keeps two instances of the same block type
    /// from sharing a solved type: the keys are minted per (block, port,
    /// direction), never per definition.
    fn instantiate(&mut self, graph: &Graph, registry: &BlockRegistry) {
        for (block_id, block) in &graph.blocks {
            let Some(def) = registry.get(&block.block_type) else {
                self.errors.push(TypeError::UnknownBlockType {
                    name: block.block_type.clone(),
                });
                continue;
            };

            // Definition-level variable → the first instance key minted for
            // it in this block. Later ports naming the same variable union
            // against that key.
            let mut payload_vars: FxHashMap<VarId, VarKey> = FxHashMap::default();
            let mut unit_vars: FxHashMap<VarId, VarKey> = FxHashMap::default();

            let port_sets = [
                (Direction::In, &def.inputs),
                (Direction::Out, &def.outputs),
            ];
            for (direction, ports) in port_sets {
                for (port_name, declared) in ports {
                    let payload = self.instantiate_component(
                        &declared.payload,
                        &mut payload_vars,
                        Component::Payload,
                    );
                    let unit = self.instantiate_component(
                        &declared.unit,
                        &mut unit_vars,
                        Component::Unit,
                    );
                    let key = PortKey {
                        block: block_id.clone(),
                        port: port_name.clone(),
                        direction,
                    };
                    self.ports.insert(
                        key,
                        PortEntry {
                            declared: declared.clone(),
                            payload,
                            unit,
                        },
                    );
                }
            }
        }
    }

    fn instantiate_component<T: Clone + PartialEq>(
        &mut self,
        declared: &Axis<T>,
        block_vars: &mut FxHashMap<VarId, VarKey>,
        component: Component,
    ) -> VarKey
    where
        Solver: HasStorage<T>,
    {
        match declared {
            Axis::Inst(value) => self.storage_mut().new_bound(value.clone()),
            Axis::Var(def_var) => {
                let fresh = self.storage_mut().new_key();
                match block_vars.get(def_var) {
                    Some(&first) => {
                        // Intra-block sharing: same unknown, so the union
                        // can't conflict (both sides are unbound or bound
                        // through the same chain).
                        let _ = self.storage_mut().union(fresh, first);
                    }
                    None => {
                        block_vars.insert(def_var.clone(), fresh);
                    }
                }
                log::trace!("instantiated {component:?} var {def_var:?}");
                fresh
            }
        }
    }

    /// Step 3: union payload and unit keys across every enabled edge.
    fn unify_edges(&mut self, graph: &Graph) {
        for edge in graph.enabled_edges() {
            let from_key = PortKey::output(&edge.from);
            let to_key = PortKey::input(&edge.to);

            let Some(from) = self.ports.get(&from_key).cloned() else {
                self.push_unknown_port(edge, &edge.from);
                continue;
            };
            let Some(to) = self.ports.get(&to_key).cloned() else {
                self.push_unknown_port(edge, &edge.to);
                continue;
            };

            // A component is only constrained across an edge when a variable
            // is involved. Two concrete-declared endpoints that disagree are
            // not a solver conflict — that disagreement is exactly what the
            // adapter pass exists to bridge.
            if from.declared.payload.is_var() || to.declared.payload.is_var() {
                if let Err((left, right)) = self.payloads.union(from.payload, to.payload) {
                    self.errors.push(TypeError::ConflictingPayloads {
                        edge: edge.id.clone(),
                        left: left.to_string(),
                        right: right.to_string(),
                    });
                }
            }
            if from.declared.unit.is_var() || to.declared.unit.is_var() {
                if let Err((left, right)) = self.units.union(from.unit, to.unit) {
                    self.errors.push(TypeError::ConflictingUnits {
                        edge: edge.id.clone(),
                        left: left.to_string(),
                        right: right.to_string(),
                    });
                }
            }
        }
    }

    fn push_unknown_port(&mut self, edge: &Edge, port: &PortRef) {
        self.errors.push(TypeError::UnknownPort {
            edge: edge.id.clone(),
            port: port.clone(),
        });
    }

    /// Step 4: read back every port's union-find root and emit the resolved
    /// type, or an unresolved-variable error for roots nothing pinned down.
    fn resolve(mut self) -> Result<PortTypes, Vec<TypeError>> {
        let mut port_types = PortTypes::new();

        let ports = std::mem::take(&mut self.ports);
        for (key, entry) in ports {
            let payload = self.payloads.get(entry.payload);
            let unit = self.units.get(entry.unit);
            if payload.is_none() {
                debug_assert!(entry.declared.payload.is_var());
                self.errors
                    .push(TypeError::UnresolvedPayload { port: key.clone() });
            }
            if unit.is_none() {
                debug_assert!(entry.declared.unit.is_var());
                self.errors
                    .push(TypeError::UnresolvedUnit { port: key.clone() });
            }
            let (Some(payload), Some(unit)) = (payload, unit) else {
                continue;
            };

            // Declared variables were provisionally valid against the
            // payload/unit table; now that both sides are pinned, re-check.
            if !unit.accepts(payload) {
                self.errors.push(TypeError::InvalidUnit {
                    port: key.clone(),
                    payload: payload.to_string(),
                    unit: unit.to_string(),
                });
                continue;
            }

            let resolved = entry.declared.with_payload(payload).with_unit(unit);
            port_types.insert(key, resolved);
        }

        if self.errors.is_empty() {
            Ok(port_types)
        } else {
            Err(self.errors)
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Component {
    Payload,
    Unit,
}

/// Routes `instantiate_component` to the storage matching its value type,
/// so payload and unit instantiation share one implementation without ever
/// sharing a union-find.
trait HasStorage<T> {
    fn storage_mut(&mut self) -> &mut VarStorage<T>;
}

impl HasStorage<PayloadKind> for Solver {
    fn storage_mut(&mut self) -> &mut VarStorage<PayloadKind> {
        &mut self.payloads
    }
}

impl HasStorage<Unit> for Solver {
    fn storage_mut(&mut self) -> &mut VarStorage<Unit> {
        &mut self.units
    }
}
