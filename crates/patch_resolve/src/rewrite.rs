use smol_str::{format_smolstr, SmolStr};

use patch_graph::{
    Block, BlockId, BlockRegistry, BlockTypeId, CardinalityMode, Direction, Edge, EdgeId, Graph,
    LensDecl, PortKey, PortRef,
};

use crate::adapters::{directly_compatible, AdapterRegistry};
use crate::solve::PortTypes;
use crate::TypeError;

/// Phase 1: turn user-declared lens attachments into real blocks spliced
/// into their edges.
///
/// Deterministic by construction: blocks, ports, and lens lists are walked
/// in stored order, and every synthesized ID is derived from the IDs of what
/// it replaces, so recompiling an unchanged graph yields a byte-identical
/// result.
pub fn expand_lenses(graph: &Graph, registry: &BlockRegistry) -> Result<Graph, Vec<TypeError>> {
    let mut out = graph.clone();
    let mut errors = Vec::new();

    for (block_id, block) in &graph.blocks {
        for (port_name, lenses) in &block.lenses {
            for lens in lenses {
                let Some((input_port, output_port)) =
                    conversion_ports(registry, &lens.block_type)
                else {
                    errors.push(TypeError::UnknownBlockType {
                        name: lens.block_type.clone(),
                    });
                    continue;
                };

                let target = PortRef {
                    block: block_id.clone(),
                    port: port_name.clone(),
                };
                let lens_block_id =
                    BlockId::new(format_smolstr!("{block_id}.{port_name}.lens.{}", lens.id));

                // Splice into every edge currently feeding the port (or only
                // the one from the lens's declared source). A lens with no
                // matching edge expands to nothing.
                let feeding: Vec<EdgeId> = out
                    .edges
                    .iter()
                    .filter(|edge| edge.enabled && edge.to == target && lens_matches(lens, edge))
                    .map(|edge| edge.id.clone())
                    .collect();

                if feeding.is_empty() {
                    continue;
                }

                out.blocks.insert(
                    lens_block_id.clone(),
                    Block {
                        block_type: lens.block_type.clone(),
                        lenses: Default::default(),
                    },
                );
                for edge_id in feeding {
                    splice(
                        &mut out.edges,
                        &edge_id,
                        &lens_block_id,
                        &input_port,
                        &output_port,
                    );
                }
                log::debug!("expanded lens {} on {target} -> {lens_block_id}", lens.id);
            }
        }

        // Lens declarations are consumed by expansion; the output graph
        // carries none.
        if let Some(rewritten) = out.blocks.get_mut(block_id) {
            rewritten.lenses.clear();
        }
    }

    if errors.is_empty() {
        Ok(out)
    } else {
        Err(errors)
    }
}

fn lens_matches(lens: &LensDecl, edge: &Edge) -> bool {
    match &lens.source {
        Some(source) => edge.from == *source,
        None => true,
    }
}

/// The conversion ports of a one-in one-out block: its adapter spec's ports
/// when it declares one, otherwise its sole input and output.
fn conversion_ports(
    registry: &BlockRegistry,
    block_type: &BlockTypeId,
) -> Option<(SmolStr, SmolStr)> {
    let def = registry.get(block_type)?;
    if let Some(spec) = &def.adapter {
        return Some((spec.input_port.clone(), spec.output_port.clone()));
    }
    let input = def.inputs.keys().next()?;
    let output = def.outputs.keys().next()?;
    Some((input.clone(), output.clone()))
}

/// Replace the edge named `edge_id` with original-source → spliced-block →
/// original-target, in place in the edge list so overall edge order is
/// preserved.
fn splice(
    edges: &mut Vec<Edge>,
    edge_id: &EdgeId,
    through: &BlockId,
    input_port: &SmolStr,
    output_port: &SmolStr,
) {
    let position = edges
        .iter()
        .position(|e| e.id == *edge_id)
        .unwrap_or_else(|| panic!("splice: no edge {edge_id}"));
    let original = edges.remove(position);

    let pre = Edge {
        id: EdgeId::new(format_smolstr!("{}.pre", original.id)),
        from: original.from.clone(),
        to: PortRef {
            block: through.clone(),
            port: input_port.clone(),
        },
        enabled: true,
    };
    let post = Edge {
        id: EdgeId::new(format_smolstr!("{}.post", original.id)),
        from: PortRef {
            block: through.clone(),
            port: output_port.clone(),
        },
        to: original.to.clone(),
        enabled: true,
    };
    edges.insert(position, post);
    edges.insert(position, pre);
}

/// Phase 2: scan every enabled edge for endpoint type disagreement and
/// splice in the adapter block the registry prescribes.
///
/// Returns the rewritten graph plus the port-type map extended to cover the
/// inserted adapters (input bound to the source port's type, output to the
/// target's). Broadcast adapters are skipped when the edge's source block is
/// cardinality-preserving: such blocks reshape their own output to match
/// downstream demand, and a spliced broadcast would double-broadcast.
pub fn insert_adapters(
    graph: &Graph,
    registry: &BlockRegistry,
    adapters: &AdapterRegistry,
    port_types: &PortTypes,
) -> Result<(Graph, PortTypes), Vec<TypeError>> {
    let mut out = graph.clone();
    let mut types = port_types.clone();
    let mut errors = Vec::new();

    for edge in graph.enabled_edges() {
        let from_key = PortKey::output(&edge.from);
        let to_key = PortKey::input(&edge.to);

        let Some(from_ty) = types.get(&from_key).cloned() else {
            errors.push(TypeError::UnknownPort {
                edge: edge.id.clone(),
                port: edge.from.clone(),
            });
            continue;
        };
        let Some(to_ty) = types.get(&to_key).cloned() else {
            errors.push(TypeError::UnknownPort {
                edge: edge.id.clone(),
                port: edge.to.clone(),
            });
            continue;
        };

        let Some(rule) = adapters.find_adapter(&from_ty, &to_ty) else {
            if !directly_compatible(&from_ty, &to_ty) {
                errors.push(TypeError::NoAdapterFound {
                    edge: edge.id.clone(),
                    from: from_ty.to_string(),
                    to: to_ty.to_string(),
                });
            }
            continue;
        };

        if rule.is_broadcast() && source_preserves_cardinality(graph, registry, &edge.from) {
            log::debug!(
                "skipping broadcast on edge {}: source adapts its own shape",
                edge.id
            );
            continue;
        }

        let adapter_id = BlockId::new(format_smolstr!("{}.adapter.{}", edge.id, rule.block_type));
        out.blocks.insert(
            adapter_id.clone(),
            Block {
                block_type: rule.block_type.clone(),
                lenses: Default::default(),
            },
        );
        splice(
            &mut out.edges,
            &edge.id,
            &adapter_id,
            &rule.input_port,
            &rule.output_port,
        );

        types.insert(
            PortKey {
                block: adapter_id.clone(),
                port: rule.input_port.clone(),
                direction: Direction::In,
            },
            from_ty,
        );
        types.insert(
            PortKey {
                block: adapter_id.clone(),
                port: rule.output_port.clone(),
                direction: Direction::Out,
            },
            to_ty,
        );
        log::debug!("spliced adapter {} into edge {}", rule.block_type, edge.id);
    }

    if errors.is_empty() {
        Ok((out, types))
    } else {
        Err(errors)
    }
}

fn source_preserves_cardinality(
    graph: &Graph,
    registry: &BlockRegistry,
    source: &PortRef,
) -> bool {
    graph
        .blocks
        .get(&source.block)
        .and_then(|block| registry.get(&block.block_type))
        .is_some_and(|def| def.cardinality_mode == CardinalityMode::Preserve)
}
