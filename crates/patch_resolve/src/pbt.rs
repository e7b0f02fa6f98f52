// ==============================================================================
// Property-Based Tests for Resolution
// ==============================================================================
//
// Two invariants that must hold over arbitrary inputs rather than hand-picked
// scenarios:
// - reflexivity: no adapter is ever offered for a type against itself, for
//   any valid concrete CanonicalType;
// - order independence: the solver's output map does not depend on the order
//   edges are listed in, verified by shuffling the edge list of a fan-out
//   graph and comparing `PortTypes` wholesale.

use proptest::prelude::{proptest, Just, Strategy};
use proptest::prop_oneof;

use patch_graph::{standard_registry, BlockDef, BlockRegistry, Graph, PortRef};
use patch_ty::{CanonicalType, InstanceRef, PayloadKind, Unit};

use crate::{solve, AdapterRegistry};

/// Valid (payload, unit) pairs only; invalid pairs are unconstructible
/// outside of tests and not worth generating.
fn arb_payload_unit() -> impl Strategy<Value = (PayloadKind, Unit)> {
    prop_oneof![
        Just((PayloadKind::Float, Unit::Scalar)),
        Just((PayloadKind::Float, Unit::Phase01)),
        Just((PayloadKind::Float, Unit::Norm01)),
        Just((PayloadKind::Float, Unit::Radians)),
        Just((PayloadKind::Float, Unit::Degrees)),
        Just((PayloadKind::Float, Unit::Seconds)),
        Just((PayloadKind::Int, Unit::Ms)),
        Just((PayloadKind::Int, Unit::Count)),
        Just((PayloadKind::Vec2, Unit::Ndc2)),
        Just((PayloadKind::Vec3, Unit::World3)),
        Just((PayloadKind::Color, Unit::Rgba01)),
    ]
}

fn arb_concrete_type() -> impl Strategy<Value = CanonicalType> {
    (arb_payload_unit(), 0..4u8).prop_map(|((payload, unit), shape)| match shape {
        0 => CanonicalType::signal(payload, unit),
        1 => CanonicalType::constant(payload, unit),
        2 => CanonicalType::field(payload, unit, InstanceRef::new("circle", "array1")),
        _ => CanonicalType::event(),
    })
}

/// One concrete source fanning out into a diamond of elementwise blocks, so
/// every port's type is forced by exactly one concrete declaration no matter
/// which edge the solver happens to process first.
fn fan_out_registry() -> BlockRegistry {
    let mut builder = BlockRegistry::builder();
    builder.register(
        "src",
        BlockDef::new().output("out", CanonicalType::signal(PayloadKind::Float, Unit::Phase01)),
    );
    builder.register(
        "ew",
        BlockDef::new()
            .input("a", CanonicalType::signal_var("p", "u"))
            .input("b", CanonicalType::signal_var("p", "u"))
            .output("out", CanonicalType::signal_var("p", "u")),
    );
    builder.build()
}

fn fan_out_edges() -> Vec<(&'static str, PortRef, PortRef)> {
    vec![
        ("e0", PortRef::new("src", "out"), PortRef::new("x", "a")),
        ("e1", PortRef::new("src", "out"), PortRef::new("x", "b")),
        ("e2", PortRef::new("x", "out"), PortRef::new("y", "a")),
        ("e3", PortRef::new("src", "out"), PortRef::new("y", "b")),
        ("e4", PortRef::new("y", "out"), PortRef::new("z", "a")),
        ("e5", PortRef::new("x", "out"), PortRef::new("z", "b")),
    ]
}

fn fan_out_graph(order: &[usize]) -> Graph {
    let mut graph = Graph::new();
    graph.add_block("src", "src");
    graph.add_block("x", "ew");
    graph.add_block("y", "ew");
    graph.add_block("z", "ew");
    let edges = fan_out_edges();
    for &i in order {
        let (id, from, to) = edges[i].clone();
        graph.connect(id, from, to);
    }
    graph
}

proptest! {
    #[test]
    fn no_adapter_from_any_type_to_itself(ty in arb_concrete_type()) {
        let registry = AdapterRegistry::new(&standard_registry());
        proptest::prop_assert!(registry.find_adapter(&ty, &ty).is_none());
    }

    #[test]
    fn port_types_do_not_depend_on_edge_order(
        order in Just((0..6usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let registry = fan_out_registry();
        let baseline = solve(&fan_out_graph(&[0, 1, 2, 3, 4, 5]), &registry).unwrap();
        let shuffled = solve(&fan_out_graph(&order), &registry).unwrap();
        proptest::prop_assert_eq!(baseline, shuffled);
    }
}
