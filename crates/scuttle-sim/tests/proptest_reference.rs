use proptest::prelude::*;
use proptest::sample::Index;
use scuttle_core::TimelineOptions;
use scuttle_sim::{CausalGraph, ConvergenceOracle, DeterministicRng, EventSpec};

/// Random DAG: event `i` may follow any event `j < i`; names are a shuffled
/// labelling so definition order and name order disagree.
fn arb_graph() -> impl Strategy<Value = CausalGraph> {
    (1_usize..=10)
        .prop_flat_map(|n| {
            (
                prop::collection::vec(prop::collection::vec(any::<Index>(), 0..4), n),
                Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
            )
        })
        .prop_map(|(picks, labels)| {
            let name = |i: usize| format!("e{}", labels[i]);
            let events = picks
                .iter()
                .enumerate()
                .map(|(i, picks)| EventSpec {
                    name: name(i),
                    after: if i == 0 {
                        Vec::new()
                    } else {
                        picks.iter().map(|pick| name(pick.index(i))).collect()
                    },
                })
                .collect();
            CausalGraph::new(events).unwrap_or_else(|err| panic!("generated graph invalid: {err}"))
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn random_delivery_matches_reference(graph in arb_graph(), seed in any::<u64>(), coalesce in any::<bool>()) {
        let mut schedule: Vec<String> = graph.names().into_iter().map(str::to_string).collect();
        DeterministicRng::new(seed).shuffle(&mut schedule);

        let result = ConvergenceOracle::check_schedule(&graph, &schedule, TimelineOptions { coalesce });

        prop_assert!(result.passed, "{:?} via {:?}", result.violations, schedule);
    }

    #[test]
    fn reference_order_respects_every_edge(graph in arb_graph()) {
        let order = graph.reference_order();
        let position = |name: &str| order.iter().position(|n| n == name).unwrap();
        for spec in graph.events() {
            for cause in &spec.after {
                prop_assert!(position(cause) < position(&spec.name));
                prop_assert!(graph.reference_ranks()[cause] < graph.reference_ranks()[&spec.name]);
            }
        }
    }
}
