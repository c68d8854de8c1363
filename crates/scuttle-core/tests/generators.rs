#![allow(dead_code)]

use proptest::prelude::*;
use std::collections::BTreeMap;

/// An acyclic event graph plus one delivery order for it.
#[derive(Debug, Clone)]
pub struct Scenario {
    /// `(name, after)` in topological order of generation.
    pub events: Vec<(String, Vec<String>)>,
    /// Indices into `events`, in delivery order.
    pub delivery: Vec<usize>,
}

impl Scenario {
    pub fn after(&self, name: &str) -> &[String] {
        self.events
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, after)| after.as_slice())
            .unwrap_or_default()
    }

    /// Longest path from a root for every event.
    pub fn ranks(&self) -> BTreeMap<String, usize> {
        let mut ranks = BTreeMap::new();
        // Generation order is topological, so predecessors are ranked first.
        for (name, after) in &self.events {
            let rank = after.iter().map(|cause| ranks[cause] + 1).max().unwrap_or(0);
            ranks.insert(name.clone(), rank);
        }
        ranks
    }

    /// Canonical order: ascending rank, then ascending name.
    pub fn expected_order(&self) -> Vec<String> {
        let ranks = self.ranks();
        let mut names: Vec<String> = ranks.keys().cloned().collect();
        names.sort_by(|a, b| ranks[a].cmp(&ranks[b]).then_with(|| a.cmp(b)));
        names
    }
}

const NAMES: [&str; 12] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j", "k", "l"];

/// Random DAG of 1..=12 events with shuffled names, up to four predecessor
/// references each (repeats allowed), and a shuffled delivery order.
pub fn arb_scenario() -> impl Strategy<Value = Scenario> {
    (1usize..=NAMES.len()).prop_flat_map(|n| {
        (
            Just(NAMES[..n].to_vec()).prop_shuffle(),
            prop::collection::vec(prop::collection::vec(any::<prop::sample::Index>(), 0..=4), n),
            Just((0..n).collect::<Vec<_>>()).prop_shuffle(),
        )
            .prop_map(|(names, picks, delivery)| {
                let events = names
                    .iter()
                    .zip(&picks)
                    .enumerate()
                    .map(|(i, (name, picks))| {
                        let after = if i == 0 {
                            Vec::new()
                        } else {
                            picks
                                .iter()
                                .map(|pick| names[pick.index(i)].to_string())
                                .collect()
                        };
                        ((*name).to_string(), after)
                    })
                    .collect();
                Scenario { events, delivery }
            })
    })
}
