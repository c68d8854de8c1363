//! Graphviz rendering of an ordered timeline.

use std::fmt::Display;

use scuttle_core::{EventName, Timeline};

/// Render `timeline` as a Graphviz digraph.
///
/// Events appear in linear order as record nodes labelled with name and
/// rank; each edge points from an event to one of its resolved
/// predecessors. A small "time" arrow shows the reading direction.
#[must_use]
pub fn to_dot<N: EventName + Display>(timeline: &Timeline<N>) -> String {
    let mut lines = vec![
        "digraph {".to_string(),
        "  rankdir=RL;".to_string(),
        "  splines=true;".to_string(),
        "  subgraph dag {".to_string(),
        "    node[shape=Mrecord];".to_string(),
    ];
    for event in timeline.entries() {
        let name = quote(event.name());
        lines.push(format!(
            "    \"{name}\" [label=\"{name}\\nr={}\"]",
            event.rank()
        ));
        for cause in event.predecessors() {
            lines.push(format!("    \"{name}\" -> \"{}\"", quote(cause.name())));
        }
    }
    lines.extend(
        [
            "  }",
            "  subgraph time {",
            "    node[shape=plain];",
            "    \" t\" -> \" \" [dir=back];",
            "  }",
            "}",
        ]
        .map(str::to_string),
    );

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn quote(name: &impl Display) -> String {
    name.to_string().replace('\\', "\\\\").replace('"', "\\\"")
}
