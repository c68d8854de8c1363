pub mod converge;
pub mod dot;
pub mod order;

use std::path::Path;

use anyhow::Result;
use scuttle_core::Timeline;
use scuttle_sim::{SimulationConfig, load_config};
use tracing::info;

/// Load the config at `path`, or the built-in demo graph.
pub fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    match path {
        Some(path) => {
            info!(path = %path.display(), "loading config");
            load_config(path)
        }
        None => Ok(SimulationConfig::default()),
    }
}

/// Add one configured event, turning a timeline error into a coded message.
pub fn add_event(timeline: &mut Timeline, name: &str, after: &[String]) -> Result<()> {
    timeline
        .add(name.to_string(), after.iter().cloned())
        .map_err(|err| {
            let code = err.code();
            let mut context = format!("{code} {}", code.message());
            if let Some(hint) = code.hint() {
                context.push_str(". ");
                context.push_str(hint);
            }
            anyhow::Error::new(err).context(context)
        })
}

/// Ingest every configured event in definition order.
pub fn ingest(config: &SimulationConfig) -> Result<Timeline> {
    let mut timeline = Timeline::with_options(config.timeline);
    for spec in &config.events {
        add_event(&mut timeline, &spec.name, &spec.after)?;
    }
    Ok(timeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scuttle_sim::EventSpec;

    #[test]
    fn demo_is_the_default() {
        let config = load(None).unwrap();
        let timeline = ingest(&config).unwrap();
        assert_eq!(
            timeline.iter().map(String::as_str).collect::<Vec<_>>(),
            ["X", "A", "Y", "B", "C", "D", "F", "E"]
        );
    }

    #[test]
    fn cycle_carries_its_error_code() {
        let config = SimulationConfig {
            events: vec![EventSpec::new("a", &["b"]), EventSpec::new("b", &["a"])],
            chains: Vec::new(),
            ..SimulationConfig::default()
        };

        let err = ingest(&config).unwrap_err();

        let rendered = format!("{err:#}");
        assert!(rendered.starts_with("E2103 Causal cycle detected"), "{rendered}");
        assert!(rendered.contains("cycle detected while ordering"));
    }
}
