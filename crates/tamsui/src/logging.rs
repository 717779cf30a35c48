//! Logging initialisation for the `tamsui` binary.

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Install the global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise every tamsui crate logs at `level`.
/// Returns `false` when a subscriber was already installed, in which case the
/// call has no effect.
pub fn init(level: &str) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives(level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false))
        .try_init()
        .is_ok()
}

fn directives(level: &str) -> String {
    ["tamsui", "tamsui_rank", "tamsui_utils", "tamsui_analysis", "tamsui_calendar"]
        .iter()
        .map(|krate| format!("{krate}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directives_cover_workspace_crates() {
        let d = directives("debug");
        assert!(d.starts_with("tamsui=debug,"));
        assert!(d.contains("tamsui_rank=debug"));
    }

    #[test]
    fn second_init_is_a_no_op() {
        init("warn");
        assert!(!init("info"));
    }
}
