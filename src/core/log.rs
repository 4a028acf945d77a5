use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter, filter::Targets, fmt, prelude::__tracing_subscriber_SubscriberExt,
    util::SubscriberInitExt,
};

fn default_level(verbose: bool) -> (LevelFilter, &'static str) {
    if verbose {
        (LevelFilter::DEBUG, "debug")
    } else {
        (LevelFilter::OFF, "off")
    }
}

/// Installs the global subscriber. `RUST_LOG` overrides the verbosity flag.
pub fn init_logging(verbose: bool) {
    let (mut level_filter, level) = default_level(verbose);
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => {
            level_filter = LevelFilter::TRACE;
            filter
        }
        Err(_) => EnvFilter::new(level),
    };
    let app_filter = Targets::new()
        .with_target(env!("CARGO_CRATE_NAME"), level_filter)
        .with_default(level_filter);

    tracing_subscriber::registry()
        .with(fmt::layer().pretty().without_time().with_writer(std::io::stderr))
        .with(app_filter)
        .with(env_filter)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_unless_verbose() {
        assert_eq!(default_level(false), (LevelFilter::OFF, "off"));
        assert_eq!(default_level(true), (LevelFilter::DEBUG, "debug"));
    }
}
