// Tracing setup for the recast binary

use tracing::Level;

/// Pick the log level: `-q` wins, then `-v`/`-vv`, then the configured level
pub fn resolve_level(verbose: u8, quiet: bool, configured: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => match configured.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        },
        1 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Install the stderr subscriber; a second call is ignored
pub fn init_logging(level: Level) {
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_level() {
        assert_eq!(resolve_level(0, false, "info"), Level::INFO);
        assert_eq!(resolve_level(0, false, "WARN"), Level::WARN);
        assert_eq!(resolve_level(1, false, "warn"), Level::DEBUG);
        assert_eq!(resolve_level(3, false, "info"), Level::TRACE);
        assert_eq!(resolve_level(2, true, "trace"), Level::ERROR);
    }
}
