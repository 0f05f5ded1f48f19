use tracing_subscriber::EnvFilter;

/// Install the global subscriber; it also receives `log` records from the
/// library crates.
///
/// `RUST_LOG` wins when set. Otherwise only warnings are shown, or `info`
/// for `wq` crates with `--verbose`.
pub fn init(verbose: bool) {
    let fallback = if verbose {
        "warn,wq_cli=info,wq_core=info,wq_db=info,wq_introspect=info,wq_generate=info,wq_pipeline=info"
    } else {
        "warn"
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
