use tracing_subscriber::EnvFilter;

/// Inicializa el logger. El nivel se toma de `RUST_LOG`; si no esta, se usa `info`.
pub fn init_logger() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .try_init();
}
