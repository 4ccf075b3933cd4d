use log::LevelFilter;

/// Initialize logging for the command-line filler.
///
/// Logs at `Debug` when `debug_enabled` is set and `Info` otherwise. `RUST_LOG`, if set, takes
/// precedence over both.
pub fn init_logger(debug_enabled: bool) {
    let level = if debug_enabled {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, level)
        .format_timestamp(None)
        .format_module_path(false)
        .format_target(false);

    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder.init();
    log::debug!("Logger initialized at {level:?} level");
}
