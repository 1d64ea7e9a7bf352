use chrono::Local;
use std::path::PathBuf;
use std::sync::Once;

static INIT: Once = Once::new();

/// Installs the global `fern` logger once. `verbose` forces debug output,
/// which is where the client reports request and response milestones.
pub fn init_logging(app_name: &str, verbose: bool) -> Result<(), String> {
    let mut init_result: Result<(), String> = Ok(());
    INIT.call_once(|| {
        if let Err(err) = init_logging_inner(app_name, verbose) {
            init_result = Err(err);
        }
    });
    init_result
}

fn level_from_env(verbose: bool) -> log::LevelFilter {
    if verbose {
        return log::LevelFilter::Debug;
    }
    std::env::var("SIMPLEPAY_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .ok()
        .and_then(|level| level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info)
}

fn log_dir_from_env() -> Option<PathBuf> {
    match std::env::var("SIMPLEPAY_LOG_DIR").ok().as_deref() {
        Some("off") | Some("none") | Some("") => None,
        Some(path) => Some(PathBuf::from(path)),
        None => Some(PathBuf::from("logs")),
    }
}

fn init_logging_inner(app_name: &str, verbose: bool) -> Result<(), String> {
    let mut dispatch = fern::Dispatch::new()
        .level(level_from_env(verbose))
        // dependency chatter stays at info even in verbose mode
        .level_for("reqwest", log::LevelFilter::Info)
        .level_for("rustls", log::LevelFilter::Info)
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} | {:<5} | {} | {}",
                Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.level(),
                record.target(),
                message
            ))
        })
        .chain(std::io::stderr());

    if let Some(dir) = log_dir_from_env() {
        std::fs::create_dir_all(&dir).map_err(|err| err.to_string())?;
        let date = Local::now().format("%Y_%m_%d");
        let file_path = dir.join(format!("{app_name}-{date}.log"));
        dispatch = dispatch.chain(fern::log_file(file_path).map_err(|err| err.to_string())?);
    }

    dispatch.apply().map_err(|err| err.to_string())
}
