mod config;
mod course;
mod exchange;
mod ipc;
mod logger;
mod stats;
mod store;

use std::io::{self, BufRead, Write};
use tracing::{error, info, warn};

fn main() {
    let (config, config_err) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (config::Config::default(), Some(e)),
    };
    logger::init_logging(&config.log_filter);
    if let Some(e) = config_err {
        warn!(error = %format!("{e:#}"), "using default config");
    }
    info!(
        version = env!("CARGO_PKG_VERSION"),
        history_limit = config.history_limit,
        "coursed ready"
    );

    let mut state = ipc::AppState::new(config);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(v) => v,
            Err(e) => {
                error!(error = %e, "stdin read failed");
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }

        let req: ipc::Request = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                // No id to reply to.
                warn!(error = %e, "unparseable request");
                let resp = ipc::err("", "bad_json", e.to_string(), None);
                let _ = writeln!(stdout, "{}", resp);
                let _ = stdout.flush();
                continue;
            }
        };

        let resp = ipc::handle_request(&mut state, req);
        let _ = writeln!(
            stdout,
            "{}",
            serde_json::to_string(&resp).unwrap_or_else(|_| "{\"ok\":false}".to_string())
        );
        let _ = stdout.flush();
    }
    info!("stdin closed, exiting");
}
