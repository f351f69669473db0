// src/logging.rs

use std::io::Write;
use std::sync::Mutex;
use std::time::Instant;

use env_logger::{Builder, Env, Target};

/// Time of the previous log line, for the `+N ms` column.
static LAST_LOG: Mutex<Option<Instant>> = Mutex::new(None);

/// Installs the global logger. Defaults to `info`; `RUST_LOG` overrides.
pub fn init() {
    Builder::from_env(Env::default().default_filter_or("info"))
        .target(Target::Stderr)
        .format(|buf, record| {
            let now = Instant::now();
            let delta = match LAST_LOG.lock() {
                Ok(mut last) => {
                    let delta = last.map(|t| now.duration_since(t).as_millis()).unwrap_or(0);
                    *last = Some(now);
                    delta
                }
                Err(_) => 0,
            };

            writeln!(
                buf,
                "{} [+{} ms] [{}] {} - {}",
                chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f"),
                delta,
                record.level(),
                record.target(),
                record.args()
            )
        })
        .init();
}
