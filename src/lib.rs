pub mod clock;
pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod scheduler;
pub mod service;
pub mod util;

#[cfg(test)]
pub mod test_utils;

pub use config::Config;
pub use error::app_error::AppError;
pub use scheduler::Scheduler;

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over `log_level`, e.g.
/// `RUST_LOG=info,tutor_schedule::database=debug`.
pub fn init_tracing(log_level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_line_number(true)
        .with_writer(std::io::stderr);

    if json_format {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}
