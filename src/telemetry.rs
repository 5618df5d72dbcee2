//! Tracing subscriber setup.
//!
//! - LOG_LEVEL holds the filter (e.g. "debug" or full directives such as
//!   "info,mcq=debug,bcs_mcq_backend=debug,tower_http=info,axum=info").
//! - LOG_FORMAT picks "pretty" (default) or "json".
//!
//! Generation decisions log under the `mcq` target, server lifecycle under
//! `bcs_mcq_backend`; TraceLayer adds per-request spans on top.

use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info,mcq=debug,bcs_mcq_backend=debug,tower_http=info,axum=info";

pub fn init_tracing() {
  let filter = EnvFilter::try_from_env("LOG_LEVEL").unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

  let builder = tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_target(true)
    .with_file(true)
    .with_line_number(true);

  // Layer types differ, so init inside each arm.
  match std::env::var("LOG_FORMAT").as_deref() {
    Ok("json") => builder.json().init(),
    _ => builder.init(),
  }
}
