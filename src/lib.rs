// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app_dirs;
pub mod config;
pub mod detect;
pub mod export;
pub mod feedback;
pub mod input;
pub mod records;
pub mod runtime;
pub mod session;
pub mod share;
pub mod stats;
pub mod time_series;
pub mod util;

/// Session timer tick period.
pub const TICK_RATE_MS: u64 = 50;
