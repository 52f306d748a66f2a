//! Observability infrastructure for crash reports.
//!
//! ## Usage
//!
//! Install the panic hook at application startup:
//!
//! ```ignore
//! use slidecal::observability::install_panic_hook;
//!
//! fn main() {
//!     install_panic_hook();
//!     // ... rest of application
//! }
//! ```
//!
//! Track context while working:
//!
//! ```ignore
//! use slidecal::observability::{set_current_file, set_phase, RunPhase};
//!
//! let _phase = set_phase(RunPhase::Calibrating);
//! for file in files {
//!     let _file_guard = set_current_file(&file);
//!     // a panic here reports the phase and file
//! }
//! ```

pub mod context;
pub mod panic_hook;

pub use context::{
    get_current_context, increment_processed, reset_context, set_current_file,
    set_phase, set_progress, ContextGuard, RunContext, RunPhase,
};
pub use panic_hook::install_panic_hook;
