//! Thread-local context tracking for crash reports.
//!
//! Records what slidecal was doing (phase, file, how far through the batch)
//! so a panic report can say where it happened. Batches run on one thread,
//! so all state lives in a `thread_local!`. Guards restore the previous
//! context on drop.

use std::cell::RefCell;
use std::path::PathBuf;

thread_local! {
    static CURRENT_CONTEXT: RefCell<RunContext> = const { RefCell::new(RunContext::new()) };
}

/// Context snapshot for the current run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunContext {
    /// Current phase
    pub phase: Option<RunPhase>,
    /// Metrics file currently being processed
    pub current_file: Option<PathBuf>,
    /// Files finished so far
    pub processed: usize,
    /// Files discovered for this run
    pub total: usize,
}

impl RunContext {
    /// Create a new empty context.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            phase: None,
            current_file: None,
            processed: 0,
            total: 0,
        }
    }
}

/// Stages of a calibration run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Reading and parsing the calibration table
    TableLoading,
    /// Walking the root directory for metrics files
    Discovery,
    /// Reading and calibrating a metrics document
    Calibrating,
    /// Writing the calibrated copy
    Writing,
}

impl std::fmt::Display for RunPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TableLoading => write!(f, "table_loading"),
            Self::Discovery => write!(f, "discovery"),
            Self::Calibrating => write!(f, "calibrating"),
            Self::Writing => write!(f, "writing"),
        }
    }
}

/// RAII guard restoring the phase and file it replaced.
///
/// Progress counters are not rolled back.
pub struct ContextGuard {
    phase: Option<RunPhase>,
    current_file: Option<PathBuf>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        CURRENT_CONTEXT.with(|ctx| {
            let mut ctx = ctx.borrow_mut();
            ctx.phase = self.phase;
            ctx.current_file = self.current_file.take();
        });
    }
}

fn replace_with<F: FnOnce(&mut RunContext)>(update: F) -> ContextGuard {
    CURRENT_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        let guard = ContextGuard {
            phase: ctx.phase,
            current_file: ctx.current_file.clone(),
        };
        update(&mut ctx);
        guard
    })
}

/// Set the current phase; the previous one comes back when the guard drops.
#[must_use]
pub fn set_phase(phase: RunPhase) -> ContextGuard {
    replace_with(|ctx| ctx.phase = Some(phase))
}

/// Set the file being processed; restored when the guard drops.
#[must_use]
pub fn set_current_file(path: impl Into<PathBuf>) -> ContextGuard {
    let path = path.into();
    replace_with(|ctx| ctx.current_file = Some(path))
}

/// Set the progress counters (processed and total files).
pub fn set_progress(processed: usize, total: usize) {
    CURRENT_CONTEXT.with(|ctx| {
        let mut ctx = ctx.borrow_mut();
        ctx.processed = processed;
        ctx.total = total;
    });
}

/// Increment the processed file count.
pub fn increment_processed() {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow_mut().processed += 1);
}

/// Get the current context snapshot.
#[must_use]
pub fn get_current_context() -> RunContext {
    CURRENT_CONTEXT.with(|ctx| ctx.borrow().clone())
}

/// Reset the current thread's context to empty.
pub fn reset_context() {
    CURRENT_CONTEXT.with(|ctx| {
        *ctx.borrow_mut() = RunContext::new();
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_guard_restores_previous() {
        reset_context();

        let _phase1 = set_phase(RunPhase::Discovery);
        assert_eq!(get_current_context().phase, Some(RunPhase::Discovery));

        {
            let _phase2 = set_phase(RunPhase::Writing);
            assert_eq!(get_current_context().phase, Some(RunPhase::Writing));
        }

        assert_eq!(
            get_current_context().phase,
            Some(RunPhase::Discovery),
            "Phase should be restored to Discovery"
        );
    }

    #[test]
    fn test_file_guard_keeps_phase() {
        reset_context();

        let _phase = set_phase(RunPhase::Calibrating);
        {
            let _file = set_current_file("/slides/s1/results.json");
            let ctx = get_current_context();
            assert_eq!(ctx.phase, Some(RunPhase::Calibrating));
            assert_eq!(
                ctx.current_file,
                Some(PathBuf::from("/slides/s1/results.json"))
            );
        }
        assert_eq!(get_current_context().current_file, None);
    }

    #[test]
    fn test_progress_tracking() {
        reset_context();

        set_progress(0, 4);
        increment_processed();
        increment_processed();

        let ctx = get_current_context();
        assert_eq!((ctx.processed, ctx.total), (2, 4));
    }

    #[test]
    fn test_progress_survives_guard_drop() {
        reset_context();
        set_progress(0, 2);
        {
            let _file = set_current_file("a.json");
            increment_processed();
        }
        let ctx = get_current_context();
        assert_eq!((ctx.processed, ctx.total), (1, 2));
    }

    #[test]
    fn test_phase_display() {
        assert_eq!(RunPhase::TableLoading.to_string(), "table_loading");
        assert_eq!(RunPhase::Discovery.to_string(), "discovery");
        assert_eq!(RunPhase::Calibrating.to_string(), "calibrating");
        assert_eq!(RunPhase::Writing.to_string(), "writing");
    }

    #[test]
    fn test_empty_context_by_default() {
        reset_context();
        assert_eq!(get_current_context(), RunContext::default());
    }
}
