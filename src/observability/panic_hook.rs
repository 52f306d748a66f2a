//! Custom panic hook for structured crash reports.
//!
//! When slidecal crashes the report names the phase, the metrics file being
//! processed and how far through the batch the run got.

use super::context::{get_current_context, RunContext};
use std::panic::PanicHookInfo;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const WIDTH: usize = 78;

/// Install the custom panic hook.
///
/// Call early in `main()`, before any file is touched.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        print_crash_report(info);
    }));
}

fn print_crash_report(info: &PanicHookInfo<'_>) {
    let context = get_current_context();

    eprintln!();
    print_header();
    print_panic_details(info);
    print_context_section(&context);
    print_backtrace_section();
    print_footer(&context);
}

fn rule(left: char, right: char) {
    eprintln!("{left}{}{right}", "═".repeat(WIDTH));
}

fn row(text: &str) {
    eprintln!("║  {:<width$}║", truncate(text, WIDTH - 2), width = WIDTH - 2);
}

fn print_header() {
    let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");

    rule('╔', '╗');
    row("SLIDECAL CRASH REPORT");
    rule('╠', '╣');
    row(&format!("Version: {VERSION}"));
    row(&format!("Platform: {}", std::env::consts::OS));
    row(&format!("Time: {timestamp}"));
    rule('╠', '╣');
}

fn print_panic_details(info: &PanicHookInfo<'_>) {
    row(&format!("PANIC: {}", extract_panic_message(info)));

    if let Some(location) = info.location() {
        row(&format!(
            "Location: {}:{}:{}",
            location.file(),
            location.line(),
            location.column()
        ));
    }
}

fn print_context_section(context: &RunContext) {
    rule('╠', '╣');
    row("OPERATION CONTEXT:");

    match &context.phase {
        Some(phase) => row(&format!("  Phase: {phase}")),
        None => row("  Phase: (not set - crash occurred before the run started)"),
    }

    if let Some(file) = &context.current_file {
        row(&format!("  File: {}", file.display()));
    }

    if context.total > 0 {
        row(&format!(
            "  Progress: {}",
            progress_line(context.processed, context.total)
        ));
    }
}

fn print_backtrace_section() {
    rule('╠', '╣');

    if std::env::var("RUST_BACKTRACE").is_ok() {
        row("STACK TRACE:");
        rule('╚', '╝');
        eprintln!();
        eprintln!("{}", std::backtrace::Backtrace::capture());
    } else {
        row("Run with RUST_BACKTRACE=1 for stack trace");
        rule('╚', '╝');
    }
}

fn print_footer(context: &RunContext) {
    if let Some(file) = &context.current_file {
        eprintln!();
        eprintln!("Include this crash report and the file: {}", file.display());
    }
}

fn progress_line(processed: usize, total: usize) -> String {
    let pct = (processed as f64 / total as f64 * 100.0) as usize;
    format!("{} / {} files ({}%)", processed, total, pct)
}

fn extract_panic_message(info: &PanicHookInfo<'_>) -> String {
    if let Some(s) = info.payload().downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = info.payload().downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_string() {
        assert_eq!(truncate("short", 10), "short");
    }

    #[test]
    fn test_truncate_exact_length() {
        assert_eq!(truncate("exactly10!", 10), "exactly10!");
    }

    #[test]
    fn test_truncate_long_string() {
        let result = truncate("this is a long string that needs truncation", 20);
        assert_eq!(result.chars().count(), 20);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_truncate_multibyte_path() {
        let result = truncate("/données/échantillon/résultats.json", 12);
        assert_eq!(result.chars().count(), 12);
    }

    #[test]
    fn test_progress_line() {
        assert_eq!(progress_line(1, 4), "1 / 4 files (25%)");
    }
}
