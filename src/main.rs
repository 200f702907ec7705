use std::process::ExitCode;

use chrono::NaiveDate;
use clap::Parser;

use punchcard::config;
use punchcard::core::day;
use punchcard::prompt::TerminalPrompter;

/// Submit today's work to RubyTime and TickSpot.
#[derive(Parser)]
#[command(name = "punchcard", version, about)]
struct Cli {
    /// Day to book (e.g. 2026-02-24, 24.02.2026, yesterday). Defaults to today.
    #[arg(value_parser = day::parse_cli_day)]
    date: Option<NaiveDate>,
}

/// Set up logging to the systemd user journal (`journalctl --user -t punchcard -f`).
/// Wrapper filters: punchcard at info/debug (per config), everything else at warn.
fn init_logging() {
    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl log::Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("punchcard") {
                let max = if punchcard::debug_logging() { log::LevelFilter::Debug } else { log::LevelFilter::Info };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    // No journal socket (non-systemd host): run without a logger.
    let Ok(journal) = systemd_journal_logger::JournalLog::new() else {
        return;
    };
    let journal = journal.with_syslog_identifier("punchcard".to_string());

    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let today = day::today();
    let date = cli.date.unwrap_or(today);

    let mut prompter = TerminalPrompter;
    match punchcard::app::run(&mut prompter, &config::config_path(), date, today).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
