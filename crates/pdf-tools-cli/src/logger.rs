use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};
use std::io::Write;

/// Logger writing timestamped records to stderr
pub struct CliLogger {
    max_level: LevelFilter,
}

impl CliLogger {
    /// Level for the `-q` / `-v` flags: quiet shows errors only, each `-v`
    /// adds one level above info
    pub fn level_for(quiet: bool, verbose: u8) -> LevelFilter {
        if quiet {
            return LevelFilter::Error;
        }
        match verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn new(max_level: LevelFilter) -> Self {
        Self { max_level }
    }

    pub fn init(self) -> Result<(), log::SetLoggerError> {
        let max_level = self.max_level;
        log::set_boxed_logger(Box::new(self))?;
        log::set_max_level(max_level);
        Ok(())
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let mut stderr = std::io::stderr().lock();
        // Info lines are the normal progress output and stay unadorned
        let _ = if record.level() == Level::Info && self.max_level <= LevelFilter::Info {
            writeln!(stderr, "{}", record.args())
        } else {
            writeln!(
                stderr,
                "{} {:<5} {}: {}",
                Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                record.args()
            )
        };
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}
