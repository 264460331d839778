use chrono::Local;
use log::{Level, LevelFilter, Metadata, Record};

/// Timestamped log lines on stderr
pub struct CliLogger {
    level: LevelFilter,
}

impl CliLogger {
    /// Map `-v` occurrences to a level: warn, info, debug, trace
    pub fn level_for(verbosity: u8) -> LevelFilter {
        match verbosity {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    pub fn init(verbosity: u8) -> Result<(), log::SetLoggerError> {
        let level = Self::level_for(verbosity);
        log::set_boxed_logger(Box::new(Self { level }))?;
        log::set_max_level(level);
        Ok(())
    }
}

impl log::Log for CliLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let timestamp = Local::now().format("%H:%M:%S%.3f");
        match record.level() {
            Level::Error | Level::Warn | Level::Info => {
                eprintln!("{} {:<5} {}", timestamp, record.level(), record.args())
            }
            Level::Debug | Level::Trace => eprintln!(
                "{} {:<5} [{}] {}",
                timestamp,
                record.level(),
                record.target(),
                record.args()
            ),
        }
    }

    fn flush(&self) {}
}
