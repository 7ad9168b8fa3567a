use crate::{ConsoleSink, console_fmt};
use log::{LevelFilter, Log, Metadata, Record, SetLoggerError};

/// `log::Log` backend writing `[LEVEL] target: message` lines to a console.
pub struct ConsoleLogger {
    max_level: LevelFilter,
    sink: ConsoleSink,
}

impl ConsoleLogger {
    #[must_use]
    pub const fn new(max_level: LevelFilter, sink: ConsoleSink) -> Self {
        Self { max_level, sink }
    }

    #[must_use]
    pub const fn max_level(&self) -> LevelFilter {
        self.max_level
    }

    /// Registers this logger with the `log` facade and installs its sink for
    /// [`console_print!`](crate::console_print). Call once during early init.
    ///
    /// # Errors
    /// A logger was already registered.
    pub fn init(&'static self) -> Result<(), SetLoggerError> {
        log::set_logger(self)?;
        log::set_max_level(self.max_level);
        console_fmt::install(self.sink);
        Ok(())
    }
}

impl Log for ConsoleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.max_level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        console_fmt::write_to(
            self.sink,
            format_args!(
                "[{}] {}: {}\n",
                record.level(),
                record.target(),
                record.args()
            ),
        );
    }

    fn flush(&self) {}
}
