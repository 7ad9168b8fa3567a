//! # Kernel Console Logging
//!
//! Routes the `log` facade to the platform console.
//!
//! The console itself (a serial line on real hardware, stdout in hosted
//! tests) is reached through a plain `fn(&str)` sink, so this crate has no
//! knowledge of the device behind it.
//!
//! ## Usage
//!
//! ```rust
//! use kernel_console::ConsoleLogger;
//! use log::{LevelFilter, info};
//!
//! fn serial_write(s: &str) {
//!     print!("{s}");
//! }
//!
//! static LOGGER: ConsoleLogger = ConsoleLogger::new(LevelFilter::Debug, serial_write);
//!
//! LOGGER.init().expect("logger initialization");
//! info!("vm: coremap ready");
//! ```
//!
//! [`console_print!`] writes directly to the sink installed by
//! [`ConsoleLogger::init`], bypassing level filtering.
//!
//! ## `enabled` Feature (default)
//!
//! Without it, [`console_print!`] and the logger's output path compile to
//! no-ops; records are still accepted by the facade but dropped.

#![cfg_attr(not(any(test, doctest)), no_std)]

mod logger;

pub use logger::ConsoleLogger;

/// Signature of a console output routine.
pub type ConsoleSink = fn(&str);

#[cfg(feature = "enabled")]
#[doc(hidden)]
pub mod console_fmt {
    use crate::ConsoleSink;
    use core::fmt::{self, Write};
    use kernel_sync::SyncOnceCell;

    static SINK: SyncOnceCell<ConsoleSink> = SyncOnceCell::new();

    /// Installs the global sink. Only the first call has an effect.
    pub fn install(sink: ConsoleSink) {
        let _ = SINK.set(sink);
    }

    pub struct SinkWriter(pub ConsoleSink);

    impl Write for SinkWriter {
        #[inline]
        fn write_str(&mut self, s: &str) -> fmt::Result {
            (self.0)(s);
            Ok(())
        }
    }

    #[inline]
    pub fn write_to(sink: ConsoleSink, args: fmt::Arguments) {
        // Best-effort; a console has nowhere to report its own failures.
        let _ = fmt::write(&mut SinkWriter(sink), args);
    }

    #[inline]
    pub fn console_write(args: fmt::Arguments) {
        if let Some(sink) = SINK.get() {
            write_to(*sink, args);
        }
    }
}

#[cfg(not(feature = "enabled"))]
#[doc(hidden)]
pub mod console_fmt {
    use crate::ConsoleSink;
    use core::fmt;

    #[inline]
    pub fn install(_: ConsoleSink) {}

    #[inline]
    pub fn write_to(_: ConsoleSink, _: fmt::Arguments) {}

    #[inline]
    pub fn console_write(_: fmt::Arguments) {}
}

/// Formats straight to the console sink.
#[macro_export]
macro_rules! console_print {
    ($($arg:tt)*) => {{
        $crate::console_fmt::console_write(core::format_args!($($arg)*));
    }};
}
