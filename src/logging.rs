use std::fmt::Arguments;
use std::io::Write;

use log::LevelFilter;

/// Where a client's diagnostics go. Chosen once when the client is built,
/// so two clients in the same process can log differently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    Enabled,
    Discard,
}

impl LogSink {
    pub fn from_debug(debug: bool) -> LogSink {
        if debug {
            LogSink::Enabled
        } else {
            LogSink::Discard
        }
    }

    pub fn is_enabled(&self) -> bool {
        *self == LogSink::Enabled
    }

    pub fn debug(&self, args: Arguments<'_>) {
        if self.is_enabled() {
            log::debug!(target: "httpglance", "{}", args);
        }
    }

    pub fn warn(&self, args: Arguments<'_>) {
        if self.is_enabled() {
            log::warn!(target: "httpglance", "{}", args);
        }
    }

    // errors go out regardless of the sink
    pub fn error(&self, args: Arguments<'_>) {
        log::error!(target: "httpglance", "{}", args);
    }
}

/// Installs the process logger for the binary. `RUST_LOG` is read first and
/// then overridden for this crate by the `--debug` flag.
pub fn init_logger(debug: bool) -> Result<(), log::SetLoggerError> {
    let level = if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };

    let mut builder = env_logger::Builder::from_default_env();
    builder.filter_module("httpglance", level);
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    builder.format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {} {}",
            chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"),
            record.level(),
            record.target(),
            record.args()
        )
    });
    builder.try_init()
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(true, LogSink::Enabled ; "debug on")]
    #[test_case(false, LogSink::Discard ; "debug off")]
    fn sink_follows_debug_flag(debug: bool, expected: LogSink) {
        let sink = LogSink::from_debug(debug);
        assert_eq!(sink, expected);
        assert_eq!(sink.is_enabled(), debug);
    }
}
