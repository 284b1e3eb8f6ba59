//! Logging init: browser console on wasm32, stderr for the CLI.
//!
//! The library only emits `tracing` events; nothing is printed until one of
//! these installs a subscriber.

use tracing_subscriber::EnvFilter;

/// Filter used when neither `RUST_LOG` nor an explicit directive is given.
pub const DEFAULT_FILTER: &str = "info,csvcalc=debug";

fn filter_or_default(directive: Option<&str>) -> EnvFilter {
    match directive {
        Some(d) => EnvFilter::try_new(d).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
        None => {
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
        }
    }
}

/// Initialize logging to stderr. Honors `RUST_LOG`.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter_or_default(None))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}

#[cfg(target_arch = "wasm32")]
pub use console::init_console_logging;

#[cfg(target_arch = "wasm32")]
mod console {
    use std::io;

    use tracing::{Level, Metadata};
    use tracing_subscriber::fmt::MakeWriter;
    use wasm_bindgen::JsValue;

    /// Buffers one formatted event and hands it to `console` on drop.
    pub struct ConsoleWriter {
        level: Level,
        buf: Vec<u8>,
    }

    impl io::Write for ConsoleWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.buf.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Drop for ConsoleWriter {
        fn drop(&mut self) {
            if self.buf.is_empty() {
                return;
            }
            let line = String::from_utf8_lossy(&self.buf);
            let msg = JsValue::from_str(line.trim_end());
            if self.level == Level::ERROR {
                web_sys::console::error_1(&msg);
            } else if self.level == Level::WARN {
                web_sys::console::warn_1(&msg);
            } else {
                web_sys::console::log_1(&msg);
            }
        }
    }

    struct ConsoleMakeWriter;

    impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
        type Writer = ConsoleWriter;

        fn make_writer(&'a self) -> Self::Writer {
            ConsoleWriter {
                level: Level::INFO,
                buf: Vec::new(),
            }
        }

        fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
            ConsoleWriter {
                level: *meta.level(),
                buf: Vec::new(),
            }
        }
    }

    /// Initialize logging to the browser console.
    ///
    /// No timestamps: the system clock is unavailable on wasm32. Calling this
    /// more than once is harmless.
    pub fn init_console_logging(directive: Option<&str>) {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(super::filter_or_default(directive))
            .with_writer(ConsoleMakeWriter)
            .with_ansi(false)
            .without_time()
            .try_init();
    }
}
