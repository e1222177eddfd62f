use cfg_if::cfg_if;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

const DEFAULT_FILTER: &str = "info";

/// `RUST_LOG` if set, otherwise `default`
fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
        /// Routes `tracing` to the browser console. Calling it twice is harmless.
        pub fn init() {
            let wasm_layer = tracing_wasm::WASMLayer::new(tracing_wasm::WASMLayerConfig::default());
            let installed = tracing_subscriber::registry()
                .with(env_filter(DEFAULT_FILTER))
                .with(wasm_layer)
                .try_init()
                .is_ok();

            #[cfg(feature = "console_error_panic_hook")]
            console_error_panic_hook::set_once();

            if installed {
                tracing::info!("voxelite {} logging to console", env!("CARGO_PKG_VERSION"));
            }
        }
    } else {
        use std::env;
        use std::ffi::OsStr;
        use std::io;
        use std::path::{Path, PathBuf};

        use once_cell::sync::OnceCell;
        use tracing_appender::non_blocking::WorkerGuard;
        use tracing_subscriber::fmt;

        /// Keeps the file writer flushing until the process exits
        static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

        /// `RUST_LOG_FILE`, default `logs/app.log`
        fn log_file_path() -> PathBuf {
            env::var_os("RUST_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("logs/app.log"))
        }

        /// Logs to stderr and to a daily-rolling file. Calling it twice is harmless.
        pub fn init() {
            let path = log_file_path();
            let directory = path.parent().unwrap_or(Path::new("."));
            let file_name = path.file_name().unwrap_or(OsStr::new("app.log"));
            let (file_writer, guard) =
                tracing_appender::non_blocking(tracing_appender::rolling::daily(directory, file_name));

            let console_layer = fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .compact();
            let file_layer = fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .compact();

            let installed = tracing_subscriber::registry()
                .with(env_filter(DEFAULT_FILTER))
                .with(console_layer)
                .with(file_layer)
                .try_init()
                .is_ok();
            if !installed {
                return;
            }

            let _ = FILE_GUARD.set(guard);
            std::panic::set_hook(Box::new(log_panic));
            tracing::info!("voxelite {} logging to {}", env!("CARGO_PKG_VERSION"), path.display());
        }

        fn log_panic(info: &std::panic::PanicHookInfo<'_>) {
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "<non-string panic>".to_string());
            let location = info
                .location()
                .map(|l| format!("{}:{}:{}", l.file(), l.line(), l.column()))
                .unwrap_or_default();
            let backtrace = std::backtrace::Backtrace::force_capture();
            tracing::error!("panic at {} {}\nBacktrace:\n{}", location, message, backtrace);
        }
    }
}
