use tracing_appender::{
    non_blocking,
    non_blocking::{NonBlocking, WorkerGuard},
    rolling,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer, Registry};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// A daily rolling log file under the log directory
struct LogFile {
    subdir: &'static str,
    name: &'static str,
    json: bool,
    errors_only: bool,
}

const LOG_FILES: [LogFile; 4] = [
    LogFile { subdir: "", name: "doctor-feedback.log", json: false, errors_only: false },
    LogFile { subdir: "error", name: "doctor-feedback-error.log", json: false, errors_only: true },
    LogFile { subdir: "json", name: "doctor-feedback.json", json: true, errors_only: false },
    LogFile { subdir: "error/json", name: "doctor-feedback-error.json", json: true, errors_only: true },
];

/// Holds the file writer guards; dropping it flushes and stops the writers.
pub struct Logger {
    pub guards: Vec<WorkerGuard>,
}

impl Logger {
    pub fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let guards = Self::setup_logging()?;
        Ok(Logger { guards })
    }

    /// Pretty console output plus every file in [`LOG_FILES`]. `RUST_LOG`
    /// drives the console, `FILE_LOG_LEVEL` and `ERROR_FILE_LOG_LEVEL` the files.
    pub fn setup_logging() -> Result<Vec<WorkerGuard>, Box<dyn std::error::Error>> {
        let log_dir = std::env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_string());
        std::fs::create_dir_all(&log_dir)?;

        let console_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("info,doctor_feedback_backend=debug"));
        let file_level = std::env::var("FILE_LOG_LEVEL").unwrap_or_else(|_| "debug".to_string());
        let error_level = std::env::var("ERROR_FILE_LOG_LEVEL").unwrap_or_else(|_| "error".to_string());

        let mut layers: Vec<BoxedLayer> = vec![fmt::layer()
            .pretty()
            .with_target(true)
            .with_thread_ids(true)
            .with_ansi(true)
            .with_filter(console_filter)
            .boxed()];
        let mut guards = Vec::with_capacity(LOG_FILES.len());

        for file in &LOG_FILES {
            let dir = std::path::Path::new(&log_dir).join(file.subdir);
            let (writer, guard) = non_blocking(rolling::daily(dir, file.name));
            let level = if file.errors_only { &error_level } else { &file_level };
            layers.push(file_layer(writer, file, level));
            guards.push(guard);
        }

        tracing_subscriber::registry().with(layers).try_init()?;
        Ok(guards)
    }
}

/// Plain or JSON lines without colour. Error streams leave out thread ids.
fn file_layer(writer: NonBlocking, file: &LogFile, level: &str) -> BoxedLayer {
    let layer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(!file.errors_only)
        .with_file(true)
        .with_line_number(true);
    let filter = EnvFilter::new(level);
    if file.json {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.with_filter(filter).boxed()
    }
}
