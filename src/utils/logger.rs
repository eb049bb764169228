use crate::config::app_config::LoggingConfig;
use crate::utils::error::{EtlError, Result};
use std::fmt::{self, Write as _};
use std::fs::OpenOptions;
use std::sync::Mutex;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::{self, FormatEvent, FormatFields};
use tracing_subscriber::fmt::{FmtContext, MakeWriter};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Timestamp,
    Name,
    Level,
    Message,
}

/// Event formatter driven by a `logging.format` template such as
/// `{timestamp} - {name} - {level} - {message}`. Unknown placeholders are
/// written out verbatim.
#[derive(Debug, Clone)]
pub struct TemplateFormat {
    segments: Vec<Segment>,
}

impl TemplateFormat {
    pub fn parse(template: &str) -> Self {
        let mut segments = Vec::new();
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let end = start + len;
            let placeholder = match &rest[start + 1..end] {
                "timestamp" => Some(Segment::Timestamp),
                "name" => Some(Segment::Name),
                "level" => Some(Segment::Level),
                "message" => Some(Segment::Message),
                _ => None,
            };

            match placeholder {
                Some(segment) => {
                    if start > 0 {
                        segments.push(Segment::Literal(rest[..start].to_string()));
                    }
                    segments.push(segment);
                }
                None => segments.push(Segment::Literal(rest[..=end].to_string())),
            }
            rest = &rest[end + 1..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Self { segments }
    }
}

fn level_label(level: &Level) -> &'static str {
    match *level {
        Level::TRACE => "TRACE",
        Level::DEBUG => "DEBUG",
        Level::INFO => "INFO",
        Level::WARN => "WARNING",
        Level::ERROR => "ERROR",
    }
}

impl<S, N> FormatEvent<S, N> for TemplateFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => writer.write_str(text)?,
                Segment::Timestamp => write!(
                    writer,
                    "{}",
                    chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f")
                )?,
                Segment::Name => writer.write_str(metadata.target())?,
                Segment::Level => writer.write_str(level_label(metadata.level()))?,
                Segment::Message => ctx.field_format().format_fields(writer.by_ref(), event)?,
            }
        }
        writeln!(writer)
    }
}

fn fmt_layer<S, W>(format: &str, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    if format.eq_ignore_ascii_case("json") {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(writer)
            .boxed()
    } else {
        tracing_subscriber::fmt::layer()
            .event_format(TemplateFormat::parse(format))
            .with_ansi(ansi)
            .with_writer(writer)
            .boxed()
    }
}

/// Installs the process-wide subscriber: stderr plus the optional append-only
/// log file. `--verbose` forces DEBUG; `RUST_LOG` overrides both.
pub fn init_cli_logger(config: &LoggingConfig, verbose: bool) -> Result<()> {
    let level = if verbose {
        "debug"
    } else {
        config.level.as_directive()
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ci_automation={}", level)));

    let file_layer = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| {
                    EtlError::config(format!("cannot open log file {}: {}", path.display(), e))
                })?;
            Some(fmt_layer(&config.format, Mutex::new(file), false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer(&config.format, std::io::stderr, true))
        .with(file_layer)
        .try_init()
        .map_err(|e| EtlError::config(format!("logging already initialized: {}", e)))
}
