use chrono::Local;
use nu_ansi_term::{Color, Style};
use std::fmt;
use tracing::{Event, Level, Subscriber};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    fmt::{format::Writer, FmtContext, FormatEvent, FormatFields, FormattedFields},
    prelude::*,
    registry::LookupSpan,
    EnvFilter, Layer,
};

/// Target that marks an event as a success line.
pub const SUCCESS_TARGET: &str = "task_result";

/// Logs at info level on the success target, rendered as `[SUCCESS]`.
#[macro_export]
macro_rules! success {
    ($($arg:tt)+) => {
        ::tracing::info!(target: $crate::SUCCESS_TARGET, $($arg)+)
    };
}

// Dependency noise stays at WARN even in verbose mode.
const QUIET_DEPS: &str = "hyper=warn,reqwest=warn,rustls=warn,h2=warn,want=warn,mio=warn";

fn default_directives(verbose: bool) -> String {
    let base = if verbose { "trace" } else { "info" };
    format!("{},{}", base, QUIET_DEPS)
}

/// Installs the console layer and, with `log_dir`, an hourly rolling file
/// layer. `RUST_LOG` overrides the default filter.
///
/// The returned guard flushes the file writer and must be kept alive.
pub fn setup_logger(app_name: &str, verbose: bool, log_dir: Option<&str>) -> Option<WorkerGuard> {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));

    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true)
        .event_format(TerminalFormatter::new(app_name))
        .with_filter(console_filter);

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir).ok();
            let file_appender = tracing_appender::rolling::hourly(dir, "app");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .event_format(FileFormatter)
                .with_filter(EnvFilter::new(default_directives(false)));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(file_layer)
        .with(console_layer)
        .init();

    guard
}

// --- Formatters ---

#[derive(Default)]
struct EventVisitor {
    message: String,
    detail: Option<String>,
    error: Option<String>,
}

impl EventVisitor {
    fn store(&mut self, name: &str, value: String) {
        match name {
            "message" => self.message = value,
            "detail" => self.detail = Some(value),
            "error" => self.error = Some(value),
            _ => {}
        }
    }
}

impl tracing::field::Visit for EventVisitor {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn fmt::Debug) {
        self.store(field.name(), format!("{:?}", value));
    }
    fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
        self.store(field.name(), value.to_string());
    }
}

/// Level label used by both formatters.
fn level_label(event: &Event<'_>) -> &'static str {
    let metadata = event.metadata();
    if metadata.target() == SUCCESS_TARGET {
        return "SUCCESS";
    }
    match *metadata.level() {
        Level::ERROR => "ERROR",
        Level::WARN => "WARN",
        Level::INFO => "INFO",
        Level::DEBUG => "DEBUG",
        Level::TRACE => "VERBOSE",
    }
}

/// Fields of the spans enclosing the event, outermost first, e.g. `wallet_id=001`.
fn span_context<S, N>(ctx: &FmtContext<'_, S, N>) -> Option<String>
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    let scope = ctx.event_scope()?;
    let fields: Vec<String> = scope
        .from_root()
        .filter_map(|span| {
            let extensions = span.extensions();
            extensions
                .get::<FormattedFields<N>>()
                .filter(|f| !f.is_empty())
                .map(|f| f.to_string())
        })
        .collect();

    if fields.is_empty() {
        None
    } else {
        Some(fields.join(" "))
    }
}

fn level_style(label: &str) -> Style {
    match label {
        "INFO" => Color::LightBlue.bold(),
        "WARN" => Color::LightYellow.bold(),
        "ERROR" => Color::LightRed.bold(),
        "SUCCESS" => Color::LightGreen.bold(),
        "DEBUG" => Color::LightMagenta.bold(),
        "VERBOSE" => Color::Cyan.bold(),
        _ => Style::new().fg(Color::White),
    }
}

pub struct TerminalFormatter {
    header: String,
}

impl TerminalFormatter {
    pub fn new(app_name: &str) -> Self {
        Self {
            header: format!("◆ {}", app_name),
        }
    }
}

impl<S, N> FormatEvent<S, N> for TerminalFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);

        let label = level_label(event);
        let timestamp = Local::now().format("%H:%M:%S");

        write!(
            writer,
            "{} {} {} ",
            Color::Cyan.paint(&self.header),
            Color::DarkGray.paint(format!("[{}]", timestamp)),
            level_style(label).paint(format!("[{}]", label)),
        )?;
        if let Some(context) = span_context(ctx) {
            write!(writer, "{} ", Color::Purple.paint(format!("[{}]", context)))?;
        }
        write!(writer, "{}", visitor.message)?;
        if let Some(detail) = &visitor.detail {
            write!(writer, " {}", Color::Green.paint(detail))?;
        }
        if let Some(error) = &visitor.error {
            write!(writer, "\n{}", Color::Red.paint(error))?;
        }
        writeln!(writer)
    }
}

pub struct FileFormatter;

impl<S, N> FormatEvent<S, N> for FileFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        write!(writer, "{} [{}] ", timestamp, level_label(event))?;
        if let Some(context) = span_context(ctx) {
            write!(writer, "[{}] ", context)?;
        }

        let mut visitor = EventVisitor::default();
        event.record(&mut visitor);
        write!(writer, "{}", visitor.message)?;
        if let Some(detail) = &visitor.detail {
            write!(writer, " {}", detail)?;
        }
        if let Some(error) = &visitor.error {
            write!(writer, " | {}", error.replace('\n', " "))?;
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }
        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    #[test]
    fn test_file_format_renders_span_fields() {
        let captured = Captured::default();
        let sink = captured.clone();
        let subscriber = tracing_subscriber::registry().with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(move || sink.clone())
                .event_format(FileFormatter),
        );

        tracing::subscriber::with_default(subscriber, || {
            let span = tracing::info_span!("wallet", wallet_id = %"002");
            let _enter = span.enter();
            crate::success!(detail = "0xabc", "Node activated");
        });
        tracing::subscriber::with_default(
            tracing_subscriber::registry().with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer({
                        let sink = captured.clone();
                        move || sink.clone()
                    })
                    .event_format(FileFormatter),
            ),
            || tracing::warn!("outside"),
        );

        let text = captured.text();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[SUCCESS] [wallet_id=002] Node activated 0xabc"));
        assert!(lines[1].contains("[WARN] outside"));
        assert!(!lines[1].contains("wallet_id"));
    }

    #[test]
    fn test_default_directives_follow_verbosity() {
        assert!(default_directives(true).starts_with("trace,"));
        assert!(default_directives(false).starts_with("info,"));
        assert!(default_directives(true).contains("hyper=warn"));
    }

    #[test]
    fn test_level_styles_are_distinct() {
        let labels = ["INFO", "WARN", "ERROR", "SUCCESS", "DEBUG", "VERBOSE"];
        let painted: Vec<String> = labels
            .iter()
            .map(|l| level_style(l).paint("x").to_string())
            .collect();
        for (i, a) in painted.iter().enumerate() {
            for b in painted.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
