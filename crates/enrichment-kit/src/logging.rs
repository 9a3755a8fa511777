//! Logging initialization and the JSON line event format.

use serde::Deserialize;
use std::str::FromStr;

/// Output format for log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum LogFormat {
    Text,
    #[default]
    Json,
}

impl FromStr for LogFormat {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s.to_owned()))
    }
}

impl From<String> for LogFormat {
    fn from(value: String) -> Self {
        if value.eq_ignore_ascii_case("text") || value.eq_ignore_ascii_case("pretty") {
            Self::Text
        } else {
            Self::Json
        }
    }
}

#[cfg(feature = "tracing")]
pub use self::json::JsonLineFormat;

/// Process-wide logging setup.
///
/// ```ignore
/// Logging::new("enrichment-api", "v1.0.0")
///     .format(LogFormat::Json)
///     .filter("info")
///     .init();
/// ```
#[cfg(feature = "tracing")]
#[derive(Debug, Clone)]
pub struct Logging {
    format: LogFormat,
    filter: String,
    app: String,
    version: String,
}

#[cfg(feature = "tracing")]
impl Logging {
    pub fn new(app: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            format: LogFormat::default(),
            filter: "info".to_string(),
            app: app.into(),
            version: version.into(),
        }
    }

    pub fn format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Fallback filter directive, used when `RUST_LOG` is unset or invalid.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Install the global subscriber. Later calls are no-ops.
    pub fn init(self) {
        use tracing_subscriber::{fmt, EnvFilter};

        let env_filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter));

        let _ = match self.format {
            LogFormat::Text => fmt().with_env_filter(env_filter).try_init(),
            LogFormat::Json => fmt()
                .event_format(JsonLineFormat::new(self.app, self.version))
                .with_env_filter(env_filter)
                .try_init(),
        };
    }
}

#[cfg(feature = "tracing")]
mod json {
    use chrono::{SecondsFormat, Utc};
    use serde::Serialize;
    use serde_json::{Map, Value};
    use std::fmt::{self, Write as _};
    use tracing::field::{Field, Visit};
    use tracing::{Event, Subscriber};
    use tracing_subscriber::fmt::format::Writer;
    use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields};
    use tracing_subscriber::registry::LookupSpan;

    /// Renders every event as a single JSON object followed by a newline.
    ///
    /// Fixed keys: `level`, `logger`, `message`, `timestamp`, `app`, `version`.
    /// An `exception` field on the event is lifted to a top-level key; any
    /// other fields go under `fields`, and the innermost span under `span`.
    #[derive(Debug, Clone)]
    pub struct JsonLineFormat {
        app: String,
        version: String,
    }

    impl JsonLineFormat {
        pub fn new(app: impl Into<String>, version: impl Into<String>) -> Self {
            Self {
                app: app.into(),
                version: version.into(),
            }
        }
    }

    #[derive(Serialize)]
    struct LogRecord<'a> {
        level: &'a str,
        logger: &'a str,
        message: String,
        timestamp: String,
        app: &'a str,
        version: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        exception: Option<String>,
        #[serde(skip_serializing_if = "Map::is_empty")]
        fields: Map<String, Value>,
        #[serde(skip_serializing_if = "Option::is_none")]
        span: Option<String>,
    }

    #[derive(Default)]
    struct RecordVisitor {
        message: String,
        exception: Option<String>,
        fields: Map<String, Value>,
    }

    impl RecordVisitor {
        fn insert(&mut self, field: &Field, value: Value) {
            match field.name() {
                "message" => self.message = into_text(value),
                "exception" => self.exception = Some(into_text(value)),
                name if name.starts_with("log.") => {}
                name => {
                    self.fields.insert(name.to_owned(), value);
                }
            }
        }
    }

    fn into_text(value: Value) -> String {
        match value {
            Value::String(s) => s,
            other => other.to_string(),
        }
    }

    impl Visit for RecordVisitor {
        fn record_str(&mut self, field: &Field, value: &str) {
            self.insert(field, Value::from(value));
        }

        fn record_i64(&mut self, field: &Field, value: i64) {
            self.insert(field, Value::from(value));
        }

        fn record_u64(&mut self, field: &Field, value: u64) {
            self.insert(field, Value::from(value));
        }

        fn record_f64(&mut self, field: &Field, value: f64) {
            self.insert(field, Value::from(value));
        }

        fn record_bool(&mut self, field: &Field, value: bool) {
            self.insert(field, Value::from(value));
        }

        fn record_error(&mut self, field: &Field, value: &(dyn std::error::Error + 'static)) {
            self.insert(field, Value::from(value.to_string()));
        }

        fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
            self.insert(field, Value::from(format!("{value:?}")));
        }
    }

    impl<S, N> FormatEvent<S, N> for JsonLineFormat
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
            let metadata = event.metadata();
            let mut visitor = RecordVisitor::default();
            event.record(&mut visitor);

            let span = ctx.lookup_current().map(|span| {
                let extensions = span.extensions();
                let mut rendered = span.name().to_owned();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        let _ = write!(rendered, "{{{}}}", fields.as_str());
                    }
                }
                rendered
            });

            let record = LogRecord {
                level: metadata.level().as_str(),
                logger: metadata.target(),
                message: visitor.message,
                timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
                app: &self.app,
                version: &self.version,
                exception: visitor.exception,
                fields: visitor.fields,
                span,
            };

            let line = serde_json::to_string(&record).map_err(|_| fmt::Error)?;
            writeln!(writer, "{line}")
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use std::io;
        use std::sync::{Arc, Mutex};
        use tracing_subscriber::fmt::MakeWriter;

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Captured {
            fn lines(&self) -> Vec<Value> {
                let bytes = self.0.lock().unwrap().clone();
                String::from_utf8(bytes)
                    .unwrap()
                    .lines()
                    .map(|line| serde_json::from_str(line).unwrap())
                    .collect()
            }
        }

        impl io::Write for Captured {
            fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> io::Result<()> {
                Ok(())
            }
        }

        impl<'a> MakeWriter<'a> for Captured {
            type Writer = Captured;

            fn make_writer(&'a self) -> Self::Writer {
                self.clone()
            }
        }

        fn capture(f: impl FnOnce()) -> Vec<Value> {
            let captured = Captured::default();
            let subscriber = tracing_subscriber::fmt()
                .event_format(JsonLineFormat::new("enrichment-api", "v9.9.9"))
                .with_writer(captured.clone())
                .finish();
            tracing::subscriber::with_default(subscriber, f);
            captured.lines()
        }

        #[test]
        fn one_line_per_event_with_fixed_fields() {
            let lines = capture(|| {
                tracing::info!("first");
                tracing::warn!("second");
            });

            assert_eq!(lines.len(), 2);
            let first = &lines[0];
            assert_eq!(first["level"], "INFO");
            assert_eq!(first["message"], "first");
            assert_eq!(first["app"], "enrichment-api");
            assert_eq!(first["version"], "v9.9.9");
            assert!(first["logger"].as_str().unwrap().contains("logging"));
            assert!(first["timestamp"].as_str().unwrap().ends_with('Z'));
            assert!(first.get("exception").is_none());
            assert!(first.get("fields").is_none());
            assert_eq!(lines[1]["level"], "WARN");
        }

        #[test]
        fn exception_is_lifted_and_extra_fields_kept() {
            let lines = capture(|| {
                let err = io::Error::new(io::ErrorKind::Other, "disk on fire");
                tracing::error!(exception = %err, attempt = 3, "write failed");
            });

            let line = &lines[0];
            assert_eq!(line["level"], "ERROR");
            assert_eq!(line["message"], "write failed");
            assert_eq!(line["exception"], "disk on fire");
            assert_eq!(line["fields"]["attempt"], 3);
        }

        #[test]
        fn enclosing_span_is_reported() {
            let lines = capture(|| {
                let span = tracing::info_span!("http", path = "/enrich");
                let _entered = span.enter();
                tracing::info!("inside");
            });

            let span = lines[0]["span"].as_str().unwrap();
            assert!(span.starts_with("http{"));
            assert!(span.contains("/enrich"));
        }
    }
}
