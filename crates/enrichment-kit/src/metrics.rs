//! RED metrics: a request counter and a latency histogram.
//!
//! The registry owns its own Prometheus recorder instead of installing the
//! process-global one, so every router (and every test) gets isolated state.

use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{
    BuildError, Matcher, PrometheusBuilder, PrometheusHandle, PrometheusRecorder,
};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

/// Counter labelled by `method`, `endpoint` and `status`.
pub const HTTP_REQUESTS_TOTAL: &str = "http_requests_total";
/// Histogram labelled by `endpoint`, in seconds.
pub const HTTP_REQUEST_DURATION_SECONDS: &str = "http_request_duration_seconds";
/// Content type of the text exposition format.
pub const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

const DURATION_BUCKETS: [f64; 14] = [
    0.005, 0.01, 0.025, 0.05, 0.075, 0.1, 0.25, 0.5, 0.75, 1.0, 2.5, 5.0, 7.5, 10.0,
];

/// Failed to build the Prometheus recorder.
#[derive(Debug)]
pub struct MetricsError(BuildError);

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Failed to build metrics recorder: {}", self.0)
    }
}

impl std::error::Error for MetricsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Shared handle to the request metrics. Clones observe the same state.
#[derive(Clone)]
pub struct MetricsRegistry {
    recorder: Arc<PrometheusRecorder>,
    handle: PrometheusHandle,
}

impl fmt::Debug for MetricsRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsRegistry").finish_non_exhaustive()
    }
}

impl MetricsRegistry {
    pub fn new() -> Result<Self, MetricsError> {
        let recorder = PrometheusBuilder::new()
            .set_buckets_for_metric(
                Matcher::Full(HTTP_REQUEST_DURATION_SECONDS.to_string()),
                &DURATION_BUCKETS,
            )
            .map_err(MetricsError)?
            .build_recorder();
        let handle = recorder.handle();

        metrics::with_local_recorder(&recorder, || {
            describe_counter!(HTTP_REQUESTS_TOTAL, "Total HTTP Requests");
            describe_histogram!(HTTP_REQUEST_DURATION_SECONDS, "HTTP Request Duration");
        });

        Ok(Self {
            recorder: Arc::new(recorder),
            handle,
        })
    }

    pub fn increment_counter(&self, method: &str, endpoint: &str, status: u16) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            counter!(
                HTTP_REQUESTS_TOTAL,
                "method" => method.to_owned(),
                "endpoint" => endpoint.to_owned(),
                "status" => status.to_string()
            )
            .increment(1);
        });
    }

    pub fn observe_duration(&self, endpoint: &str, seconds: f64) {
        metrics::with_local_recorder(self.recorder.as_ref(), || {
            histogram!(HTTP_REQUEST_DURATION_SECONDS, "endpoint" => endpoint.to_owned())
                .record(seconds);
        });
    }

    /// Start timing a request against `endpoint`.
    pub fn start_timer<'a>(&'a self, method: &'a str, endpoint: &'a str) -> RequestTimer<'a> {
        RequestTimer {
            registry: self,
            method,
            endpoint,
            start: Instant::now(),
            counted: false,
        }
    }

    /// Cumulative state in Prometheus text exposition format.
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Scoped request timer.
///
/// The elapsed time is recorded when the timer is dropped, whichever way the
/// handler exits. [`RequestTimer::finish`] counts the request under its
/// resolved status; a timer dropped unfinished (the request timed out or the
/// client went away) is counted as `408`, so every observed duration has a
/// matching counter increment.
#[must_use = "dropping the timer immediately records a zero-length request"]
pub struct RequestTimer<'a> {
    registry: &'a MetricsRegistry,
    method: &'a str,
    endpoint: &'a str,
    start: Instant,
    counted: bool,
}

impl RequestTimer<'_> {
    pub fn finish(mut self, status: http::StatusCode) {
        self.count(status);
    }

    fn count(&mut self, status: http::StatusCode) {
        self.registry
            .increment_counter(self.method, self.endpoint, status.as_u16());
        self.counted = true;
    }
}

impl Drop for RequestTimer<'_> {
    fn drop(&mut self) {
        if !self.counted {
            self.count(http::StatusCode::REQUEST_TIMEOUT);
        }
        self.registry
            .observe_duration(self.endpoint, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;
    use std::time::Duration;

    /// Value of the first sample named `name` carrying every label in `labels`.
    fn sample(rendered: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
        rendered
            .lines()
            .filter(|line| line.starts_with(&format!("{name}{{")))
            .find(|line| {
                labels
                    .iter()
                    .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
            })
            .and_then(|line| line.rsplit(' ').next())
            .and_then(|value| value.parse().ok())
    }

    #[test]
    fn counter_is_keyed_by_method_endpoint_status() {
        let registry = MetricsRegistry::new().unwrap();
        registry.increment_counter("POST", "/enrich", 200);
        registry.increment_counter("POST", "/enrich", 200);
        registry.increment_counter("POST", "/enrich", 400);

        let rendered = registry.render();
        assert_eq!(
            sample(&rendered, HTTP_REQUESTS_TOTAL, &[("endpoint", "/enrich"), ("status", "200")]),
            Some(2.0)
        );
        assert_eq!(
            sample(&rendered, HTTP_REQUESTS_TOTAL, &[("method", "POST"), ("status", "400")]),
            Some(1.0)
        );
        assert!(rendered.contains("# HELP http_requests_total Total HTTP Requests"));
    }

    #[test]
    fn histogram_is_exported_with_buckets() {
        let registry = MetricsRegistry::new().unwrap();
        registry.observe_duration("/", 0.02);
        registry.observe_duration("/", 0.3);

        let rendered = registry.render();
        let count = format!("{HTTP_REQUEST_DURATION_SECONDS}_count");
        let bucket = format!("{HTTP_REQUEST_DURATION_SECONDS}_bucket");
        assert_eq!(sample(&rendered, &count, &[("endpoint", "/")]), Some(2.0));
        assert_eq!(
            sample(&rendered, &bucket, &[("endpoint", "/"), ("le", "0.025")]),
            Some(1.0)
        );
        assert_eq!(
            sample(&rendered, &bucket, &[("endpoint", "/"), ("le", "+Inf")]),
            Some(2.0)
        );
    }

    #[test]
    fn registries_are_isolated() {
        let first = MetricsRegistry::new().unwrap();
        let second = MetricsRegistry::new().unwrap();
        first.increment_counter("GET", "/", 200);

        assert!(sample(&second.render(), HTTP_REQUESTS_TOTAL, &[]).is_none());
    }

    #[test]
    fn unfinished_timer_is_timed_and_counted_as_timeout() {
        let registry = MetricsRegistry::new().unwrap();
        {
            let _timer = registry.start_timer("POST", "/enrich");
            std::thread::sleep(Duration::from_millis(5));
        }

        let rendered = registry.render();
        let count = format!("{HTTP_REQUEST_DURATION_SECONDS}_count");
        let sum = format!("{HTTP_REQUEST_DURATION_SECONDS}_sum");
        assert_eq!(sample(&rendered, &count, &[("endpoint", "/enrich")]), Some(1.0));
        assert!(sample(&rendered, &sum, &[("endpoint", "/enrich")]).unwrap() >= 0.005);
        assert_eq!(
            sample(
                &rendered,
                HTTP_REQUESTS_TOTAL,
                &[("method", "POST"), ("endpoint", "/enrich"), ("status", "408")]
            ),
            Some(1.0)
        );
    }

    #[test]
    fn timer_finish_counts_resolved_status() {
        let registry = MetricsRegistry::new().unwrap();
        registry.start_timer("GET", "/").finish(StatusCode::OK);

        let rendered = registry.render();
        assert_eq!(
            sample(
                &rendered,
                HTTP_REQUESTS_TOTAL,
                &[("method", "GET"), ("endpoint", "/"), ("status", "200")]
            ),
            Some(1.0)
        );
        assert!(sample(&rendered, HTTP_REQUESTS_TOTAL, &[("status", "408")]).is_none());
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let registry = MetricsRegistry::new().unwrap();
        let threads: Vec<_> = (0..8)
            .map(|_| {
                let registry = registry.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        registry.increment_counter("GET", "/", 200);
                    }
                })
            })
            .collect();
        for thread in threads {
            thread.join().unwrap();
        }

        assert_eq!(
            sample(&registry.render(), HTTP_REQUESTS_TOTAL, &[("endpoint", "/")]),
            Some(2000.0)
        );
    }
}
