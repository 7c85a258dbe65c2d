use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::info;

// Declare the static OnceCell to hold the Metrics.
static METRICS_INSTANCE: OnceCell<Arc<Metrics>> = OnceCell::const_new();

/// Asynchronously initializes and gets a reference to the static `Metrics`.
pub async fn get_metrics() -> &'static Arc<Metrics> {
    METRICS_INSTANCE
        .get_or_init(|| async {
            info!("Initializing Metrics ...");
            Metrics::new()
        })
        .await
}

#[derive(Clone)]
pub struct Metrics {
    pub registry: Registry,

    // Broker metrics
    pub broker_requests: IntCounterVec,

    // Authorization server metrics
    pub authority_requests: IntCounterVec,
    pub authority_failures: IntCounterVec,
    pub authority_duration: HistogramVec,

    // Cache metrics
    pub cached_credentials: IntGauge,

    // Config/runtime
    pub parse_failures: IntCounter,
    pub config_validation_errors: IntCounter,
    pub up: IntGauge,
}

impl Metrics {
    fn new() -> Arc<Self> {
        let registry = Registry::new_custom(Some("tokenbroker".into()), None).unwrap();

        let metrics: Arc<Metrics> = Arc::new(Self {
            // Broker
            broker_requests: IntCounterVec::new(Opts::new("broker_requests_total", "Token requests by outcome"), &["outcome"]).unwrap(),

            // Authority
            authority_requests: IntCounterVec::new(Opts::new("authority_requests_total", "Outbound token endpoint calls by grant"), &["grant"]).unwrap(),
            authority_failures: IntCounterVec::new(Opts::new("authority_failures_total", "Token endpoint failures by grant and reason"), &["grant", "reason"]).unwrap(),
            authority_duration: HistogramVec::new(HistogramOpts::new("authority_request_duration_seconds", "Token endpoint call duration seconds").buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]), &["grant"]).unwrap(),

            // Cache
            cached_credentials: IntGauge::new("cached_credentials", "Distinct credentials holding a cached token").unwrap(),

            // Config/runtime
            parse_failures: IntCounter::new("parse_failures_total", "Config parse failures").unwrap(),
            config_validation_errors: IntCounter::new("config_validation_errors_total", "Validation errors during startup").unwrap(),
            up: IntGauge::new("up", "1 if service is healthy").unwrap(),

            registry,
        });

        // Register all metrics in the registry
        let reg = &metrics.registry;
        reg.register(Box::new(metrics.broker_requests.clone())).unwrap();
        reg.register(Box::new(metrics.authority_requests.clone())).unwrap();
        reg.register(Box::new(metrics.authority_failures.clone())).unwrap();
        reg.register(Box::new(metrics.authority_duration.clone())).unwrap();
        reg.register(Box::new(metrics.cached_credentials.clone())).unwrap();
        reg.register(Box::new(metrics.parse_failures.clone())).unwrap();
        reg.register(Box::new(metrics.config_validation_errors.clone())).unwrap();
        reg.register(Box::new(metrics.up.clone())).unwrap();

        metrics
    }
}
