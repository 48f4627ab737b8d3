//! # Telemetry
//!
//! Logging is always on: events go through `tracing` and are printed by a
//! `tracing_subscriber::fmt` layer filtered by `RUST_LOG` (default `info`).
//!
//! The optional `metrics` feature additionally exports OpenTelemetry counters
//! to stdout every few seconds:
//!
//! - `requests`: lease requests received
//! - `granted`: requests answered with addresses
//! - `deferred`: requests told to come back later
//! - `invalid`: requests rejected for bad input
//! - `addresses_leased`: total addresses handed out
//!
//! ```bash
//! RUST_LOG=debug cargo run -p leasepool-server --features metrics
//! ```
//!
//! Without the feature the recording functions compile to no-ops.

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[cfg(feature = "metrics")]
use opentelemetry::metrics::{Counter, Meter};
#[cfg(feature = "metrics")]
use opentelemetry::{InstrumentationScope, KeyValue};
#[cfg(feature = "metrics")]
use opentelemetry_sdk::{Resource, metrics as sdkmetrics};
#[cfg(feature = "metrics")]
use opentelemetry_semantic_conventions as semvcns;
#[cfg(feature = "metrics")]
use std::sync::OnceLock;

pub struct TelemetryProviders {
    #[cfg(feature = "metrics")]
    pub meter_provider: sdkmetrics::SdkMeterProvider,
}

pub fn init_telemetry() -> anyhow::Result<TelemetryProviders> {
    #[cfg(feature = "metrics")]
    let meter_provider = init_metrics();

    let registry = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(
            tracing_subscriber::fmt::layer()
                .with_thread_ids(true)
                .with_line_number(true)
                .with_target(false)
                .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
                .with_file(true),
        );

    registry.try_init()?;

    #[cfg(feature = "metrics")]
    {
        let scope = InstrumentationScope::builder("leasepool")
            .with_version(env!("CARGO_PKG_VERSION"))
            .with_schema_url(semvcns::SCHEMA_URL)
            .build();
        opentelemetry::global::set_meter_provider(meter_provider.clone());
        init_metric_handles(opentelemetry::global::meter_with_scope(scope));
    }

    Ok(TelemetryProviders {
        #[cfg(feature = "metrics")]
        meter_provider,
    })
}

impl TelemetryProviders {
    /// Flushes and stops every exporter. Called once on shutdown.
    pub fn shutdown(self) {
        #[cfg(feature = "metrics")]
        {
            if let Err(err) = self.meter_provider.force_flush() {
                eprintln!("Error flushing metrics: {err:#?}");
            }
            if let Err(err) = self.meter_provider.shutdown() {
                eprintln!("Error shutting down meter: {err:#?}");
            }
        }
    }
}

#[cfg(feature = "metrics")]
fn resource() -> Resource {
    Resource::builder()
        .with_service_name("leasepool")
        .with_schema_url(
            [KeyValue::new(
                semvcns::resource::SERVICE_VERSION,
                env!("CARGO_PKG_VERSION"),
            )],
            semvcns::SCHEMA_URL,
        )
        .build()
}

#[cfg(feature = "metrics")]
fn init_metrics() -> sdkmetrics::SdkMeterProvider {
    let exporter = opentelemetry_stdout::MetricExporter::default();
    let reader = sdkmetrics::PeriodicReader::builder(exporter)
        .with_interval(std::time::Duration::from_secs(5))
        .build();

    sdkmetrics::SdkMeterProvider::builder()
        .with_resource(resource())
        .with_reader(reader)
        .build()
}

#[cfg(feature = "metrics")]
static REQUESTS: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static GRANTED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static DEFERRED: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static INVALID: OnceLock<Counter<u64>> = OnceLock::new();
#[cfg(feature = "metrics")]
static ADDRESSES_LEASED: OnceLock<Counter<u64>> = OnceLock::new();

#[cfg(feature = "metrics")]
fn init_metric_handles(meter: Meter) {
    let _ = REQUESTS.set(
        meter
            .u64_counter("requests")
            .with_description("Total lease requests")
            .build(),
    );

    let _ = GRANTED.set(
        meter
            .u64_counter("granted")
            .with_description("Lease requests answered with addresses")
            .build(),
    );

    let _ = DEFERRED.set(
        meter
            .u64_counter("deferred")
            .with_description("Lease requests told to come back later")
            .build(),
    );

    let _ = INVALID.set(
        meter
            .u64_counter("invalid")
            .with_description("Lease requests rejected for bad input")
            .build(),
    );

    let _ = ADDRESSES_LEASED.set(
        meter
            .u64_counter("addresses_leased")
            .with_description("Total addresses handed out")
            .build(),
    );
}

#[cfg(feature = "metrics")]
fn add(counter: &OnceLock<Counter<u64>>, value: u64) {
    if let Some(counter) = counter.get() {
        counter.add(value, &[]);
    }
}

#[cfg(feature = "metrics")]
pub fn increment_requests() {
    add(&REQUESTS, 1);
}

#[cfg(not(feature = "metrics"))]
pub fn increment_requests() {}

#[cfg(feature = "metrics")]
pub fn record_granted(addresses: usize) {
    add(&GRANTED, 1);
    add(&ADDRESSES_LEASED, addresses as u64);
}

#[cfg(not(feature = "metrics"))]
pub fn record_granted(_addresses: usize) {}

#[cfg(feature = "metrics")]
pub fn record_deferred() {
    add(&DEFERRED, 1);
}

#[cfg(not(feature = "metrics"))]
pub fn record_deferred() {}

#[cfg(feature = "metrics")]
pub fn record_invalid() {
    add(&INVALID, 1);
}

#[cfg(not(feature = "metrics"))]
pub fn record_invalid() {}
