//! Scrape facade: fetch, translate, and render all configured upstreams.

use std::io::Write;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::config::{ConfigError, PoolConfig};
use crate::fetcher::StatsFetcher;
use crate::mapping::{self, GaugeSpec, MetricSample};

/// Per-address availability gauge.
pub const UP: GaugeSpec = GaugeSpec {
    name: "cpool_up",
    help: "Whether the last stats fetch for this pool succeeded",
};

/// Scrape facade over all configured upstream pools.
///
/// Holds no upstream state: configuration is re-resolved and every stats
/// payload is fetched fresh on each scrape. The only retained state is the
/// exporter's own activity counters.
pub struct StatsCollector {
    fetcher: StatsFetcher,
    stats: RwLock<CollectorStats>,
}

/// Exporter self-telemetry.
#[derive(Debug, Clone, Copy, Default)]
pub struct CollectorStats {
    /// Scrapes served.
    pub scrapes: u64,
    /// Per-address fetch failures across all scrapes.
    pub pool_errors: u64,
}

impl StatsCollector {
    /// Create a new collector.
    pub fn new() -> Self {
        Self {
            fetcher: StatsFetcher::new(),
            stats: RwLock::new(CollectorStats::default()),
        }
    }

    /// Run one scrape cycle: resolve configuration from the environment,
    /// visit every address, render the exposition.
    pub async fn scrape(&self) -> Result<String, ConfigError> {
        let config = PoolConfig::from_env()?;
        Ok(self.scrape_with(&config).await)
    }

    /// Scrape with an already-resolved configuration.
    ///
    /// Addresses are visited strictly sequentially, each fetch completing
    /// before the next begins. A failing address is skipped and reported
    /// through [`UP`] instead of aborting the scrape, so one unreachable
    /// pool never hides the metrics of the others.
    pub async fn scrape_with(&self, config: &PoolConfig) -> String {
        let mut samples =
            Vec::with_capacity(config.dial_addrs.len() * mapping::GAUGES.len());
        let mut up = Vec::with_capacity(config.dial_addrs.len());
        let mut errors = 0u64;

        for addr in &config.dial_addrs {
            match self.fetcher.fetch(addr, config).await {
                Ok(response) => {
                    debug!(pool = %addr, "Fetched pool stats");
                    samples.extend(mapping::translate(addr, &response));
                    up.push(MetricSample {
                        spec: UP,
                        value: 1.0,
                        pool: addr.clone(),
                    });
                }
                Err(e) => {
                    warn!(pool = %addr, error = %e, "Skipping pool after failed fetch");
                    up.push(MetricSample {
                        spec: UP,
                        value: 0.0,
                        pool: addr.clone(),
                    });
                    errors += 1;
                }
            }
        }

        let totals = {
            let mut stats = self.stats.write();
            stats.scrapes += 1;
            stats.pool_errors += errors;
            *stats
        };

        render(&samples, &up, totals)
    }

    /// Exporter self-telemetry counters.
    pub fn stats(&self) -> CollectorStats {
        *self.stats.read()
    }
}

impl Default for StatsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Shareable collector handle.
pub type SharedCollector = Arc<StatsCollector>;

/// Render samples in Prometheus text exposition format.
///
/// Pool gauges come first in their fixed order, then the per-address
/// availability gauge, then the exporter counters.
fn render(samples: &[MetricSample], up: &[MetricSample], totals: CollectorStats) -> String {
    let mut output = Vec::with_capacity((samples.len() + up.len()) * 64 + 512);

    for spec in &mapping::GAUGES {
        write_metric(
            &mut output,
            spec,
            "gauge",
            samples.iter().filter(|s| s.spec.name == spec.name),
        );
    }
    write_metric(&mut output, &UP, "gauge", up.iter());

    writeln!(
        output,
        "# HELP cpool_exporter_scrapes_total Scrapes served by this exporter"
    )
    .ok();
    writeln!(output, "# TYPE cpool_exporter_scrapes_total counter").ok();
    writeln!(output, "cpool_exporter_scrapes_total {}", totals.scrapes).ok();

    writeln!(
        output,
        "# HELP cpool_exporter_pool_errors_total Failed pool fetches across all scrapes"
    )
    .ok();
    writeln!(output, "# TYPE cpool_exporter_pool_errors_total counter").ok();
    writeln!(
        output,
        "cpool_exporter_pool_errors_total {}",
        totals.pool_errors
    )
    .ok();

    String::from_utf8(output).unwrap_or_default()
}

/// Write one metric family: HELP/TYPE comments, then one line per sample.
fn write_metric<'a>(
    output: &mut Vec<u8>,
    spec: &GaugeSpec,
    metric_type: &str,
    samples: impl Iterator<Item = &'a MetricSample>,
) {
    let mut wrote_header = false;

    for sample in samples {
        if !wrote_header {
            writeln!(output, "# HELP {} {}", spec.name, spec.help).ok();
            writeln!(output, "# TYPE {} {}", spec.name, metric_type).ok();
            wrote_header = true;
        }

        writeln!(
            output,
            "{}{{pool=\"{}\"}} {}",
            spec.name,
            escape_label_value(&sample.pool),
            format_value(sample.value)
        )
        .ok();
    }
}

/// Escape special characters in label values.
fn escape_label_value(value: &str) -> String {
    let mut result = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => result.push_str("\\\\"),
            '"' => result.push_str("\\\""),
            '\n' => result.push_str("\\n"),
            _ => result.push(c),
        }
    }
    result
}

/// Format a floating point value for Prometheus.
fn format_value(value: f64) -> String {
    if value.is_nan() {
        "NaN".to_string()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            "+Inf".to_string()
        } else {
            "-Inf".to_string()
        }
    } else if value.fract() == 0.0 {
        format!("{:.0}", value)
    } else {
        format!("{}", value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::{HASHRATE, TOTAL_PAYMENTS};

    fn make_sample(spec: GaugeSpec, value: f64, pool: &str) -> MetricSample {
        MetricSample {
            spec,
            value,
            pool: pool.to_string(),
        }
    }

    #[test]
    fn test_render_groups_samples_by_metric() {
        let samples = vec![
            make_sample(TOTAL_PAYMENTS, 1000.0, "10.0.0.1"),
            make_sample(HASHRATE, 12.5, "10.0.0.1"),
            make_sample(TOTAL_PAYMENTS, 2000.0, "10.0.0.2"),
            make_sample(HASHRATE, 7.0, "10.0.0.2"),
        ];
        let up = vec![
            make_sample(UP, 1.0, "10.0.0.1"),
            make_sample(UP, 1.0, "10.0.0.2"),
        ];

        let output = render(&samples, &up, CollectorStats::default());

        assert!(output.contains("# HELP total_payments Total payments made by the pool"));
        assert!(output.contains("# TYPE total_payments gauge"));
        assert!(output.contains("total_payments{pool=\"10.0.0.1\"} 1000"));
        assert!(output.contains("total_payments{pool=\"10.0.0.2\"} 2000"));
        assert!(output.contains("hashrate{pool=\"10.0.0.1\"} 12.5"));
        assert!(output.contains("cpool_up{pool=\"10.0.0.1\"} 1"));

        // One TYPE header per family, not per sample.
        assert_eq!(output.matches("# TYPE total_payments gauge").count(), 1);
    }

    #[test]
    fn test_render_reports_failed_pool() {
        let up = vec![make_sample(UP, 0.0, "10.0.0.9")];

        let output = render(
            &[],
            &up,
            CollectorStats {
                scrapes: 3,
                pool_errors: 1,
            },
        );

        assert!(output.contains("cpool_up{pool=\"10.0.0.9\"} 0"));
        assert!(!output.contains("total_payments"));
        assert!(output.contains("cpool_exporter_scrapes_total 3"));
        assert!(output.contains("cpool_exporter_pool_errors_total 1"));
    }

    #[test]
    fn test_render_skips_headers_for_absent_families() {
        let output = render(&[], &[], CollectorStats::default());

        assert!(!output.contains("# TYPE total_payments gauge"));
        assert!(output.contains("cpool_exporter_scrapes_total 0"));
    }

    #[test]
    fn test_escape_label_value() {
        assert_eq!(escape_label_value("simple"), "simple");
        assert_eq!(escape_label_value("with\"quote"), "with\\\"quote");
        assert_eq!(escape_label_value("with\\backslash"), "with\\\\backslash");
        assert_eq!(escape_label_value("with\nnewline"), "with\\nnewline");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(42.0), "42");
        assert_eq!(format_value(3.14), "3.14");
        assert_eq!(format_value(f64::NAN), "NaN");
        assert_eq!(format_value(f64::INFINITY), "+Inf");
        assert_eq!(format_value(f64::NEG_INFINITY), "-Inf");
    }
}
