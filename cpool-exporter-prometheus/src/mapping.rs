//! Mapping from decoded pool stats to gauge samples.

use tracing::warn;

use crate::stats::CpoolStatsResponse;

/// Static descriptor of one exported gauge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GaugeSpec {
    /// Prometheus metric name.
    pub name: &'static str,
    /// Help text emitted with the metric.
    pub help: &'static str,
}

pub const TOTAL_PAYMENTS: GaugeSpec = GaugeSpec {
    name: "total_payments",
    help: "Total payments made by the pool",
};

pub const HASHRATE: GaugeSpec = GaugeSpec {
    name: "hashrate",
    help: "Total pool hashrate",
};

pub const ROUND_HASHES: GaugeSpec = GaugeSpec {
    name: "round_hashes",
    help: "Amount of hashes submitted in the current round",
};

pub const LAST_BLOCK_FOUND: GaugeSpec = GaugeSpec {
    name: "last_block_found",
    help: "Timestamp when the last block was found",
};

pub const DIFFICULTY: GaugeSpec = GaugeSpec {
    name: "difficulty",
    help: "Network difficulty",
};

/// All pool gauges, in exposition order.
pub const GAUGES: [GaugeSpec; 5] = [
    TOTAL_PAYMENTS,
    HASHRATE,
    ROUND_HASHES,
    LAST_BLOCK_FOUND,
    DIFFICULTY,
];

/// One gauge sample labeled with its upstream pool address.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSample {
    /// The gauge this sample belongs to.
    pub spec: GaugeSpec,
    /// Sample value.
    pub value: f64,
    /// Upstream address, exported as the `pool` label.
    pub pool: String,
}

/// Translate one decoded stats payload into gauge samples.
///
/// Produces exactly one sample per gauge in [`GAUGES`]. A non-numeric
/// `lastBlockFound` is exported as 0 rather than failing the scrape; the
/// coercion is logged so it does not pass silently.
pub fn translate(addr: &str, response: &CpoolStatsResponse) -> Vec<MetricSample> {
    let last_block_found = response.pool.last_block_found.parse::<f64>().unwrap_or_else(|_| {
        warn!(
            pool = %addr,
            value = %response.pool.last_block_found,
            "Non-numeric lastBlockFound, exporting 0"
        );
        0.0
    });

    vec![
        sample(TOTAL_PAYMENTS, response.pool.total_payments as f64, addr),
        sample(HASHRATE, response.pool.hashrate, addr),
        sample(ROUND_HASHES, response.pool.round_hashes as f64, addr),
        sample(LAST_BLOCK_FOUND, last_block_found, addr),
        sample(DIFFICULTY, response.network.difficulty as f64, addr),
    ]
}

fn sample(spec: GaugeSpec, value: f64, addr: &str) -> MetricSample {
    MetricSample {
        spec,
        value,
        pool: addr.to_string(),
    }
}
