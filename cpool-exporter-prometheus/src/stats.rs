//! Decoded upstream stats payload.
//!
//! These types mirror the JSON document served by the pool daemon on
//! `/stats`. Scalar fields the daemon omits decode as zero values; the
//! `Pool` and `Network` objects themselves are required.

use serde::Deserialize;

/// Pool-side statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolStats {
    /// Total cumulative payments made by the pool.
    #[serde(default)]
    pub total_payments: i64,
    /// Current pool hashrate in hashes per second.
    #[serde(default)]
    pub hashrate: f64,
    /// Hashes submitted in the current round.
    #[serde(default)]
    pub round_hashes: i64,
    /// Unix timestamp of the last found block, as reported (a string).
    #[serde(default)]
    pub last_block_found: String,
}

/// Network-side statistics.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStats {
    /// Current network difficulty.
    #[serde(default)]
    pub difficulty: i64,
}

/// Full decoded `/stats` payload for one upstream.
///
/// Both sub-records are required: a payload missing either does not
/// deserialize, so a partially translated sample set cannot occur.
#[derive(Debug, Clone, Deserialize)]
pub struct CpoolStatsResponse {
    #[serde(rename = "Pool")]
    pub pool: PoolStats,
    #[serde(rename = "Network")]
    pub network: NetworkStats,
}
