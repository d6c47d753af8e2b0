// record.rs - the threat feed contract and its numeric feature encoding
use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use super::FetchError;

/// Features per record: `[ip, attack_type, severity, timestamp]`
pub const FEATURE_DIM: usize = 4;

/// Index of `severity` within [`ThreatRecord::features`]
pub const SEVERITY_FEATURE: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThreatRecord {
    /// Dotted-quad source address
    pub ip: String,
    pub attack_type: String,
    pub severity: f64,
    /// Numeric timestamp carried as a string by the feed
    pub timestamp: String,
}

impl ThreatRecord {
    pub fn features(&self) -> Result<[f64; FEATURE_DIM], FetchError> {
        Ok([
            f64::from(encode_ip(&self.ip)?),
            encode_attack_type(&self.attack_type),
            self.severity,
            encode_timestamp(&self.timestamp)?,
        ])
    }
}

/// Big-endian 32-bit value of a dotted-quad address
pub fn encode_ip(ip: &str) -> Result<u32, FetchError> {
    ip.trim()
        .parse::<Ipv4Addr>()
        .map(u32::from)
        .map_err(|_| FetchError::InvalidField {
            field: "ip",
            value: ip.to_string(),
        })
}

pub fn encode_attack_type(attack_type: &str) -> f64 {
    match attack_type {
        "DDoS" => 0.1,
        "Malware" => 0.2,
        "Phishing" => 0.3,
        _ => 0.0,
    }
}

pub fn encode_timestamp(timestamp: &str) -> Result<f64, FetchError> {
    timestamp
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|t| t.is_finite())
        .ok_or_else(|| FetchError::InvalidField {
            field: "timestamp",
            value: timestamp.to_string(),
        })
}

pub fn parse_records(json: &str) -> Result<Vec<ThreatRecord>, FetchError> {
    Ok(serde_json::from_str(json)?)
}

/// Feature vectors for every record, in feed order
pub fn encode_records(records: &[ThreatRecord]) -> Result<Vec<Vec<f64>>, FetchError> {
    records
        .iter()
        .map(|r| r.features().map(|f| f.to_vec()))
        .collect()
}
