//! Threat-record source: feed client, JSON contract and feature encoding.
//! Sits outside the encrypted core; its errors reach the pipeline unchanged.

pub mod client;
mod error;
pub mod record;


pub use client::{ThreatFeedClient, load_records};
pub use error::FetchError;
pub use record::{
    FEATURE_DIM, SEVERITY_FEATURE, ThreatRecord, encode_attack_type, encode_ip, encode_records,
    encode_timestamp, parse_records,
};
