//! Wire types for the threat lookup API

use serde::{Deserialize, Serialize};

/// Threat categories every lookup asks about
pub const THREAT_TYPES: [&str; 4] = [
    "MALWARE",
    "SOCIAL_ENGINEERING",
    "UNWANTED_SOFTWARE",
    "POTENTIALLY_HARMFUL_APPLICATION",
];

pub const PLATFORM_TYPES: [&str; 1] = ["ANY_PLATFORM"];

pub const THREAT_ENTRY_TYPES: [&str; 1] = ["URL"];

/// Request body of a `threatMatches:find` call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FindThreatMatchesRequest {
    pub client: ClientInfo,
    pub threat_info: ThreatInfo,
}

impl FindThreatMatchesRequest {
    /// Lookup of a single URL against the fixed threat set
    pub fn for_url(client_id: &str, client_version: &str, url: &str) -> Self {
        Self {
            client: ClientInfo {
                client_id: client_id.to_string(),
                client_version: client_version.to_string(),
            },
            threat_info: ThreatInfo {
                threat_types: THREAT_TYPES.iter().map(|s| s.to_string()).collect(),
                platform_types: PLATFORM_TYPES.iter().map(|s| s.to_string()).collect(),
                threat_entry_types: THREAT_ENTRY_TYPES.iter().map(|s| s.to_string()).collect(),
                threat_entries: vec![ThreatEntry {
                    url: url.to_string(),
                }],
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClientInfo {
    pub client_id: String,
    pub client_version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ThreatInfo {
    pub threat_types: Vec<String>,
    pub platform_types: Vec<String>,
    pub threat_entry_types: Vec<String>,
    pub threat_entries: Vec<ThreatEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ThreatEntry {
    pub url: String,
}

/// Response body; `matches` is omitted or null when nothing matched
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FindThreatMatchesResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matches: Option<Vec<ThreatMatch>>,
}

impl FindThreatMatchesResponse {
    /// The match list, empty when the service sent none
    pub fn into_matches(self) -> Vec<ThreatMatch> {
        self.matches.unwrap_or_default()
    }
}

/// One entry of the `matches` list
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ThreatMatch {
    #[serde(default)]
    pub threat_type: String,

    #[serde(default)]
    pub platform_type: String,

    #[serde(default)]
    pub threat_entry_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threat: Option<ThreatEntry>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_duration: Option<String>,
}
