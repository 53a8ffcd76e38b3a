use serde::{Deserialize, Serialize};

/// Public STUN servers used when the caller supplies no ICE configuration.
pub const DEFAULT_STUN_SERVERS: [&str; 3] = [
    "stun:stun.l.google.com:19302",
    "stun:stun1.l.google.com:19302",
    "stun:stun2.l.google.com:19302",
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IceServerConfig {
    pub urls: Vec<String>,
    pub username: Option<String>,
    pub credential: Option<String>,
}

impl IceServerConfig {
    pub fn stun_defaults() -> Vec<Self> {
        vec![Self {
            urls: DEFAULT_STUN_SERVERS.iter().map(|s| s.to_string()).collect(),
            username: None,
            credential: None,
        }]
    }
}
