//! Network listing types — `GET /networks`.

use sensordash::Network;
use serde::{Deserialize, Serialize};

/// One element of the `GET /networks` response array.
///
/// ```json
/// { "network_identifier": "n1", "network_name": "Lab A" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NetworkRecord {
    pub network_identifier: String,
    pub network_name: String,
}

impl NetworkRecord {
    pub fn new(network_identifier: impl Into<String>, network_name: impl Into<String>) -> Self {
        Self {
            network_identifier: network_identifier.into(),
            network_name: network_name.into(),
        }
    }
}

impl From<NetworkRecord> for Network {
    fn from(r: NetworkRecord) -> Self {
        Network::new(r.network_identifier, r.network_name)
    }
}
