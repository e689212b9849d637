//! Incident deduplication keys.

use rand::distributions::Alphanumeric;
use rand::Rng;

/// Length of generated incident keys.
pub const INCIDENT_KEY_LEN: usize = 20;

/// Random alphanumeric key sent with every new incident.
pub fn incident_key() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(INCIDENT_KEY_LEN)
        .map(char::from)
        .collect()
}
