use chrono::Utc;
use rand::{distributions::Alphanumeric, Rng};

/// Generates a random alphanumeric string of the given length.
pub fn generate_string(len: usize) -> String {
    rand::thread_rng().sample_iter(&Alphanumeric).take(len).map(char::from).collect()
}

/// The unix timestamp, as a string, for the `TimeStamp` fields.
pub fn timestamp() -> String {
    Utc::now().timestamp().to_string()
}
