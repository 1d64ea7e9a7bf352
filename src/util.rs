use chrono::{DateTime, SecondsFormat, Utc};
use rand::RngCore;

pub fn random_salt<R: RngCore + ?Sized>(rng: &mut R) -> String {
    let mut bytes = [0u8; 16];
    rng.fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// ISO-8601 with an explicit `+00:00` offset and whole seconds, e.g.
/// `2021-10-30T12:30:11+00:00`.
pub fn format_timestamp(instant: DateTime<Utc>) -> String {
    instant.to_rfc3339_opts(SecondsFormat::Secs, false)
}
