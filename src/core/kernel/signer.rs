use md5::{Digest, Md5};

/// Suffix marking a key or signature as the master key.
pub const MASTER_KEY_SUFFIX: &str = "master";

/// Sign `secret` with the current wall-clock time.
///
/// The result is `"<md5hex>,<millis>"`, or `"<md5hex>,<millis>,master"` when
/// `elevated` is set. This obfuscates the key in transit; it is not a MAC.
pub fn sign_key(secret: &str, elevated: bool) -> String {
    sign_key_at(secret, elevated, timestamp_millis())
}

/// Sign `secret` for a fixed timestamp in milliseconds.
pub fn sign_key_at(secret: &str, elevated: bool, timestamp: i64) -> String {
    let mut hasher = Md5::new();
    hasher.update(timestamp.to_string().as_bytes());
    hasher.update(secret.as_bytes());
    let digest = hex::encode(hasher.finalize());

    if elevated {
        format!("{},{},{}", digest, timestamp, MASTER_KEY_SUFFIX)
    } else {
        format!("{},{}", digest, timestamp)
    }
}

/// Current timestamp in milliseconds since the Unix epoch.
pub fn timestamp_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
