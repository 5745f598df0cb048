use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Default acceptance window for signature timestamps, in seconds.
pub const DEFAULT_TOLERANCE_SECS: i64 = 300;

/// Verify a `t=<unix>,v1=<hex>` signature header over the exact raw body
/// bytes. The signed payload is `"{t}.{body}"`, HMAC-SHA256 under the
/// shared webhook secret. Comparison is constant-time.
pub fn verify(header: &str, payload: &[u8], secret: &str, tolerance_secs: i64) -> bool {
    let mut timestamp = "";
    let mut v1 = "";
    for part in header.split(',') {
        let mut it = part.trim().splitn(2, '=');
        match (it.next(), it.next()) {
            (Some("t"), Some(val)) => timestamp = val,
            (Some("v1"), Some(val)) => v1 = val,
            _ => {}
        }
    }
    if timestamp.is_empty() || v1.is_empty() {
        return false;
    }

    let Ok(ts) = timestamp.parse::<i64>() else {
        return false;
    };
    let now = chrono::Utc::now().timestamp();
    if (now - ts).unsigned_abs() > tolerance_secs.unsigned_abs() {
        return false;
    }

    let expected = compute(payload, secret, timestamp);
    constant_time_eq(&expected, v1)
}

/// Compute the hex signature for a timestamped payload. Exposed so tests
/// and outbound tooling can produce valid headers.
pub fn compute(payload: &[u8], secret: &str, timestamp: &str) -> String {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
