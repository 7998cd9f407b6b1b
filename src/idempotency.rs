// src/idempotency.rs
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const RANDOM_LEN: usize = 22;

/// Last time component handed out, so keys minted in the same millisecond still order
static LAST_MILLIS: AtomicU64 = AtomicU64::new(0);

/// Token identifying one transfer intent and every retry of it.
///
/// The backend collapses requests carrying the same key into a single effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mint a fresh key: base36 time component followed by a random base36 suffix
pub fn generate_key() -> IdempotencyKey {
    let now = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let millis = next_millis(now);

    let mut rng = rand::thread_rng();
    let suffix: String = (0..RANDOM_LEN)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect();

    IdempotencyKey(format!("{}{}", to_base36(millis), suffix))
}

// Strictly increasing even if the wall clock stalls or steps backwards
fn next_millis(now: u64) -> u64 {
    let mut prev = LAST_MILLIS.load(Ordering::Relaxed);
    loop {
        let next = now.max(prev + 1);
        match LAST_MILLIS.compare_exchange_weak(prev, next, Ordering::SeqCst, Ordering::Relaxed) {
            Ok(_) => return next,
            Err(actual) => prev = actual,
        }
    }
}

fn to_base36(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(BASE36[(value % 36) as usize]);
        value /= 36;
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}
