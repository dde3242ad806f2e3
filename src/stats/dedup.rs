use std::collections::HashSet;
use std::hash::Hash;

use crate::ingest::{ShareAward, SoloAttempt};

/// Bit pattern of a key component. Missing values collapse onto zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct KeyNumber(u64);

impl KeyNumber {
    fn of(value: Option<f64>) -> Self {
        match value {
            Some(n) if n.is_finite() && n != 0.0 => KeyNumber(n.to_bits()),
            _ => KeyNumber(0f64.to_bits()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ShareAwardKey {
    user_id: String,
    name: String,
    timestamp: KeyNumber,
    shares: KeyNumber,
    points: KeyNumber,
}

impl From<&ShareAward> for ShareAwardKey {
    fn from(award: &ShareAward) -> Self {
        Self {
            user_id: award.user_id.clone().unwrap_or_default(),
            name: award.name.clone().unwrap_or_default(),
            timestamp: KeyNumber::of(award.timestamp),
            shares: KeyNumber::of(Some(award.share_count)),
            points: KeyNumber::of(Some(award.points)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SoloAttemptKey {
    user_id: String,
    timestamp: KeyNumber,
}

impl From<&SoloAttempt> for SoloAttemptKey {
    fn from(attempt: &SoloAttempt) -> Self {
        Self {
            user_id: attempt.user_id.clone().unwrap_or_default(),
            timestamp: KeyNumber::of(attempt.timestamp),
        }
    }
}

/// Single stable pass keeping the first record seen for every key.
pub fn dedupe_by_key<T, K, F>(records: &[T], key: F) -> Vec<T>
where
    T: Clone,
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut seen = HashSet::with_capacity(records.len());
    records
        .iter()
        .filter(|record| seen.insert(key(*record)))
        .cloned()
        .collect()
}

/// Awards are the same event only when user, name, time, shares and points all match.
pub fn dedupe_share_awards(awards: &[ShareAward]) -> Vec<ShareAward> {
    dedupe_by_key(awards, |award| ShareAwardKey::from(award))
}

/// Attempts are the same record when user id and start time match.
pub fn dedupe_solo_attempts(attempts: &[SoloAttempt]) -> Vec<SoloAttempt> {
    dedupe_by_key(attempts, |attempt| SoloAttemptKey::from(attempt))
}
