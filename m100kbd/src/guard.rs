//! Repeat suppression.

use std::time::Duration;
use log::debug;
use crate::keymap::KeyCode;

/// The most recently emitted key and when it was emitted.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct LastEmission {
    pub key: KeyCode,
    pub at: Duration,
}

/// Decides whether `key`, seen at `now`, may be emitted.
///
/// A different key is always admitted. The same key is admitted again only once
/// `threshold` has passed since it was last emitted; anything sooner is bounce of a
/// key that is still held.
pub fn admit(last: Option<LastEmission>, key: KeyCode, now: Duration, threshold: Duration) -> bool {
    let Some(last) = last else {
        return true;
    };

    if last.key != key {
        return true;
    }

    let elapsed = now.saturating_sub(last.at);
    if elapsed >= threshold {
        debug!("{} repeated after {:?}, accepting.", key, elapsed);
        true
    } else {
        debug!("{} repeated after {:?}, treating as bounce.", key, elapsed);
        false
    }
}
