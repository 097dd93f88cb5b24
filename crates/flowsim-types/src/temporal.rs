use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Wall-clock timestamp with a logical tie-breaker.
///
/// Two commits recorded within the same millisecond still get distinct,
/// ordered timestamps: [`Timestamp::after`] bumps the logical counter when the
/// clock has not advanced.
///
/// Ordering: `physical_ms` → `logical`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp {
    /// Wall-clock milliseconds since UNIX epoch.
    pub physical_ms: u64,
    /// Logical counter for events at the same physical time.
    pub logical: u32,
}

impl Timestamp {
    /// Create a timestamp with explicit values.
    pub const fn new(physical_ms: u64, logical: u32) -> Self {
        Self {
            physical_ms,
            logical,
        }
    }

    /// The current wall-clock time.
    pub fn now() -> Self {
        let physical_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u64;
        Self {
            physical_ms,
            logical: 0,
        }
    }

    /// The zero timestamp.
    pub const fn zero() -> Self {
        Self {
            physical_ms: 0,
            logical: 0,
        }
    }

    /// The current time, forced strictly after `previous`.
    pub fn after(previous: &Self) -> Self {
        let now = Self::now();
        if now > *previous {
            return now;
        }
        match previous.logical.checked_add(1) {
            Some(logical) => Self {
                physical_ms: previous.physical_ms,
                logical,
            },
            None => Self {
                physical_ms: previous.physical_ms.saturating_add(1),
                logical: 0,
            },
        }
    }
}

impl Default for Timestamp {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Timestamp({}ms.{})", self.physical_ms, self.logical)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.physical_ms, self.logical)
    }
}
