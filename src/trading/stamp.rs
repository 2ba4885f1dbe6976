//! Sources of trade ids and timestamps.

use chrono::Local;
use uuid::Uuid;

use crate::models::Stamp;

/// Hands out an identity for each computed trade.
pub trait StampSource {
    fn next_stamp(&mut self) -> Stamp;
}

/// Random v4 ids and the local wall clock.
#[derive(Debug, Default)]
pub struct SystemStamps;

impl StampSource for SystemStamps {
    fn next_stamp(&mut self) -> Stamp {
        Stamp {
            id: Uuid::new_v4(),
            created_at: Local::now().naive_local(),
        }
    }
}

/// Same stamp every time.
#[cfg(test)]
#[derive(Debug, Clone)]
pub struct FixedStamps(pub Stamp);

#[cfg(test)]
impl StampSource for FixedStamps {
    fn next_stamp(&mut self) -> Stamp {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_stamps_are_unique() {
        let mut stamps = SystemStamps;
        let a = stamps.next_stamp();
        let b = stamps.next_stamp();
        assert_ne!(a.id, b.id);
        assert!(b.created_at >= a.created_at);
    }
}
