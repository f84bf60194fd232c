//! Clock port — wall-clock time.

use minifence_domain::time::{EpochMillis, now_millis};

pub trait Clock {
    /// Current time in epoch milliseconds.
    fn now(&self) -> EpochMillis;
}

impl<T: Clock + ?Sized> Clock for std::sync::Arc<T> {
    fn now(&self) -> EpochMillis {
        (**self).now()
    }
}

/// The system UTC clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> EpochMillis {
        now_millis()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_return_increasing_time() {
        let clock = SystemClock;
        let a = clock.now();
        let b = clock.now();
        assert!(b >= a);
        assert!(a > 0);
    }
}
