// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Exponential backoff with jitter for cluster resynchronization.

use rand::Rng;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Backoff {
    initial: Duration,
    max: Duration,
    current: Duration,
}

impl Default for Backoff {
    fn default() -> Self {
        Self::new(Duration::from_millis(100), Duration::from_secs(30))
    }
}

impl Backoff {
    pub fn new(initial: Duration, max: Duration) -> Self {
        Self {
            initial,
            max,
            current: initial,
        }
    }

    /// Delay before the next attempt: the current step scaled by a random
    /// factor in `[0.5, 1.5)`. Doubles the step, capped at the maximum.
    pub fn next_delay(&mut self) -> Duration {
        let jitter = rand::rng().random_range(0.5..1.5);
        let delay = self.current.mul_f64(jitter);
        self.current = (self.current * 2).min(self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.initial;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_until_capped() {
        let mut backoff = Backoff::new(Duration::from_millis(100), Duration::from_millis(400));
        let delays: Vec<_> = (0..5).map(|_| backoff.next_delay()).collect();

        assert!(delays[0] >= Duration::from_millis(50) && delays[0] < Duration::from_millis(150));
        assert!(delays[1] >= Duration::from_millis(100) && delays[1] < Duration::from_millis(300));
        for d in &delays[2..] {
            assert!(*d >= Duration::from_millis(200) && *d < Duration::from_millis(600));
        }
    }

    #[test]
    fn reset_returns_to_initial_step() {
        let mut backoff = Backoff::new(Duration::from_millis(10), Duration::from_secs(1));
        for _ in 0..6 {
            backoff.next_delay();
        }
        backoff.reset();
        assert!(backoff.next_delay() < Duration::from_millis(15));
    }
}
