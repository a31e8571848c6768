use std::collections::VecDeque;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::{self, Instant};
use tracing::{debug, warn};

#[derive(Debug)]
struct ThrottleState {
    recent: VecDeque<Instant>,
    cooldown_until: Option<Instant>,
}

/// Sliding-window limiter shared by every venue request of a cycle.
///
/// At most `max_requests` permits are handed out per `window`. A venue
/// rate-limit response pushes a cool-down during which no permit is granted.
#[derive(Debug)]
pub struct RequestThrottle {
    max_requests: usize,
    window: Duration,
    state: Mutex<ThrottleState>,
}

impl RequestThrottle {
    pub fn new(max_requests_per_second: u32) -> Self {
        Self::with_window(max_requests_per_second as usize, Duration::from_secs(1))
    }

    pub fn with_window(max_requests: usize, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            state: Mutex::new(ThrottleState {
                recent: VecDeque::new(),
                cooldown_until: None,
            }),
        }
    }

    /// Waits until a request may be sent.
    pub async fn acquire(&self) {
        loop {
            let wait_until = {
                let mut state = self.state.lock().await;
                let now = Instant::now();

                match state.cooldown_until {
                    Some(until) if until > now => Some(until),
                    _ => {
                        state.cooldown_until = None;
                        while let Some(front) = state.recent.front() {
                            if now.duration_since(*front) >= self.window {
                                state.recent.pop_front();
                            } else {
                                break;
                            }
                        }
                        if state.recent.len() < self.max_requests {
                            state.recent.push_back(now);
                            None
                        } else {
                            state.recent.front().map(|oldest| *oldest + self.window)
                        }
                    }
                }
            };

            match wait_until {
                None => return,
                Some(deadline) => {
                    debug!(
                        "RequestThrottle: limit reached, waiting {:?}",
                        deadline.saturating_duration_since(Instant::now())
                    );
                    time::sleep_until(deadline).await;
                }
            }
        }
    }

    /// Blocks new permits for `retry_after` (venue answered 429).
    pub async fn penalize(&self, retry_after: Duration) {
        let mut state = self.state.lock().await;
        let until = Instant::now() + retry_after;
        if state.cooldown_until.is_none_or(|current| current < until) {
            warn!("RequestThrottle: venue rate limit hit, cooling down for {:?}", retry_after);
            state.cooldown_until = Some(until);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_limits_requests_per_window() {
        let throttle = RequestThrottle::with_window(2, Duration::from_secs(1));
        let start = Instant::now();
        throttle.acquire().await;
        throttle.acquire().await;
        assert_eq!(Instant::now(), start);

        throttle.acquire().await;
        assert!(Instant::now() >= start + Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_acquirers_share_budget() {
        let throttle = Arc::new(RequestThrottle::with_window(3, Duration::from_secs(1)));
        let start = Instant::now();
        let handles: Vec<_> = (0..6)
            .map(|_| {
                let t = throttle.clone();
                tokio::spawn(async move {
                    t.acquire().await;
                    Instant::now()
                })
            })
            .collect();
        let mut times = Vec::new();
        for h in handles {
            times.push(h.await.unwrap());
        }
        let immediate = times.iter().filter(|t| **t == start).count();
        assert_eq!(immediate, 3);
        assert!(times.iter().all(|t| *t < start + Duration::from_secs(2)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_third_permit_pends_until_window_slides() {
        let throttle = RequestThrottle::with_window(2, Duration::from_secs(1));
        throttle.acquire().await;
        throttle.acquire().await;

        let mut third = tokio_test::task::spawn(throttle.acquire());
        tokio_test::assert_pending!(third.poll());

        time::advance(Duration::from_secs(1)).await;
        tokio_test::assert_ready!(third.poll());
    }

    #[tokio::test(start_paused = true)]
    async fn test_penalty_delays_next_permit() {
        let throttle = RequestThrottle::new(10);
        let start = Instant::now();
        throttle.penalize(Duration::from_secs(5)).await;
        throttle.acquire().await;
        assert!(Instant::now() >= start + Duration::from_secs(5));
    }
}
