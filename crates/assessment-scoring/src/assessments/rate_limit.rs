use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

use super::domain::SubjectId;

/// Admission decision for one submission attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

/// Extension point consulted after authentication.
pub trait RateLimiter: Send + Sync {
    fn admit(&self, subject: &SubjectId, now: DateTime<Utc>) -> RateDecision;
}

/// Admits every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl RateLimiter for AllowAll {
    fn admit(&self, _subject: &SubjectId, _now: DateTime<Utc>) -> RateDecision {
        RateDecision::Allowed
    }
}

/// Fixed-window counter keyed by subject.
#[derive(Debug)]
pub struct WindowedRateLimiter {
    max_requests: u32,
    window: Duration,
    windows: Mutex<HashMap<SubjectId, (DateTime<Utc>, u32)>>,
}

impl WindowedRateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests: max_requests.max(1),
            window,
            windows: Mutex::new(HashMap::new()),
        }
    }
}

impl RateLimiter for WindowedRateLimiter {
    fn admit(&self, subject: &SubjectId, now: DateTime<Utc>) -> RateDecision {
        let mut guard = self
            .windows
            .lock()
            .unwrap_or_else(|poison| poison.into_inner());

        let window = self.window;
        guard.retain(|_, (started, _)| now - *started < window);

        let entry = guard.entry(subject.clone()).or_insert((now, 0));
        if entry.1 < self.max_requests {
            entry.1 += 1;
            return RateDecision::Allowed;
        }

        let remaining_ms = (entry.0 + window - now).num_milliseconds();
        RateDecision::Limited {
            retry_after_secs: ((remaining_ms + 999) / 1000).max(1) as u64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(seconds: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000 + seconds, 0)
            .single()
            .expect("valid timestamp")
    }

    #[test]
    fn allow_all_never_limits() {
        let subject = SubjectId("subject-1".to_string());
        for second in 0..100 {
            assert_eq!(AllowAll.admit(&subject, at(second)), RateDecision::Allowed);
        }
    }

    #[test]
    fn windowed_limiter_resets_after_window() {
        let limiter = WindowedRateLimiter::new(2, Duration::seconds(10));
        let subject = SubjectId("subject-1".to_string());

        assert_eq!(limiter.admit(&subject, at(0)), RateDecision::Allowed);
        assert_eq!(limiter.admit(&subject, at(1)), RateDecision::Allowed);
        assert_eq!(
            limiter.admit(&subject, at(4)),
            RateDecision::Limited {
                retry_after_secs: 6
            }
        );
        assert_eq!(limiter.admit(&subject, at(10)), RateDecision::Allowed);
    }

    #[test]
    fn subjects_are_counted_independently() {
        let limiter = WindowedRateLimiter::new(1, Duration::seconds(60));
        let first = SubjectId("subject-1".to_string());
        let second = SubjectId("subject-2".to_string());

        assert_eq!(limiter.admit(&first, at(0)), RateDecision::Allowed);
        assert_eq!(limiter.admit(&second, at(0)), RateDecision::Allowed);
        assert!(matches!(
            limiter.admit(&first, at(1)),
            RateDecision::Limited { .. }
        ));
    }
}
