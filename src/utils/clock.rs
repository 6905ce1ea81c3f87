/// Millisecond wall clock, injectable so freshness checks are testable
pub trait Clock {
    fn now_ms(&self) -> f64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> f64 {
        // chrono's wasmbind feature reads Date.now() in the browser
        chrono::Utc::now().timestamp_millis() as f64
    }
}
