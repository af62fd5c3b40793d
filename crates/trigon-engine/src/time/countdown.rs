use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// One-shot delayed flag backed by a detached sleeper thread.
///
/// Fire-and-forget: there is no cancellation, the flag always flips after
/// `delay`. The only synchronization is the atomic flag itself, which is
/// all a "close this window soon" style consumer needs.
#[derive(Debug, Clone)]
pub struct Countdown {
    elapsed: Arc<AtomicBool>,
}

impl Countdown {
    pub fn start(delay: Duration) -> Self {
        let elapsed = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&elapsed);
        thread::spawn(move || {
            thread::sleep(delay);
            flag.store(true, Ordering::Release);
        });
        Self { elapsed }
    }

    pub fn is_elapsed(&self) -> bool {
        self.elapsed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flips_after_the_delay() {
        let countdown = Countdown::start(Duration::from_millis(200));
        assert!(!countdown.is_elapsed());

        thread::sleep(Duration::from_millis(600));
        assert!(countdown.is_elapsed());
    }

    #[test]
    fn clones_observe_the_same_flag() {
        let countdown = Countdown::start(Duration::from_millis(10));
        let clone = countdown.clone();
        thread::sleep(Duration::from_millis(300));
        assert!(countdown.is_elapsed());
        assert!(clone.is_elapsed());
    }
}
