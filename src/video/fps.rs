use std::time::{Duration, Instant};

/// Frames-per-second counter over the interval between `start` and `stop`.
#[derive(Debug, Clone)]
pub struct Fps {
    start: Instant,
    end: Option<Instant>,
    frames: u64,
}

impl Fps {
    #[inline]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            end: None,
            frames: 0,
        }
    }

    #[inline]
    pub fn update(&mut self) {
        self.frames += 1;
    }

    #[inline]
    pub fn stop(&mut self) {
        self.end = Some(Instant::now());
    }

    #[inline]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Time between start and stop (or now, if not stopped yet).
    pub fn elapsed(&self) -> Duration {
        self.end.unwrap_or_else(Instant::now) - self.start
    }

    pub fn fps(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs > 0.0 {
            self.frames as f64 / secs
        } else {
            0.0
        }
    }
}

#[test]
fn counts_frames_over_elapsed_time() {
    let mut fps = Fps::start();
    for _ in 0..10 {
        fps.update();
    }
    std::thread::sleep(Duration::from_millis(20));
    fps.stop();

    assert_eq!(fps.frames(), 10);

    let elapsed = fps.elapsed();
    assert!(elapsed >= Duration::from_millis(20));
    // stopped counters do not drift
    assert_eq!(fps.elapsed(), elapsed);
    assert!(fps.fps() > 0.0 && fps.fps() <= 500.0);
}
