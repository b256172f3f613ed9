use devhub_primitives::BlockHeight;
use std::collections::VecDeque;
use std::time::{Duration, Instant};


/// Block rate over a sliding time window
pub struct Progress {
    samples: VecDeque<(BlockHeight, Instant)>,
    window: Duration,
    has_news: bool
}


impl Progress {
    pub fn new(window: Duration) -> Self {
        Self {
            samples: VecDeque::new(),
            window,
            has_news: false
        }
    }

    pub fn set_current_value(&mut self, height: BlockHeight) {
        self.record(height, Instant::now())
    }

    fn record(&mut self, height: BlockHeight, time: Instant) {
        self.samples.push_back((height, time));
        while self.samples.len() > 2 && time.duration_since(self.samples[1].1) >= self.window {
            self.samples.pop_front();
        }
        self.has_news = true;
    }

    pub fn has_news(&self) -> bool {
        self.has_news
    }

    pub fn speed(&mut self) -> f64 {
        self.has_news = false;

        let (Some(beg), Some(end)) = (self.samples.front(), self.samples.back()) else {
            return 0.0
        };

        let duration = end.1.duration_since(beg.1).as_secs_f64();
        if duration == 0.0 {
            return 0.0
        }

        end.0.saturating_sub(beg.0) as f64 / duration
    }
}
