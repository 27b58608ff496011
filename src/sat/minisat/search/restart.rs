/// Glucose-style restart scheduling: a short-window moving average of learnt-clause
/// LBDs triggers a restart once it runs far enough above the long-run average, and a
/// long-window moving average of trail size blocks that restart while the search is
/// still making unusually good progress.
#[derive(Clone, Copy, Debug)]
pub struct RestartSettings {
    pub lbd_queue_len: usize,   // Window size for the short-term LBD average.
    pub trail_queue_len: usize, // Window size for the long-term trail-size average.
    pub force_restart_factor: f64, // K: force a restart once lbd_queue_avg * K > global_lbd_avg.
    pub block_restart_factor: f64, // R: block a restart while trail.len() > R * trail_queue_avg.
    pub block_restart_min_conflicts: u64, // Block-restart only kicks in after this many conflicts.
}

impl Default for RestartSettings {
    fn default() -> Self {
        RestartSettings {
            lbd_queue_len: 50,
            trail_queue_len: 5000,
            force_restart_factor: 0.8,
            block_restart_factor: 1.4,
            block_restart_min_conflicts: 10_000,
        }
    }
}


struct MovingQueue {
    buf: Vec<f64>,
    cap: usize,
    head: usize,
    sum: f64,
}

impl MovingQueue {
    fn new(cap: usize) -> Self {
        MovingQueue { buf: Vec::with_capacity(cap), cap, head: 0, sum: 0.0 }
    }

    fn push(&mut self, x: f64) {
        if self.buf.len() < self.cap {
            self.buf.push(x);
            self.sum += x;
        } else {
            self.sum += x - self.buf[self.head];
            self.buf[self.head] = x;
            self.head = (self.head + 1) % self.cap;
        }
    }

    fn full(&self) -> bool {
        self.buf.len() == self.cap
    }

    fn avg(&self) -> f64 {
        if self.buf.is_empty() {
            0.0
        } else {
            self.sum / (self.buf.len() as f64)
        }
    }

    fn clear(&mut self) {
        self.buf.clear();
        self.head = 0;
        self.sum = 0.0;
    }
}


pub struct RestartController {
    settings: RestartSettings,
    lbd_queue: MovingQueue,
    trail_queue: MovingQueue,
    global_lbd_sum: f64,
    global_lbd_count: u64,
}

impl RestartController {
    pub fn new(settings: RestartSettings) -> Self {
        RestartController {
            lbd_queue: MovingQueue::new(settings.lbd_queue_len),
            trail_queue: MovingQueue::new(settings.trail_queue_len),
            global_lbd_sum: 0.0,
            global_lbd_count: 0,
            settings,
        }
    }

    /// Feeds the LBD of a just-learned clause and the trail size at the moment of
    /// conflict into the moving windows that drive `should_restart`.
    pub fn observe_conflict(&mut self, lbd: u16, trail_size: u64) {
        self.lbd_queue.push(lbd as f64);
        self.trail_queue.push(trail_size as f64);
        self.global_lbd_sum += lbd as f64;
        self.global_lbd_count += 1;
    }

    /// Force-restart predicate: true once the recent LBD average is high enough,
    /// relative to the global average, to suggest the search has wandered into an
    /// unproductive region. Ignores the block-restart guard; see `blocked`.
    pub fn should_restart(&self, _conflicts: u64) -> bool {
        if !self.lbd_queue.full() || self.global_lbd_count == 0 {
            return false;
        }

        let global_avg = self.global_lbd_sum / (self.global_lbd_count as f64);
        self.settings.force_restart_factor * self.lbd_queue.avg() > global_avg
    }

    /// True if the block-restart guard is currently suppressing restarts: the trail
    /// is unusually long (search making fast progress) relative to its recent history.
    /// When it fires, the LBD queue is cleared so the next force-restart is delayed
    /// rather than firing immediately on the next conflict.
    pub fn blocked(&mut self, conflicts: u64, trail_size: u64) -> bool {
        let blocked = conflicts > self.settings.block_restart_min_conflicts
            && self.trail_queue.full()
            && (trail_size as f64) > self.settings.block_restart_factor * self.trail_queue.avg();
        if blocked {
            self.lbd_queue.clear();
        }
        blocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_restart_before_window_fills() {
        let ctl = RestartController::new(RestartSettings { lbd_queue_len: 5, ..Default::default() });
        assert!(!ctl.should_restart(0));
    }

    #[test]
    fn restarts_once_recent_lbd_spikes_above_average() {
        let settings = RestartSettings { lbd_queue_len: 4, ..Default::default() };
        let mut ctl = RestartController::new(settings);
        for _ in 0..4 {
            ctl.observe_conflict(2, 10);
        }
        for _ in 0..4 {
            ctl.observe_conflict(20, 10);
        }
        assert!(ctl.should_restart(100));
    }

    #[test]
    fn block_restart_suppresses_when_trail_grows() {
        let settings = RestartSettings {
            trail_queue_len: 4,
            block_restart_min_conflicts: 0,
            ..Default::default()
        };
        let mut ctl = RestartController::new(settings);
        for _ in 0..4 {
            ctl.observe_conflict(5, 10);
        }
        assert!(ctl.blocked(1, 1000));
        assert!(!ctl.blocked(1, 5));
    }
}
