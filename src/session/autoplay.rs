use std::sync::mpsc;
use std::time::{Duration, Instant};

use crate::session::study::StudyCursor;

pub const MIN_PERIOD_MS: u64 = 800;
pub const MAX_PERIOD_MS: u64 = 4000;
pub const PERIOD_STEP_MS: u64 = 200;
pub const DEFAULT_PERIOD_MS: u64 = 1600;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplayPhase {
    Front,
    Back,
}

/// Published to every subscriber, in order, exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AutoplaySignal {
    /// Turn the visible card over.
    Flip,
    /// The cursor moved to `index` in the current chapter.
    Advance { index: usize },
}

/// Flip-then-advance cycle driven by the event loop tick.
///
/// Holds at most one pending deadline. `stop`, `set_period` and
/// `restart_for_chapter` drop or replace it before the next poll, so a
/// cancelled deadline can never produce a signal.
pub struct AutoplayCoordinator {
    running: bool,
    period: Duration,
    phase: AutoplayPhase,
    deadline: Option<Instant>,
    subscribers: Vec<mpsc::Sender<AutoplaySignal>>,
}

impl AutoplayCoordinator {
    pub fn new(period_ms: u64) -> Self {
        Self {
            running: false,
            period: Duration::from_millis(clamp_period(period_ms)),
            phase: AutoplayPhase::Front,
            deadline: None,
            subscribers: Vec::new(),
        }
    }

    pub fn subscribe(&mut self) -> mpsc::Receiver<AutoplaySignal> {
        let (tx, rx) = mpsc::channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn phase(&self) -> AutoplayPhase {
        self.phase
    }

    pub fn period_ms(&self) -> u64 {
        self.period.as_millis() as u64
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn start(&mut self, now: Instant) {
        if self.running {
            return;
        }
        self.running = true;
        self.phase = AutoplayPhase::Front;
        self.deadline = Some(now + self.period);
        log::debug!("autoplay started at {} ms", self.period_ms());
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.deadline = None;
        log::debug!("autoplay stopped");
    }

    pub fn toggle(&mut self, now: Instant) {
        if self.running {
            self.stop();
        } else {
            self.start(now);
        }
    }

    /// Change the period. A running timer is replaced so the new period
    /// counts from `now`; the current phase is kept.
    pub fn set_period(&mut self, now: Instant, period_ms: u64) {
        self.period = Duration::from_millis(clamp_period(period_ms));
        if self.running {
            self.deadline = Some(now + self.period);
        }
    }

    pub fn faster(&mut self, now: Instant) {
        let ms = self.period_ms().saturating_sub(PERIOD_STEP_MS);
        self.set_period(now, ms);
    }

    pub fn slower(&mut self, now: Instant) {
        let ms = self.period_ms() + PERIOD_STEP_MS;
        self.set_period(now, ms);
    }

    /// Chapter switched under a running cycle: start over from the front.
    pub fn restart_for_chapter(&mut self, now: Instant) {
        self.resync(now, AutoplayPhase::Front);
    }

    /// The learner flipped or moved by hand. Continue from the face they
    /// left showing, with a full period before the next step.
    pub fn resync(&mut self, now: Instant, phase: AutoplayPhase) {
        self.phase = phase;
        if self.running {
            self.deadline = Some(now + self.period);
        }
    }

    /// Run the step whose deadline has passed, writing the cursor and
    /// publishing its signal. Returns how many signals were sent (0 or 1).
    ///
    /// A late poll runs a single step and the next deadline counts from
    /// `now`: time lost to a stalled loop is skipped, not replayed.
    pub fn poll(&mut self, now: Instant, cursor: &mut StudyCursor, chapter_len: usize) -> usize {
        if !self.running {
            return 0;
        }
        match self.deadline {
            Some(due) if due <= now => self.deadline = Some(now + self.period),
            _ => return 0,
        }
        if chapter_len == 0 {
            return 0;
        }

        match self.phase {
            AutoplayPhase::Front => {
                self.publish(AutoplaySignal::Flip);
                self.phase = AutoplayPhase::Back;
            }
            AutoplayPhase::Back => {
                cursor.index = (cursor.index + 1) % chapter_len;
                self.publish(AutoplaySignal::Advance {
                    index: cursor.index,
                });
                self.phase = AutoplayPhase::Front;
            }
        }
        1
    }

    fn publish(&mut self, signal: AutoplaySignal) {
        self.subscribers.retain(|tx| tx.send(signal).is_ok());
    }
}

pub fn clamp_period(period_ms: u64) -> u64 {
    period_ms.clamp(MIN_PERIOD_MS, MAX_PERIOD_MS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::partition::ChapterId;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(rx: &mpsc::Receiver<AutoplaySignal>) -> Vec<AutoplaySignal> {
        rx.try_iter().collect()
    }

    #[test]
    fn period_is_clamped() {
        assert_eq!(AutoplayCoordinator::new(100).period_ms(), MIN_PERIOD_MS);
        assert_eq!(AutoplayCoordinator::new(9000).period_ms(), MAX_PERIOD_MS);
        assert_eq!(AutoplayCoordinator::new(1600).period_ms(), 1600);
    }

    #[test]
    fn nothing_fires_before_first_period() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        assert_eq!(auto.poll(t0 + ms(999), &mut cursor, 3), 0);
        assert!(drain(&rx).is_empty());
    }

    #[test]
    fn k_cycles_alternate_flip_and_advance() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);

        let k = 7;
        let len = 3;
        for step in 1..=(2 * k) {
            auto.poll(t0 + ms(1000 * step), &mut cursor, len);
        }

        let signals = drain(&rx);
        assert_eq!(signals.len(), 2 * k as usize);
        for (i, pair) in signals.chunks(2).enumerate() {
            assert_eq!(pair[0], AutoplaySignal::Flip);
            assert_eq!(pair[1], AutoplaySignal::Advance { index: (i + 1) % len });
        }
        assert_eq!(cursor.index, k as usize % len);
        assert_eq!(auto.phase(), AutoplayPhase::Front);
    }

    #[test]
    fn late_poll_runs_one_step_and_counts_from_now() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);

        assert_eq!(auto.poll(t0 + ms(4500), &mut cursor, 5), 1);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Flip]);
        assert_eq!(cursor.index, 0);
        assert_eq!(auto.deadline(), Some(t0 + ms(5500)));

        assert_eq!(auto.poll(t0 + ms(600_000), &mut cursor, 5), 1);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Advance { index: 1 }]);
        assert_eq!(auto.deadline(), Some(t0 + ms(601_000)));
    }

    #[test]
    fn stop_cancels_pending_deadline() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        auto.poll(t0 + ms(1000), &mut cursor, 3);
        auto.stop();
        assert_eq!(auto.deadline(), None);
        assert_eq!(auto.poll(t0 + ms(10_000), &mut cursor, 3), 0);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Flip]);
        assert_eq!(cursor.index, 0);
    }

    #[test]
    fn restart_begins_in_front_phase() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        auto.poll(t0 + ms(1000), &mut cursor, 3);
        assert_eq!(auto.phase(), AutoplayPhase::Back);

        auto.toggle(t0 + ms(1200));
        auto.toggle(t0 + ms(1300));
        assert_eq!(auto.phase(), AutoplayPhase::Front);
        auto.poll(t0 + ms(2300), &mut cursor, 3);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Flip, AutoplaySignal::Flip]);
    }

    #[test]
    fn period_change_replaces_timer_from_now() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);

        auto.set_period(t0 + ms(900), 3000);
        assert_eq!(auto.poll(t0 + ms(1000), &mut cursor, 3), 0);
        assert_eq!(auto.poll(t0 + ms(3899), &mut cursor, 3), 0);
        assert_eq!(auto.poll(t0 + ms(3900), &mut cursor, 3), 1);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Flip]);
        assert_eq!(auto.deadline(), Some(t0 + ms(6900)));
    }

    #[test]
    fn period_change_while_stopped_does_not_schedule() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        auto.faster(t0);
        assert_eq!(auto.period_ms(), 800);
        auto.faster(t0);
        assert_eq!(auto.period_ms(), 800);
        auto.slower(t0);
        assert_eq!(auto.period_ms(), 1000);
        assert_eq!(auto.deadline(), None);
    }

    #[test]
    fn chapter_restart_resets_phase_and_timer() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        auto.poll(t0 + ms(1000), &mut cursor, 3);
        drain(&rx);

        cursor = StudyCursor {
            chapter: ChapterId::new(2).unwrap(),
            index: 0,
        };
        auto.restart_for_chapter(t0 + ms(1500));
        assert_eq!(auto.phase(), AutoplayPhase::Front);
        assert_eq!(auto.poll(t0 + ms(2000), &mut cursor, 4), 0);
        auto.poll(t0 + ms(2500), &mut cursor, 4);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Flip]);
    }

    #[test]
    fn empty_chapter_never_signals() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        assert_eq!(auto.poll(t0 + ms(10_000), &mut cursor, 0), 0);
        assert!(drain(&rx).is_empty());
        assert_eq!(auto.phase(), AutoplayPhase::Front);
        assert!(auto.is_running());
    }

    #[test]
    fn every_subscriber_sees_each_signal_and_dropped_ones_are_pruned() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let a = auto.subscribe();
        let b = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        auto.poll(t0 + ms(1000), &mut cursor, 2);
        drop(b);
        auto.poll(t0 + ms(2000), &mut cursor, 2);
        assert_eq!(
            drain(&a),
            vec![AutoplaySignal::Flip, AutoplaySignal::Advance { index: 1 }]
        );
        assert_eq!(auto.subscribers.len(), 1);
    }

    #[test]
    fn single_card_chapter_advances_onto_itself() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);
        auto.poll(t0 + ms(1000), &mut cursor, 1);
        auto.poll(t0 + ms(2000), &mut cursor, 1);
        assert_eq!(cursor.index, 0);
        assert_eq!(
            drain(&rx),
            vec![AutoplaySignal::Flip, AutoplaySignal::Advance { index: 0 }]
        );
    }

    #[test]
    fn resync_after_manual_flip_advances_next() {
        let t0 = Instant::now();
        let mut auto = AutoplayCoordinator::new(1000);
        let rx = auto.subscribe();
        let mut cursor = StudyCursor::default();
        auto.start(t0);

        auto.resync(t0 + ms(600), AutoplayPhase::Back);
        assert_eq!(auto.poll(t0 + ms(1000), &mut cursor, 3), 0);
        auto.poll(t0 + ms(1600), &mut cursor, 3);
        assert_eq!(drain(&rx), vec![AutoplaySignal::Advance { index: 1 }]);
    }
}
