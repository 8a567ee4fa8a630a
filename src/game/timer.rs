use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum TimerSignal {
    Remaining { seconds: u32 },
    Expired,
}

/// 倒计时：每秒 tick 一次，剩余时间降到 0 及以下时发出一次结束信号并回到空闲。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerEngine {
    phase: TimerPhase,
    remaining: i64,
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TimerEngine {
    pub fn new() -> Self {
        Self {
            phase: TimerPhase::Idle,
            remaining: 0,
        }
    }

    pub fn started(duration_seconds: u32) -> Self {
        let mut timer = Self::new();
        timer.start(duration_seconds);
        timer
    }

    pub fn start(&mut self, duration_seconds: u32) {
        self.phase = TimerPhase::Running;
        self.remaining = i64::from(duration_seconds);
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn remaining(&self) -> u32 {
        u32::try_from(self.remaining.max(0)).unwrap_or(u32::MAX)
    }

    pub fn display(&self) -> String {
        format_clock(self.remaining())
    }

    pub fn tick(&mut self) -> Option<TimerSignal> {
        self.deduct(1)
    }

    /// 扣除罚时；若因此归零则立即结束，不等下一次 tick。
    pub fn apply_penalty(&mut self, seconds: u32) -> Option<TimerSignal> {
        self.deduct(i64::from(seconds))
    }

    pub fn stop(&mut self) {
        self.phase = TimerPhase::Idle;
    }

    fn deduct(&mut self, seconds: i64) -> Option<TimerSignal> {
        if !self.is_running() {
            return None;
        }
        self.remaining -= seconds;
        if self.remaining <= 0 {
            self.remaining = 0;
            self.phase = TimerPhase::Idle;
            return Some(TimerSignal::Expired);
        }
        Some(TimerSignal::Remaining {
            seconds: self.remaining(),
        })
    }
}

/// 秒数格式化为 `mm:ss`，分钟不做小时进位。
pub fn format_clock(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_is_zero_padded() {
        assert_eq!(format_clock(0), "00:00");
        assert_eq!(format_clock(9), "00:09");
        assert_eq!(format_clock(60), "01:00");
        assert_eq!(format_clock(185), "03:05");
        assert_eq!(format_clock(6000), "100:00");
    }

    #[test]
    fn ten_ticks_expire_a_ten_second_timer_once() {
        let mut timer = TimerEngine::started(10);
        assert_eq!(timer.display(), "00:10");

        let mut expirations = 0;
        for _ in 0..10 {
            if timer.tick() == Some(TimerSignal::Expired) {
                expirations += 1;
            }
            assert!(!timer.display().starts_with('-'));
        }
        assert_eq!(expirations, 1);
        assert_eq!(timer.phase(), TimerPhase::Idle);

        assert_eq!(timer.tick(), None, "idle timer ignores further ticks");
        assert_eq!(timer.display(), "00:00");
    }

    #[test]
    fn penalty_past_zero_expires_immediately() {
        let mut timer = TimerEngine::started(10);
        assert_eq!(timer.apply_penalty(15), Some(TimerSignal::Expired));
        assert_eq!(timer.remaining(), 0);
        assert_eq!(timer.display(), "00:00");
        assert!(!timer.is_running());
    }

    #[test]
    fn penalty_within_budget_keeps_running() {
        let mut timer = TimerEngine::started(60);
        assert_eq!(
            timer.apply_penalty(15),
            Some(TimerSignal::Remaining { seconds: 45 })
        );
        assert_eq!(
            timer.tick(),
            Some(TimerSignal::Remaining { seconds: 44 })
        );
        assert_eq!(timer.display(), "00:44");
    }

    #[test]
    fn stopped_timer_ignores_penalties() {
        let mut timer = TimerEngine::started(30);
        timer.stop();
        assert_eq!(timer.apply_penalty(15), None);
        assert_eq!(timer.remaining(), 30);
    }
}
