//! 定时器模块
//! Timer Module
//!
//! The protocol core only asks for timers to be started and stopped by key.
//! [`TimerTable`] is the deadline table the async driver keeps on behalf of
//! the core: one entry per data slot plus one for the delayed ACK, so
//! restarting a timer simply replaces its deadline.
//!
//! 协议核心只按键启动和停止定时器。[`TimerTable`] 是异步驱动为核心维护的截止
//! 时间表：每个数据槽一个条目，外加一个延迟确认条目，因此重启定时器只需替换
//! 其截止时间。

use crate::core::sequence::SeqNum;
use tokio::time::Instant;


/// Identifies a timer owned by the protocol core.
/// 标识协议核心拥有的一个定时器。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKey {
    /// Retransmission timer of an outstanding DATA frame. Carries the full
    /// sequence number so that a stale firing can be recognized.
    /// 在途 DATA 帧的重传定时器。携带完整序列号以便识别过期的触发。
    Data(SeqNum),
    /// The receiver's delayed-ACK timer.
    /// 接收方的延迟确认定时器。
    Ack,
}

impl TimerKey {
    /// Table position of this key: `seq mod W` for data timers, `W` for the
    /// delayed ACK.
    ///
    /// 此键在表中的位置：数据定时器为 `seq mod W`，延迟确认为 `W`。
    pub fn index(&self, window: usize) -> usize {
        match self {
            TimerKey::Data(seq) => *seq as usize % window,
            TimerKey::Ack => window,
        }
    }
}

/// A fixed table of deadlines keyed by [`TimerKey::index`].
///
/// 以 [`TimerKey::index`] 为键的固定截止时间表。
#[derive(Debug)]
pub struct TimerTable {
    window: usize,
    entries: Vec<Option<(TimerKey, Instant)>>,
}

impl TimerTable {
    pub fn new(window: usize) -> Self {
        Self {
            window,
            entries: vec![None; window + 1],
        }
    }

    /// Arms `key`, replacing whatever occupied its position.
    ///
    /// 启动 `key`，替换其位置上原有的任何定时器。
    pub fn start(&mut self, key: TimerKey, deadline: Instant) {
        let index = key.index(self.window);
        self.entries[index] = Some((key, deadline));
    }

    /// Disarms `key`. A different key sharing the position is left alone.
    /// Returns whether anything was disarmed.
    ///
    /// 解除 `key`。共享同一位置的不同键保持不变。返回是否解除了定时器。
    pub fn stop(&mut self, key: TimerKey) -> bool {
        if !self.is_armed(key) {
            return false;
        }
        self.entries[key.index(self.window)] = None;
        true
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        matches!(self.entries[key.index(self.window)], Some((armed, _)) if armed == key)
    }

    /// The earliest armed deadline.
    /// 最早的已启动截止时间。
    pub fn next_deadline(&self) -> Option<Instant> {
        self.entries
            .iter()
            .filter_map(|entry| entry.map(|(_, deadline)| deadline))
            .min()
    }

    /// Removes and returns every timer whose deadline is at or before `now`,
    /// earliest first.
    ///
    /// 移除并返回所有截止时间不晚于 `now` 的定时器，最早的在前。
    pub fn pop_expired(&mut self, now: Instant) -> Vec<TimerKey> {
        let mut expired: Vec<(Instant, TimerKey)> = Vec::new();
        for entry in self.entries.iter_mut() {
            if let Some((key, deadline)) = *entry {
                if deadline <= now {
                    expired.push((deadline, key));
                    *entry = None;
                }
            }
        }
        expired.sort_by_key(|(deadline, _)| *deadline);
        expired.into_iter().map(|(_, key)| key).collect()
    }
}
