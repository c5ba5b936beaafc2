//! Circular sequence-number arithmetic shared by both windows.
//!
//! 两个窗口共享的循环序列号运算。

use crate::config::WindowConfig;

/// A sequence number on the wire. Values live in `[0, max_seq]`.
/// 线路上的序列号，取值范围为 `[0, max_seq]`。
pub type SeqNum = u8;

/// Returns true iff `b` lies in the circular half-open interval `[a, c)`.
///
/// Works for any modulus as long as all three values are already reduced.
///
/// 当且仅当 `b` 位于循环半开区间 `[a, c)` 内时返回 true。
pub fn between(a: SeqNum, b: SeqNum, c: SeqNum) -> bool {
    (a <= b && b < c) || (c < a && a <= b) || (b < c && c < a)
}

/// The modulus and window size of one link, with helpers for wrapping
/// arithmetic and ring indexing.
///
/// 一条链路的模数和窗口大小，并提供环绕运算与环形索引的辅助方法。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceSpace {
    modulus: usize,
    window: usize,
}

impl SequenceSpace {
    pub fn new(max_seq: SeqNum, window_size: u8) -> Self {
        Self {
            modulus: max_seq as usize + 1,
            window: window_size as usize,
        }
    }

    pub fn from_config(config: &WindowConfig) -> Self {
        Self::new(config.max_seq, config.window_size)
    }

    /// Number of ring slots, `W`.
    pub fn window_size(&self) -> usize {
        self.window
    }

    /// See [`between`].
    pub fn between(&self, a: SeqNum, b: SeqNum, c: SeqNum) -> bool {
        between(a, b, c)
    }

    pub fn next(&self, seq: SeqNum) -> SeqNum {
        self.add(seq, 1)
    }

    pub fn prev(&self, seq: SeqNum) -> SeqNum {
        ((seq as usize + self.modulus - 1) % self.modulus) as SeqNum
    }

    pub fn add(&self, seq: SeqNum, n: usize) -> SeqNum {
        ((seq as usize + n % self.modulus) % self.modulus) as SeqNum
    }

    /// Circular distance from `a` forward to `b`.
    ///
    /// 从 `a` 向前到 `b` 的循环距离。
    pub fn distance(&self, a: SeqNum, b: SeqNum) -> usize {
        (b as usize + self.modulus - a as usize) % self.modulus
    }

    /// Ring index of `seq`: `seq mod W`.
    ///
    /// `seq` 的环形索引：`seq mod W`。
    pub fn slot(&self, seq: SeqNum) -> usize {
        seq as usize % self.window
    }
}
