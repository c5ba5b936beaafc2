//! The protocol core: sequence arithmetic, the two window halves and the
//! event dispatcher that drives them.
//! 协议核心：序列号运算、窗口的两半以及驱动它们的事件分发器。

pub mod endpoint;
pub mod reliability;
pub mod sequence;

#[cfg(test)]
pub mod test_utils;
