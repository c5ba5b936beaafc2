//! The seam between the protocol core and its environment.
//! 协议核心与其环境之间的接缝。

use crate::{packet::frame::Frame, timer::TimerKey};
use bytes::Bytes;
use std::time::Duration;

/// Everything the protocol core needs from the outside world.
///
/// The core never blocks on any of these calls. The async driver implements
/// it over a frame queue, a [`TimerTable`](crate::timer::TimerTable) and the
/// upper-layer channels; tests implement it by recording calls.
///
/// 协议核心对外部世界的全部需求。核心从不在这些调用上阻塞。
pub trait LinkIo {
    /// Hands a frame to the physical transport.
    /// 将帧交给物理传输层。
    fn transmit(&mut self, frame: &Frame);

    /// Starts (or restarts) the timer `key`.
    /// 启动（或重启）定时器 `key`。
    fn start_timer(&mut self, key: TimerKey, duration: Duration);

    /// Stops the timer `key` if it is running.
    /// 如果定时器 `key` 正在运行则停止它。
    fn stop_timer(&mut self, key: TimerKey);

    /// Takes the next packet offered by the upper layer.
    /// 取出上层提供的下一个数据包。
    fn fetch_packet(&mut self) -> Option<Bytes>;

    /// Delivers a packet to the upper layer, in order.
    /// 按序向上层交付数据包。
    fn deliver_packet(&mut self, packet: Bytes);

    /// Opens or closes the upper layer's admission.
    /// 打开或关闭上层的接纳。
    fn set_admission(&mut self, open: bool);
}
