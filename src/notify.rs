use tokio::sync::broadcast;

use crate::limits::NOTICE_CHANNEL_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Danger,
}

/// A short message meant for a transient toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Broadcast hub for user-facing notices.
pub struct NoticeHub {
    sender: broadcast::Sender<Notice>,
}

impl Default for NoticeHub {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeHub {
    pub fn new() -> Self {
        Self {
            sender: broadcast::channel(NOTICE_CHANNEL_CAPACITY).0,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }

    /// Send a notice. No-op if nobody is listening.
    pub fn send(&self, level: NoticeLevel, message: impl Into<String>) {
        let _ = self.sender.send(Notice {
            level,
            message: message.into(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribe_and_receive() {
        let hub = NoticeHub::new();
        let mut rx = hub.subscribe();
        hub.send(NoticeLevel::Warning, "slot not available");

        let received = rx.recv().await.unwrap();
        assert_eq!(received.level, NoticeLevel::Warning);
        assert_eq!(received.message, "slot not available");
    }

    #[tokio::test]
    async fn send_without_subscribers_is_noop() {
        let hub = NoticeHub::new();
        // No subscriber, must not panic
        hub.send(NoticeLevel::Info, "nobody hears this");
    }
}
