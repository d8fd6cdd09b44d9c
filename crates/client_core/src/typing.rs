//! The single shared "assistant is typing" flag.

use tokio::sync::watch;

/// A plain visibility flag, not a counter: any `hide` clears it no matter
/// how many `show` calls came before.
pub struct TypingIndicator {
    visible: watch::Sender<bool>,
}

impl Default for TypingIndicator {
    fn default() -> Self {
        Self::new()
    }
}

impl TypingIndicator {
    pub fn new() -> Self {
        let (visible, _) = watch::channel(false);
        Self { visible }
    }

    pub fn show(&self) {
        self.set(true);
    }

    pub fn hide(&self) {
        self.set(false);
    }

    pub fn is_visible(&self) -> bool {
        *self.visible.borrow()
    }

    /// Receiver that wakes on every visibility change.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.visible.subscribe()
    }

    fn set(&self, visible: bool) {
        self.visible.send_if_modified(|current| {
            if *current == visible {
                return false;
            }
            *current = visible;
            true
        });
    }
}
