use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NotificationKind {
    Info,
    Quest,
    Warning,
}

impl NotificationKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Quest => "quest",
            NotificationKind::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Notification {
    pub(crate) kind: NotificationKind,
    pub(crate) text: String,
}

/// Messages queued by the simulation for the presentation layer.
#[derive(Debug, Default)]
pub(crate) struct Notifications {
    queue: VecDeque<Notification>,
}

impl Notifications {
    pub(crate) fn push(&mut self, kind: NotificationKind, text: impl Into<String>) {
        self.queue.push_back(Notification {
            kind,
            text: text.into(),
        });
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = Notification> + '_ {
        self.queue.drain(..)
    }

    #[cfg(test)]
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Notification> {
        self.queue.iter()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
