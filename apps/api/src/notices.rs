//! User-visible terminal notices for failed assist and export actions.
//!
//! A notice never blocks editing; the client lists and dismisses them.

use std::collections::VecDeque;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

/// Most recent notices kept; older ones fall off.
pub const MAX_NOTICES: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Assist,
    Export,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Notice {
    pub id: u64,
    pub kind: NoticeKind,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Default)]
struct Inner {
    next_id: u64,
    notices: VecDeque<Notice>,
}

#[derive(Debug, Default)]
pub struct NoticeBoard {
    inner: Mutex<Inner>,
}

impl NoticeBoard {
    /// Records a failure the user should see. Returns the notice id.
    pub fn push(&self, kind: NoticeKind, message: impl Into<String>) -> u64 {
        let message = message.into();
        error!(?kind, "{message}");

        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.next_id += 1;
        let id = inner.next_id;
        inner.notices.push_back(Notice {
            id,
            kind,
            message,
            created_at: Utc::now(),
        });
        while inner.notices.len() > MAX_NOTICES {
            inner.notices.pop_front();
        }
        id
    }

    /// Oldest first.
    pub fn list(&self) -> Vec<Notice> {
        let inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.notices.iter().cloned().collect()
    }

    /// Removes one notice; false if it was already gone.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        let before = inner.notices.len();
        inner.notices.retain(|n| n.id != id);
        inner.notices.len() != before
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_list_dismiss() {
        let board = NoticeBoard::default();
        let first = board.push(NoticeKind::Assist, "Failed to suggest skills.");
        let second = board.push(NoticeKind::Export, "Export failed.");

        let listed = board.list();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, first);
        assert_eq!(listed[1].kind, NoticeKind::Export);

        assert!(board.dismiss(first));
        assert!(!board.dismiss(first));
        assert_eq!(board.list()[0].id, second);
    }

    #[test]
    fn test_board_is_bounded() {
        let board = NoticeBoard::default();
        for i in 0..(MAX_NOTICES + 5) {
            board.push(NoticeKind::Export, format!("failure {i}"));
        }
        let listed = board.list();
        assert_eq!(listed.len(), MAX_NOTICES);
        assert_eq!(listed[0].message, "failure 5");
    }
}
