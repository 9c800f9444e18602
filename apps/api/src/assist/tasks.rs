//! Per-key assist task states.
//!
//! Pending is entered through `TaskBoard::begin` and left only through the
//! returned `TaskGuard`, which settles on drop. A call that errors, panics,
//! or is cancelled therefore never leaves its key Pending.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::assist::{AssistError, TaskKey};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TaskState {
    Idle,
    Pending {
        started_at: DateTime<Utc>,
    },
    Succeeded {
        settled_at: DateTime<Utc>,
    },
    Failed {
        settled_at: DateTime<Utc>,
        message: String,
    },
}

impl TaskState {
    pub fn is_pending(&self) -> bool {
        matches!(self, TaskState::Pending { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEntry {
    pub key: TaskKey,
    #[serde(flatten)]
    pub state: TaskState,
}

#[derive(Debug, Default)]
pub struct TaskBoard {
    tasks: Mutex<HashMap<TaskKey, TaskState>>,
}

impl TaskBoard {
    fn lock(&self) -> MutexGuard<'_, HashMap<TaskKey, TaskState>> {
        // State is plain data; a panic elsewhere cannot leave it half-written.
        self.tasks.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Marks `key` Pending. Fails without side effects if it already is.
    pub fn begin(self: &Arc<Self>, key: TaskKey) -> Result<TaskGuard, AssistError> {
        let mut tasks = self.lock();
        if tasks.get(&key).is_some_and(TaskState::is_pending) {
            return Err(AssistError::AlreadyPending(key));
        }
        tasks.insert(
            key.clone(),
            TaskState::Pending {
                started_at: Utc::now(),
            },
        );
        debug!(%key, "Assist task pending");
        Ok(TaskGuard {
            board: Arc::clone(self),
            key,
            outcome: None,
        })
    }

    pub fn state(&self, key: &TaskKey) -> TaskState {
        self.lock().get(key).cloned().unwrap_or(TaskState::Idle)
    }

    /// All known tasks, ordered by key for stable output.
    pub fn entries(&self) -> Vec<TaskEntry> {
        let mut entries: Vec<TaskEntry> = self
            .lock()
            .iter()
            .map(|(key, state)| TaskEntry {
                key: key.clone(),
                state: state.clone(),
            })
            .collect();
        entries.sort_by_key(|e| e.key.to_string());
        entries
    }

    /// Drops every entry `keep` rejects. A guard still running for a dropped
    /// key settles without bringing the entry back.
    pub fn retain(&self, keep: impl Fn(&TaskKey, &TaskState) -> bool) {
        self.lock().retain(|key, state| keep(key, state));
    }

    fn settle(&self, key: &TaskKey, outcome: Result<(), String>) {
        let settled_at = Utc::now();
        let state = match outcome {
            Ok(()) => TaskState::Succeeded { settled_at },
            Err(message) => TaskState::Failed {
                settled_at,
                message,
            },
        };
        debug!(%key, ?state, "Assist task settled");
        if let Some(slot) = self.lock().get_mut(key) {
            *slot = state;
        }
    }
}

/// Holds a key Pending. Dropping it without an outcome settles as failed.
pub struct TaskGuard {
    board: Arc<TaskBoard>,
    key: TaskKey,
    outcome: Option<Result<(), String>>,
}

impl TaskGuard {
    pub fn succeed(mut self) {
        self.outcome = Some(Ok(()));
    }

    pub fn fail(mut self, message: impl Into<String>) {
        self.outcome = Some(Err(message.into()));
    }
}

impl Drop for TaskGuard {
    fn drop(&mut self) {
        let outcome = self
            .outcome
            .take()
            .unwrap_or_else(|| Err("interrupted".to_string()));
        self.board.settle(&self.key, outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_begin_while_pending_is_rejected() {
        let board = Arc::new(TaskBoard::default());
        let guard = board.begin(TaskKey::Summary).unwrap();

        assert!(matches!(
            board.begin(TaskKey::Summary),
            Err(AssistError::AlreadyPending(TaskKey::Summary))
        ));
        // other keys run freely
        let skills = board.begin(TaskKey::Skills).unwrap();

        guard.succeed();
        skills.succeed();
        assert!(board.begin(TaskKey::Summary).is_ok());
    }

    #[test]
    fn test_guard_settles_states() {
        let board = Arc::new(TaskBoard::default());
        assert_eq!(board.state(&TaskKey::Skills), TaskState::Idle);

        board.begin(TaskKey::Skills).unwrap().fail("network down");
        assert!(matches!(
            board.state(&TaskKey::Skills),
            TaskState::Failed { message, .. } if message == "network down"
        ));

        board.begin(TaskKey::Skills).unwrap().succeed();
        assert!(matches!(board.state(&TaskKey::Skills), TaskState::Succeeded { .. }));
    }

    #[test]
    fn test_dropped_guard_is_not_left_pending() {
        let board = Arc::new(TaskBoard::default());
        {
            let _guard = board.begin(TaskKey::Summary).unwrap();
            assert!(board.state(&TaskKey::Summary).is_pending());
        }
        assert!(matches!(board.state(&TaskKey::Summary), TaskState::Failed { .. }));
    }

    #[test]
    fn test_retain_drops_entries_and_late_settles() {
        let board = Arc::new(TaskBoard::default());
        let gone = TaskKey::Enhance {
            section: crate::models::cv::EntitySection::Projects,
            entity_id: "p1".to_string(),
        };
        board.begin(TaskKey::Skills).unwrap().succeed();
        let running = board.begin(gone.clone()).unwrap();

        board.retain(|key, _| !key.targets(crate::models::cv::EntitySection::Projects, "p1"));
        assert_eq!(board.entries().len(), 1);

        running.succeed();
        assert_eq!(board.state(&gone), TaskState::Idle);
        assert_eq!(board.entries().len(), 1);
        assert!(board.begin(gone).is_ok());
    }

    #[test]
    fn test_entries_serialize_with_key() {
        let board = Arc::new(TaskBoard::default());
        let _guard = board
            .begin(TaskKey::Enhance {
                section: crate::models::cv::EntitySection::Experience,
                entity_id: "e1".to_string(),
            })
            .unwrap();

        let json = serde_json::to_value(board.entries()).unwrap();
        assert_eq!(json[0]["key"], "experience:e1");
        assert_eq!(json[0]["state"], "pending");
    }
}
