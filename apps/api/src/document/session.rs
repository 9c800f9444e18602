//! Inline editing session: one active field per view.
//!
//! Idle → Editing(address, draft) → Idle. Leaving Editing either commits the
//! draft through the store or discards it. Sessions are tagged with the store
//! epoch they were opened in so a reset invalidates them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::document::address::{current_value, FieldAddress};
use crate::models::cv::{CvData, FieldValue};

/// Keys the session reacts to. Anything else is plain typing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditKey {
    Enter,
    Escape,
}

/// A draft leaving the session, to be routed into `DocumentStore::commit`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    pub address: FieldAddress,
    pub value: FieldValue,
    pub epoch: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EditSession {
    #[default]
    Idle,
    Editing {
        address: FieldAddress,
        draft: String,
        epoch: u64,
    },
}

/// What `activate` did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Activation {
    /// The previously active field, committed on focus-out.
    pub previous: Option<Commit>,
    /// False when the new address did not resolve to a text field.
    pub editing: bool,
}

impl EditSession {
    /// Enters Editing on `address` with the draft seeded from `doc`.
    ///
    /// A field already in Editing is committed first. Only text fields can be
    /// activated; the `current` flag is toggled directly, not edited.
    pub fn activate(&mut self, doc: &CvData, address: FieldAddress, epoch: u64) -> Activation {
        if matches!(self, EditSession::Editing { address: active, .. } if *active == address) {
            return Activation {
                previous: None,
                editing: true,
            };
        }

        let previous = self.commit();
        let editing = match current_value(doc, &address) {
            Some(FieldValue::Text(draft)) => {
                *self = EditSession::Editing {
                    address,
                    draft,
                    epoch,
                };
                true
            }
            _ => false,
        };
        Activation { previous, editing }
    }

    /// Replaces the draft. Returns false when Idle.
    pub fn update_draft(&mut self, text: &str) -> bool {
        match self {
            EditSession::Editing { draft, .. } => {
                text.clone_into(draft);
                true
            }
            EditSession::Idle => false,
        }
    }

    /// Editing → Idle, yielding the draft for the store.
    pub fn commit(&mut self) -> Option<Commit> {
        match std::mem::take(self) {
            EditSession::Editing {
                address,
                draft,
                epoch,
            } => Some(Commit {
                address,
                value: FieldValue::Text(draft),
                epoch,
            }),
            EditSession::Idle => None,
        }
    }

    /// Editing → Idle, discarding the draft.
    pub fn cancel(&mut self) {
        *self = EditSession::Idle;
    }

    pub fn on_key(&mut self, key: EditKey) -> Option<Commit> {
        match key {
            EditKey::Enter => self.commit(),
            EditKey::Escape => {
                self.cancel();
                None
            }
        }
    }

    /// Focus left the active field.
    pub fn on_blur(&mut self) -> Option<Commit> {
        self.commit()
    }

    pub fn active_address(&self) -> Option<&FieldAddress> {
        match self {
            EditSession::Editing { address, .. } => Some(address),
            EditSession::Idle => None,
        }
    }

    pub fn epoch(&self) -> Option<u64> {
        match self {
            EditSession::Editing { epoch, .. } => Some(*epoch),
            EditSession::Idle => None,
        }
    }
}

/// What renderers need from an editing session: the draft shown in place of
/// the committed value at exactly one address.
pub trait EditController {
    fn draft_for(&self, address: &FieldAddress) -> Option<&str>;
}

impl EditController for EditSession {
    fn draft_for(&self, address: &FieldAddress) -> Option<&str> {
        match self {
            EditSession::Editing {
                address: active,
                draft,
                ..
            } if active == address => Some(draft),
            _ => None,
        }
    }
}

/// Renders every field as committed text.
pub struct ReadOnly;

impl EditController for ReadOnly {
    fn draft_for(&self, _address: &FieldAddress) -> Option<&str> {
        None
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Per-view sessions
// ────────────────────────────────────────────────────────────────────────────

/// One editing session per named view (editor form, each preview pane).
#[derive(Debug, Default)]
pub struct ViewSessions {
    sessions: HashMap<String, EditSession>,
}

impl ViewSessions {
    /// The view's session, discarding it first if it predates `epoch`.
    ///
    /// Other views are kept only while they hold a live edit.
    pub fn session_mut(&mut self, view: &str, epoch: u64) -> &mut EditSession {
        self.sessions
            .retain(|name, session| name == view || session.epoch() == Some(epoch));
        let session = self.sessions.entry(view.to_string()).or_default();
        if session.epoch().is_some_and(|opened| opened != epoch) {
            session.cancel();
        }
        session
    }

    /// The view's session as seen at `epoch`. Reading never registers a view.
    pub fn session(&self, view: &str, epoch: u64) -> EditSession {
        match self.sessions.get(view) {
            Some(session) if session.epoch() == Some(epoch) => session.clone(),
            _ => EditSession::Idle,
        }
    }

    #[cfg(test)]
    pub(crate) fn open_views(&self) -> usize {
        self.sessions.len()
    }

    /// Drops every session. Called on reset.
    pub fn remount(&mut self) {
        self.sessions.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::address::apply;
    use crate::models::cv::{EntitySection, Experience};

    fn doc() -> CvData {
        let mut doc = CvData::empty();
        doc.personal_info.full_name = "Ada".to_string();
        doc.summary = "Analyst".to_string();
        doc.experience = vec![
            Experience {
                id: "e1".to_string(),
                position: "Engineer".to_string(),
                ..Experience::default()
            },
            Experience {
                id: "e2".to_string(),
                position: "Writer".to_string(),
                ..Experience::default()
            },
        ];
        doc
    }

    #[test]
    fn test_activate_seeds_draft_from_committed_value() {
        let mut session = EditSession::Idle;
        let activation = session.activate(&doc(), FieldAddress::personal("fullName"), 0);

        assert!(activation.editing);
        assert!(activation.previous.is_none());
        assert_eq!(session.draft_for(&FieldAddress::personal("fullName")), Some("Ada"));
    }

    #[test]
    fn test_enter_commits_draft() {
        let mut session = EditSession::Idle;
        session.activate(&doc(), FieldAddress::summary(), 3);
        session.update_draft("Analyst and poet");

        let commit = session.on_key(EditKey::Enter).unwrap();
        assert_eq!(commit.address, FieldAddress::summary());
        assert_eq!(commit.value, FieldValue::Text("Analyst and poet".to_string()));
        assert_eq!(commit.epoch, 3);
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn test_escape_discards_draft() {
        let mut session = EditSession::Idle;
        session.activate(&doc(), FieldAddress::summary(), 0);
        session.update_draft("scratch");

        assert!(session.on_key(EditKey::Escape).is_none());
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn test_blur_commits() {
        let mut session = EditSession::Idle;
        session.activate(&doc(), FieldAddress::personal("email"), 0);
        session.update_draft("ada@example.com");

        let commit = session.on_blur().unwrap();
        let next = apply(&doc(), &commit.address, &commit.value);
        assert_eq!(next.personal_info.email, "ada@example.com");
    }

    #[test]
    fn test_activating_second_field_commits_first() {
        let mut session = EditSession::Idle;
        session.activate(&doc(), FieldAddress::personal("fullName"), 0);
        session.update_draft("Ada Lovelace");

        let activation = session.activate(&doc(), FieldAddress::summary(), 0);

        let previous = activation.previous.unwrap();
        assert_eq!(previous.address, FieldAddress::personal("fullName"));
        assert_eq!(previous.value, FieldValue::Text("Ada Lovelace".to_string()));
        assert_eq!(session.active_address(), Some(&FieldAddress::summary()));
    }

    #[test]
    fn test_reactivating_same_field_keeps_draft() {
        let mut session = EditSession::Idle;
        session.activate(&doc(), FieldAddress::summary(), 0);
        session.update_draft("typing");

        let activation = session.activate(&doc(), FieldAddress::summary(), 0);
        assert!(activation.previous.is_none());
        assert_eq!(session.draft_for(&FieldAddress::summary()), Some("typing"));
    }

    #[test]
    fn test_same_field_on_sibling_entity_is_not_active() {
        let mut session = EditSession::Idle;
        let first = FieldAddress::keyed(EntitySection::Experience, "e1", "position");
        let second = FieldAddress::keyed(EntitySection::Experience, "e2", "position");
        session.activate(&doc(), first.clone(), 0);

        assert_eq!(session.draft_for(&first), Some("Engineer"));
        assert_eq!(session.draft_for(&second), None);
    }

    #[test]
    fn test_flag_and_unknown_addresses_stay_idle() {
        let mut session = EditSession::Idle;
        let flag = FieldAddress::keyed(EntitySection::Experience, "e1", "current");
        assert!(!session.activate(&doc(), flag, 0).editing);

        let missing = FieldAddress::keyed(EntitySection::Experience, "gone", "position");
        assert!(!session.activate(&doc(), missing, 0).editing);
        assert_eq!(session, EditSession::Idle);
    }

    #[test]
    fn test_update_draft_when_idle_is_rejected() {
        let mut session = EditSession::Idle;
        assert!(!session.update_draft("lost"));
        assert!(session.commit().is_none());
    }

    #[test]
    fn test_view_session_from_old_epoch_is_discarded() {
        let mut views = ViewSessions::default();
        views
            .session_mut("preview", 0)
            .activate(&doc(), FieldAddress::summary(), 0);

        let session = views.session_mut("preview", 1);
        assert_eq!(*session, EditSession::Idle);
    }

    #[test]
    fn test_reading_a_view_does_not_register_it() {
        let mut views = ViewSessions::default();
        for n in 0..100 {
            assert_eq!(views.session(&format!("view-{n}"), 0), EditSession::Idle);
        }
        assert!(views.sessions.is_empty());

        views
            .session_mut("preview", 0)
            .activate(&doc(), FieldAddress::summary(), 0);
        assert!(views.session("preview", 0).active_address().is_some());
        assert_eq!(views.session("preview", 1), EditSession::Idle);
    }

    #[test]
    fn test_idle_views_are_released() {
        let mut views = ViewSessions::default();
        views
            .session_mut("editor", 0)
            .activate(&doc(), FieldAddress::summary(), 0);
        for n in 0..50 {
            views.session_mut(&format!("view-{n}"), 0);
        }
        views.session_mut("last", 0);
        assert_eq!(views.sessions.len(), 2);
        assert!(views.sessions.contains_key("editor"));

        views.session_mut("editor", 0).cancel();
        views.session_mut("last", 0);
        assert_eq!(views.sessions.len(), 1);
    }

    #[test]
    fn test_views_are_independent() {
        let mut views = ViewSessions::default();
        views
            .session_mut("editor", 0)
            .activate(&doc(), FieldAddress::summary(), 0);
        views
            .session_mut("preview", 0)
            .activate(&doc(), FieldAddress::personal("fullName"), 0);

        assert_eq!(
            views.sessions.get("editor").and_then(EditSession::active_address),
            Some(&FieldAddress::summary())
        );
        views.remount();
        assert!(views.sessions.get("editor").is_none());
    }
}
