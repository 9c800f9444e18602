//! Structured editor operations: entity lifecycle, the `current` toggle, the
//! profile picture, and the form projection the editor pane renders.
//!
//! Every function here is pure: it takes a snapshot and returns the next one.

use serde::Serialize;
use uuid::Uuid;

use crate::document::address::{apply, current_value, FieldAddress};
use crate::document::session::EditController;
use crate::models::cv::{
    CvData, Education, Entity, EntitySection, Experience, FieldValue, Language, Project, Section,
};
use crate::render::labels::{field_label, labels};

const PERSONAL_FIELDS: [&str; 8] = [
    "fullName", "email", "phone", "location", "website", "linkedin", "twitter", "github",
];

/// Prepends a blank entity with a fresh id; returns the new document and id.
pub fn add_entity(doc: &CvData, section: EntitySection) -> (CvData, String) {
    let id = Uuid::new_v4().to_string();
    let mut next = doc.clone();
    match section {
        EntitySection::Experience => next.experience.insert(0, Experience::blank(id.clone())),
        EntitySection::Education => next.education.insert(0, Education::blank(id.clone())),
        EntitySection::Projects => next.projects.insert(0, Project::blank(id.clone())),
    }
    (next, id)
}

/// Removes the entity with `id`. An unknown id leaves the document as is.
pub fn remove_entity(doc: &CvData, section: EntitySection, id: &str) -> CvData {
    let mut next = doc.clone();
    match section {
        EntitySection::Experience => next.experience.retain(|e| e.id != id),
        EntitySection::Education => next.education.retain(|e| e.id != id),
        EntitySection::Projects => next.projects.retain(|p| p.id != id),
    }
    next
}

/// Toggles `current`. The stored end date is retained so switching back off
/// restores it; renderers ignore it while `current` is set.
pub fn set_current(doc: &CvData, section: EntitySection, id: &str, current: bool) -> CvData {
    apply(
        doc,
        &FieldAddress::keyed(section, id, "current"),
        &FieldValue::Flag(current),
    )
}

/// Sets (data URI or URL) or clears the profile picture.
pub fn set_profile_picture(doc: &CvData, picture: Option<&str>) -> CvData {
    apply(
        doc,
        &FieldAddress::personal("profilePicture"),
        &FieldValue::Text(picture.unwrap_or_default().to_string()),
    )
}

// ────────────────────────────────────────────────────────────────────────────
// Form projection
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorForm {
    pub language: Language,
    /// Epoch the form was built in; edits against an older epoch are dropped.
    pub epoch: u64,
    pub sections: Vec<FormSection>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormSection {
    pub section: Section,
    pub title: &'static str,
    pub groups: Vec<FormGroup>,
}

/// One card in the form: the scalar fields of a section, or one entity.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormGroup {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    pub fields: Vec<FormField>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormField {
    pub address: FieldAddress,
    pub label: String,
    pub value: FieldValue,
    pub multiline: bool,
    /// The end date input is disabled while `current` is set.
    pub disabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft: Option<String>,
}

/// Builds the structured editor view of `doc`. Unlike previews, empty
/// sections are kept so the user can add to them.
pub fn form(doc: &CvData, language: Language, epoch: u64, edit: &dyn EditController) -> EditorForm {
    let text = labels(language);
    let field = |address: FieldAddress, disabled: bool| -> Option<FormField> {
        let value = current_value(doc, &address)?;
        Some(FormField {
            label: field_label(language, address.field()).to_string(),
            multiline: address.is_multiline(),
            draft: edit.draft_for(&address).map(str::to_string),
            value,
            disabled,
            address,
        })
    };

    let personal = PERSONAL_FIELDS
        .iter()
        .chain(std::iter::once(&"profilePicture"))
        .filter_map(|name| field(FieldAddress::personal(name), false))
        .collect();

    let mut sections = vec![
        FormSection {
            section: Section::PersonalInfo,
            title: text.personal_details,
            groups: vec![FormGroup {
                entity_id: None,
                fields: personal,
            }],
        },
        FormSection {
            section: Section::Summary,
            title: text.summary,
            groups: vec![FormGroup {
                entity_id: None,
                fields: field(FieldAddress::summary(), false).into_iter().collect(),
            }],
        },
    ];

    sections.push(entity_section(&doc.experience, EntitySection::Experience, text.experience, &field));
    sections.push(entity_section(&doc.education, EntitySection::Education, text.education, &field));
    sections.push(entity_section(&doc.projects, EntitySection::Projects, text.projects, &field));
    sections.push(FormSection {
        section: Section::Skills,
        title: text.skills,
        groups: vec![FormGroup {
            entity_id: None,
            fields: field(FieldAddress::skills(), false).into_iter().collect(),
        }],
    });

    EditorForm {
        language,
        epoch,
        sections,
    }
}

fn entity_section<E, F>(
    entities: &[E],
    section: EntitySection,
    title: &'static str,
    field: &F,
) -> FormSection
where
    E: Entity,
    F: Fn(FieldAddress, bool) -> Option<FormField>,
{
    let groups = entities
        .iter()
        .map(|entity| FormGroup {
            entity_id: Some(entity.id().to_string()),
            fields: E::FIELDS
                .iter()
                .filter_map(|name| {
                    let disabled = *name == "endDate" && entity.is_current();
                    field(FieldAddress::keyed(section, entity.id(), name), disabled)
                })
                .collect(),
        })
        .collect();
    FormSection {
        section: section.into(),
        title,
        groups,
    }
}
