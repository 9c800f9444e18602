//! Field addressing: the one place that knows how to read or replace a single
//! scalar inside a `CvData`.
//!
//! Every write path (structured editor, inline preview editing, assist results)
//! goes through `apply`. Templates never branch on section/field names.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::models::cv::{
    CvData, Entity, EntitySection, FieldValue, PersonalInfo, ScalarSection, Section,
};

/// Address of a field that lives directly on the document (personal info,
/// summary, the comma-joined skills list).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ScalarAddress {
    pub section: ScalarSection,
    pub field: String,
}

/// Address of a field on one entity, located by id equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyedAddress {
    pub section: EntitySection,
    pub entity_id: String,
    pub field: String,
}

/// `(section, optional entity id, field)` as a tagged union.
///
/// On the wire it is the flat triple `{ "section", "entityId"?, "field" }`;
/// deserialization rejects an entity id on a scalar section and a missing one
/// on a keyed section.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawAddress", into = "RawAddress")]
pub enum FieldAddress {
    Scalar(ScalarAddress),
    Keyed(KeyedAddress),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawAddress {
    section: Section,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    entity_id: Option<String>,
    field: String,
}

#[derive(Debug, Error, PartialEq)]
pub enum AddressError {
    #[error("section '{0}' does not take an entity id")]
    UnexpectedEntityId(Section),

    #[error("section '{0}' requires an entity id")]
    MissingEntityId(Section),
}

impl TryFrom<RawAddress> for FieldAddress {
    type Error = AddressError;

    fn try_from(raw: RawAddress) -> Result<Self, Self::Error> {
        let scalar = |section: ScalarSection| match &raw.entity_id {
            Some(_) => Err(AddressError::UnexpectedEntityId(raw.section)),
            None => Ok(FieldAddress::Scalar(ScalarAddress {
                section,
                field: raw.field.clone(),
            })),
        };
        match raw.section {
            Section::PersonalInfo => scalar(ScalarSection::PersonalInfo),
            Section::Summary => scalar(ScalarSection::Summary),
            Section::Skills => scalar(ScalarSection::Skills),
            keyed => {
                // entity_section() is Some for every remaining variant
                let section = keyed
                    .entity_section()
                    .ok_or(AddressError::MissingEntityId(keyed))?;
                let entity_id = raw
                    .entity_id
                    .clone()
                    .ok_or(AddressError::MissingEntityId(keyed))?;
                Ok(FieldAddress::Keyed(KeyedAddress {
                    section,
                    entity_id,
                    field: raw.field.clone(),
                }))
            }
        }
    }
}

impl From<FieldAddress> for RawAddress {
    fn from(address: FieldAddress) -> Self {
        match address {
            FieldAddress::Scalar(a) => RawAddress {
                section: a.section.into(),
                entity_id: None,
                field: a.field,
            },
            FieldAddress::Keyed(a) => RawAddress {
                section: a.section.into(),
                entity_id: Some(a.entity_id),
                field: a.field,
            },
        }
    }
}

impl FieldAddress {
    pub fn personal(field: &str) -> Self {
        FieldAddress::Scalar(ScalarAddress {
            section: ScalarSection::PersonalInfo,
            field: field.to_string(),
        })
    }

    pub fn summary() -> Self {
        FieldAddress::Scalar(ScalarAddress {
            section: ScalarSection::Summary,
            field: "summary".to_string(),
        })
    }

    pub fn skills() -> Self {
        FieldAddress::Scalar(ScalarAddress {
            section: ScalarSection::Skills,
            field: "skills".to_string(),
        })
    }

    pub fn keyed(section: EntitySection, entity_id: &str, field: &str) -> Self {
        FieldAddress::Keyed(KeyedAddress {
            section,
            entity_id: entity_id.to_string(),
            field: field.to_string(),
        })
    }

    pub fn section(&self) -> Section {
        match self {
            FieldAddress::Scalar(a) => a.section.into(),
            FieldAddress::Keyed(a) => a.section.into(),
        }
    }

    pub fn entity_id(&self) -> Option<&str> {
        match self {
            FieldAddress::Scalar(_) => None,
            FieldAddress::Keyed(a) => Some(&a.entity_id),
        }
    }

    pub fn field(&self) -> &str {
        match self {
            FieldAddress::Scalar(a) => &a.field,
            FieldAddress::Keyed(a) => &a.field,
        }
    }

    /// Newline-significant fields edit in a textarea.
    pub fn is_multiline(&self) -> bool {
        matches!(self.field(), "summary" | "skills" | "description")
    }
}

/// Why a write did not land. Never surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Miss {
    UnknownField,
    EntityNotFound,
    WrongValueKind,
}

// ────────────────────────────────────────────────────────────────────────────
// Resolution
// ────────────────────────────────────────────────────────────────────────────

/// Returns a new document with exactly the addressed field replaced.
///
/// Unresolvable addresses (deleted entity, unknown field, wrong value kind)
/// return an unchanged copy of `doc`.
pub fn apply(doc: &CvData, address: &FieldAddress, value: &FieldValue) -> CvData {
    try_apply(doc, address, value).unwrap_or_else(|miss| {
        debug!(?address, ?miss, "Field write dropped");
        doc.clone()
    })
}

/// Like `apply`, but reports why a write missed.
pub fn try_apply(
    doc: &CvData,
    address: &FieldAddress,
    value: &FieldValue,
) -> Result<CvData, Miss> {
    let mut next = doc.clone();
    match address {
        FieldAddress::Scalar(a) => write_scalar(&mut next, a, value)?,
        FieldAddress::Keyed(a) => match a.section {
            EntitySection::Experience => write_keyed(&mut next.experience, a, value)?,
            EntitySection::Education => write_keyed(&mut next.education, a, value)?,
            EntitySection::Projects => write_keyed(&mut next.projects, a, value)?,
        },
    }
    Ok(next)
}

/// Reads the committed value at `address`; `None` when it does not resolve.
///
/// The skills address reads as the comma-joined list used for editing.
pub fn current_value(doc: &CvData, address: &FieldAddress) -> Option<FieldValue> {
    match address {
        FieldAddress::Scalar(a) => match a.section {
            ScalarSection::PersonalInfo => personal_field(&doc.personal_info, &a.field)
                .map(|s| FieldValue::Text(s.to_string())),
            ScalarSection::Summary => Some(FieldValue::Text(doc.summary.clone())),
            ScalarSection::Skills => Some(FieldValue::Text(join_skills(&doc.skills))),
        },
        FieldAddress::Keyed(a) => match a.section {
            EntitySection::Experience => read_keyed(&doc.experience, a),
            EntitySection::Education => read_keyed(&doc.education, a),
            EntitySection::Projects => read_keyed(&doc.projects, a),
        },
    }
}

/// Splits raw skills input on commas, trimming and dropping empty pieces.
/// Duplicates are kept; only the suggestion merge deduplicates.
pub fn split_skills(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Re-splits stored skills so every entry is a single trimmed, comma-free
/// piece. Documents held by the store are kept in this form, which makes the
/// comma-joined editing view round-trip exactly.
pub fn normalize_skills(skills: &[String]) -> Vec<String> {
    skills.iter().flat_map(|s| split_skills(s)).collect()
}

pub fn join_skills(skills: &[String]) -> String {
    skills.join(", ")
}

fn write_scalar(doc: &mut CvData, address: &ScalarAddress, value: &FieldValue) -> Result<(), Miss> {
    let text = value.as_text().ok_or(Miss::WrongValueKind)?;
    match address.section {
        ScalarSection::PersonalInfo => write_personal(&mut doc.personal_info, &address.field, text),
        ScalarSection::Summary => {
            doc.summary = text.to_string();
            Ok(())
        }
        ScalarSection::Skills => {
            doc.skills = split_skills(text);
            Ok(())
        }
    }
}

fn write_personal(info: &mut PersonalInfo, field: &str, text: &str) -> Result<(), Miss> {
    let slot = match field {
        "fullName" => &mut info.full_name,
        "email" => &mut info.email,
        "phone" => &mut info.phone,
        "location" => &mut info.location,
        "website" => &mut info.website,
        "linkedin" => &mut info.linkedin,
        "twitter" => &mut info.twitter,
        "github" => &mut info.github,
        "profilePicture" => {
            info.profile_picture = (!text.is_empty()).then(|| text.to_string());
            return Ok(());
        }
        _ => return Err(Miss::UnknownField),
    };
    *slot = text.to_string();
    Ok(())
}

fn personal_field<'a>(info: &'a PersonalInfo, field: &str) -> Option<&'a str> {
    Some(match field {
        "fullName" => info.full_name.as_str(),
        "email" => info.email.as_str(),
        "phone" => info.phone.as_str(),
        "location" => info.location.as_str(),
        "website" => info.website.as_str(),
        "linkedin" => info.linkedin.as_str(),
        "twitter" => info.twitter.as_str(),
        "github" => info.github.as_str(),
        "profilePicture" => info.profile_picture.as_deref().unwrap_or_default(),
        _ => return None,
    })
}

fn write_keyed<E: Entity>(
    entities: &mut [E],
    address: &KeyedAddress,
    value: &FieldValue,
) -> Result<(), Miss> {
    let entity = entities
        .iter_mut()
        .find(|e| e.id() == address.entity_id)
        .ok_or(Miss::EntityNotFound)?;
    if entity.get(&address.field).is_none() {
        return Err(Miss::UnknownField);
    }
    if entity.set(&address.field, value) {
        Ok(())
    } else {
        Err(Miss::WrongValueKind)
    }
}

fn read_keyed<E: Entity>(entities: &[E], address: &KeyedAddress) -> Option<FieldValue> {
    entities
        .iter()
        .find(|e| e.id() == address.entity_id)
        .and_then(|e| e.get(&address.field))
}
