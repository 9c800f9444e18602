use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The résumé document. One instance per session; every mutation produces a
/// new value (see `document::address::apply`).
///
/// Field names serialize in camelCase so documents written by the browser
/// client (`personalInfo`, `startDate`, ...) round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CvData {
    pub personal_info: PersonalInfo,
    pub summary: String,
    pub experience: Vec<Experience>,
    pub education: Vec<Education>,
    pub skills: Vec<String>,
    pub projects: Vec<Project>,
}

impl CvData {
    pub fn empty() -> Self {
        Self::default()
    }

    /// True when `section` has nothing to show. Previews and every export
    /// omit such sections; personal info is the header and never empty.
    pub fn is_section_empty(&self, section: Section) -> bool {
        match section {
            Section::PersonalInfo => false,
            Section::Summary => self.summary.trim().is_empty(),
            Section::Skills => self.skills.is_empty(),
            Section::Experience => self.experience.is_empty(),
            Section::Education => self.education.is_empty(),
            Section::Projects => self.projects.is_empty(),
        }
    }

    /// True when at least one entity in any keyed section carries `id`.
    pub fn contains_entity(&self, id: &str) -> bool {
        self.experience.iter().any(|e| e.id == id)
            || self.education.iter().any(|e| e.id == id)
            || self.projects.iter().any(|p| p.id == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub linkedin: String,
    pub twitter: String,
    pub github: String,
    /// Data URI or external URL. An empty string reads as no picture.
    #[serde(
        skip_serializing_if = "Option::is_none",
        deserialize_with = "empty_as_none"
    )]
    pub profile_picture: Option<String>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Education {
    pub id: String,
    pub institution: String,
    pub degree: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Project {
    pub id: String,
    pub name: String,
    pub description: String,
    pub link: String,
    pub start_date: String,
    pub end_date: String,
    pub current: bool,
}

// ────────────────────────────────────────────────────────────────────────────
// Sections
// ────────────────────────────────────────────────────────────────────────────

/// Top-level parts of a `CvData` that a field address can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Section {
    PersonalInfo,
    Summary,
    Skills,
    Experience,
    Education,
    Projects,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::PersonalInfo => "personalInfo",
            Section::Summary => "summary",
            Section::Skills => "skills",
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
        }
    }

    /// The keyed (entity-carrying) view of this section, if it is one.
    pub fn entity_section(&self) -> Option<EntitySection> {
        match self {
            Section::Experience => Some(EntitySection::Experience),
            Section::Education => Some(EntitySection::Education),
            Section::Projects => Some(EntitySection::Projects),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personalInfo" => Ok(Section::PersonalInfo),
            "summary" => Ok(Section::Summary),
            "skills" => Ok(Section::Skills),
            "experience" => Ok(Section::Experience),
            "education" => Ok(Section::Education),
            "projects" => Ok(Section::Projects),
            other => Err(format!("unknown section '{other}'")),
        }
    }
}

/// Sections addressed without an entity id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ScalarSection {
    PersonalInfo,
    Summary,
    Skills,
}

/// Sections holding ordered sequences of id-carrying entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntitySection {
    Experience,
    Education,
    Projects,
}

impl From<ScalarSection> for Section {
    fn from(s: ScalarSection) -> Self {
        match s {
            ScalarSection::PersonalInfo => Section::PersonalInfo,
            ScalarSection::Summary => Section::Summary,
            ScalarSection::Skills => Section::Skills,
        }
    }
}

impl From<EntitySection> for Section {
    fn from(s: EntitySection) -> Self {
        match s {
            EntitySection::Experience => Section::Experience,
            EntitySection::Education => Section::Education,
            EntitySection::Projects => Section::Projects,
        }
    }
}

impl FromStr for EntitySection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<Section>()?
            .entity_section()
            .ok_or_else(|| format!("section '{s}' does not hold entities"))
    }
}

impl fmt::Display for EntitySection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Section::from(*self).fmt(f)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field values and entity access
// ────────────────────────────────────────────────────────────────────────────

/// A value written through a field address. Every field is text except the
/// entity `current` flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    Flag(bool),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::Flag(_) => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Flag(b)
    }
}

/// Uniform access to experience/education/project entries by field name.
pub trait Entity: Clone {
    /// Writable field names in form order.
    const FIELDS: &'static [&'static str];

    fn blank(id: String) -> Self;
    fn id(&self) -> &str;
    fn get(&self, field: &str) -> Option<FieldValue>;
    /// Returns false (leaving `self` untouched) for unknown fields or a value of
    /// the wrong kind.
    fn set(&mut self, field: &str, value: &FieldValue) -> bool;
    fn start_date(&self) -> &str;
    fn end_date(&self) -> &str;
    fn is_current(&self) -> bool;
}

fn set_text(slot: &mut String, value: &FieldValue) -> bool {
    match value {
        FieldValue::Text(s) => {
            slot.clone_from(s);
            true
        }
        FieldValue::Flag(_) => false,
    }
}

fn set_flag(slot: &mut bool, value: &FieldValue) -> bool {
    match value {
        FieldValue::Flag(b) => {
            *slot = *b;
            true
        }
        FieldValue::Text(_) => false,
    }
}

impl Entity for Experience {
    const FIELDS: &'static [&'static str] = &[
        "position",
        "company",
        "startDate",
        "endDate",
        "current",
        "description",
    ];

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "company" => self.company.as_str().into(),
            "position" => self.position.as_str().into(),
            "startDate" => self.start_date.as_str().into(),
            "endDate" => self.end_date.as_str().into(),
            "current" => self.current.into(),
            "description" => self.description.as_str().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "company" => set_text(&mut self.company, value),
            "position" => set_text(&mut self.position, value),
            "startDate" => set_text(&mut self.start_date, value),
            "endDate" => set_text(&mut self.end_date, value),
            "current" => set_flag(&mut self.current, value),
            "description" => set_text(&mut self.description, value),
            _ => false,
        }
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn end_date(&self) -> &str {
        &self.end_date
    }

    fn is_current(&self) -> bool {
        self.current
    }
}

impl Entity for Education {
    const FIELDS: &'static [&'static str] = &[
        "institution",
        "degree",
        "startDate",
        "endDate",
        "current",
        "description",
    ];

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "institution" => self.institution.as_str().into(),
            "degree" => self.degree.as_str().into(),
            "startDate" => self.start_date.as_str().into(),
            "endDate" => self.end_date.as_str().into(),
            "current" => self.current.into(),
            "description" => self.description.as_str().into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "institution" => set_text(&mut self.institution, value),
            "degree" => set_text(&mut self.degree, value),
            "startDate" => set_text(&mut self.start_date, value),
            "endDate" => set_text(&mut self.end_date, value),
            "current" => set_flag(&mut self.current, value),
            "description" => set_text(&mut self.description, value),
            _ => false,
        }
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn end_date(&self) -> &str {
        &self.end_date
    }

    fn is_current(&self) -> bool {
        self.current
    }
}

impl Entity for Project {
    const FIELDS: &'static [&'static str] = &[
        "name",
        "link",
        "startDate",
        "endDate",
        "current",
        "description",
    ];

    fn blank(id: String) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn get(&self, field: &str) -> Option<FieldValue> {
        Some(match field {
            "name" => self.name.as_str().into(),
            "description" => self.description.as_str().into(),
            "link" => self.link.as_str().into(),
            "startDate" => self.start_date.as_str().into(),
            "endDate" => self.end_date.as_str().into(),
            "current" => self.current.into(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: &FieldValue) -> bool {
        match field {
            "name" => set_text(&mut self.name, value),
            "description" => set_text(&mut self.description, value),
            "link" => set_text(&mut self.link, value),
            "startDate" => set_text(&mut self.start_date, value),
            "endDate" => set_text(&mut self.end_date, value),
            "current" => set_flag(&mut self.current, value),
            _ => false,
        }
    }

    fn start_date(&self) -> &str {
        &self.start_date
    }

    fn end_date(&self) -> &str {
        &self.end_date
    }

    fn is_current(&self) -> bool {
        self.current
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Language
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Vi,
}

impl Language {
    /// English name of the language, used inside assist prompts.
    pub fn name(&self) -> &'static str {
        match self {
            Language::En => "English",
            Language::Vi => "Vietnamese",
        }
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "vi" => Ok(Language::Vi),
            other => Err(format!("unsupported language '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cv_data_deserializes_browser_shape() {
        let json = r#"{
            "personalInfo": {"fullName": "Ada Lovelace", "email": "ada@example.com"},
            "summary": "Mathematician",
            "experience": [{
                "id": "e1", "company": "Analytical Engines", "position": "Engineer",
                "startDate": "1842-01", "endDate": "", "current": true, "description": "Notes"
            }],
            "skills": ["Maths"]
        }"#;
        let doc: CvData = serde_json::from_str(json).unwrap();

        assert_eq!(doc.personal_info.full_name, "Ada Lovelace");
        assert_eq!(doc.personal_info.phone, "");
        assert!(doc.personal_info.profile_picture.is_none());
        assert_eq!(doc.experience[0].start_date, "1842-01");
        assert!(doc.experience[0].current);
        assert!(doc.education.is_empty());
        assert!(doc.projects.is_empty());
    }

    #[test]
    fn test_empty_profile_picture_reads_as_none() {
        let json = r#"{"personalInfo": {"fullName": "", "profilePicture": ""}}"#;
        let doc: CvData = serde_json::from_str(json).unwrap();
        assert_eq!(doc, CvData::empty());
    }

    #[test]
    fn test_cv_data_serializes_camel_case() {
        let mut doc = CvData::empty();
        doc.personal_info.full_name = "Ada".to_string();
        let json = serde_json::to_value(&doc).unwrap();

        assert_eq!(json["personalInfo"]["fullName"], "Ada");
        assert!(json["personalInfo"].get("profilePicture").is_none());
        assert!(json.get("personal_info").is_none());
    }

    #[test]
    fn test_entity_set_rejects_wrong_kind() {
        let mut exp = Experience::blank("e1".to_string());
        assert!(!exp.set("current", &FieldValue::Text("yes".to_string())));
        assert!(!exp.set("company", &FieldValue::Flag(true)));
        assert!(!exp.set("id", &FieldValue::Text("other".to_string())));
        assert_eq!(exp, Experience::blank("e1".to_string()));
    }

    #[test]
    fn test_field_value_untagged_json() {
        let text: FieldValue = serde_json::from_str("\"Rust\"").unwrap();
        let flag: FieldValue = serde_json::from_str("true").unwrap();
        assert_eq!(text, FieldValue::Text("Rust".to_string()));
        assert_eq!(flag, FieldValue::Flag(true));
    }

    #[test]
    fn test_blank_summary_counts_as_empty() {
        let mut doc = CvData::empty();
        doc.summary = " \t\n".to_string();
        assert!(doc.is_section_empty(Section::Summary));
        assert!(!doc.is_section_empty(Section::PersonalInfo));

        doc.summary = "Hi".to_string();
        doc.skills.push("Rust".to_string());
        assert!(!doc.is_section_empty(Section::Summary));
        assert!(!doc.is_section_empty(Section::Skills));
        assert!(doc.is_section_empty(Section::Projects));
    }

    #[test]
    fn test_section_parsing() {
        assert_eq!("projects".parse::<Section>().unwrap(), Section::Projects);
        assert_eq!(
            "education".parse::<EntitySection>().unwrap(),
            EntitySection::Education
        );
        assert!("summary".parse::<EntitySection>().is_err());
        assert!("hobbies".parse::<Section>().is_err());
    }

    #[test]
    fn test_language_parsing() {
        assert_eq!("VI".parse::<Language>().unwrap(), Language::Vi);
        assert_eq!(Language::default(), Language::En);
        assert!("fr".parse::<Language>().is_err());
    }
}
