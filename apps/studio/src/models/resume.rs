//! The resume document owned by the editor and read by the renderer.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ────────────────────────────────────────────────────────────────────────────
// Entry identifiers
// ────────────────────────────────────────────────────────────────────────────

/// Opaque token addressing one entry inside a repeated section.
///
/// Generated when an entry is added and kept for the entry's lifetime. It carries
/// no meaning beyond list addressing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntryId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Photo reference: either a `data:` URL holding the uploaded bytes or a remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(source: impl Into<String>) -> Self {
        Self(source.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Document
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContactInfo {
    pub name: String,
    /// Job title or tagline shown under the name.
    pub title: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub linkedin: String,
    pub github: String,
    pub portfolio: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub id: EntryId,
    pub company: String,
    pub role: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub location: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub id: EntryId,
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub gpa: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProjectEntry {
    pub id: EntryId,
    pub name: String,
    pub description: String,
    /// Comma-separated list, rendered verbatim.
    pub technologies: String,
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CertificationEntry {
    pub id: EntryId,
    pub name: String,
    pub issuing_organization: String,
    pub date_issued: String,
    pub credential_id: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Proficiency {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Fluent,
    Native,
    Courant,
    Professionnel,
}

impl Proficiency {
    pub fn label(&self) -> &'static str {
        match self {
            Proficiency::Beginner => "Beginner",
            Proficiency::Intermediate => "Intermediate",
            Proficiency::Advanced => "Advanced",
            Proficiency::Fluent => "Fluent",
            Proficiency::Native => "Native",
            Proficiency::Courant => "Courant",
            Proficiency::Professionnel => "Professionnel",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LanguageEntry {
    pub id: EntryId,
    pub language: String,
    pub proficiency: Proficiency,
}

/// The whole resume. Lists are independent and their order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResumeDocument {
    #[serde(rename = "photoUrl", skip_serializing_if = "Option::is_none")]
    pub photo: Option<PhotoRef>,
    pub contact_info: ContactInfo,
    pub professional_summary: String,
    pub skills: Vec<String>,
    pub experience: Vec<ExperienceEntry>,
    pub education: Vec<EducationEntry>,
    pub projects: Vec<ProjectEntry>,
    pub certifications: Vec<CertificationEntry>,
    pub languages: Vec<LanguageEntry>,
}

// Entries default to a fresh id so payloads from the editor may omit it.
macro_rules! default_with_fresh_id {
    ($($ty:ident { $($field:ident),* $(,)? }),* $(,)?) => {
        $(
            impl Default for $ty {
                fn default() -> Self {
                    Self {
                        id: EntryId::generate(),
                        $($field: Default::default(),)*
                    }
                }
            }
        )*
    };
}

default_with_fresh_id! {
    ExperienceEntry { company, role, start_date, end_date, description, location },
    EducationEntry { institution, degree, field_of_study, start_date, end_date, gpa, description },
    ProjectEntry { name, description, technologies, link },
    CertificationEntry { name, issuing_organization, date_issued, credential_id },
    LanguageEntry { language, proficiency },
}

// ────────────────────────────────────────────────────────────────────────────
// Repeated sections
// ────────────────────────────────────────────────────────────────────────────

/// An entry in one of the repeated sections.
pub trait ListEntry {
    fn id(&self) -> &EntryId;
    fn set_id(&mut self, id: EntryId);
    /// Whether the entry has the fields the preview needs to show it at all.
    fn has_content(&self) -> bool;
}

impl ListEntry for ExperienceEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn has_content(&self) -> bool {
        !self.role.is_empty() || !self.company.is_empty()
    }
}

impl ListEntry for EducationEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn has_content(&self) -> bool {
        !self.institution.is_empty() || !self.degree.is_empty()
    }
}

impl ListEntry for ProjectEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn has_content(&self) -> bool {
        !self.name.is_empty()
    }
}

impl ListEntry for CertificationEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn has_content(&self) -> bool {
        !self.name.is_empty()
    }
}

impl ListEntry for LanguageEntry {
    fn id(&self) -> &EntryId {
        &self.id
    }
    fn set_id(&mut self, id: EntryId) {
        self.id = id;
    }
    fn has_content(&self) -> bool {
        !self.language.is_empty()
    }
}

/// The repeated sections addressable by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Experience,
    Education,
    Projects,
    Certifications,
    Languages,
}

impl Section {
    pub fn as_str(&self) -> &'static str {
        match self {
            Section::Experience => "experience",
            Section::Education => "education",
            Section::Projects => "projects",
            Section::Certifications => "certifications",
            Section::Languages => "languages",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "experience" => Some(Section::Experience),
            "education" => Some(Section::Education),
            "projects" => Some(Section::Projects),
            "certifications" => Some(Section::Certifications),
            "languages" => Some(Section::Languages),
            _ => None,
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique() {
        assert_ne!(EntryId::generate(), EntryId::generate());
    }

    #[test]
    fn test_document_uses_camel_case_json() {
        let mut doc = ResumeDocument::default();
        doc.contact_info.name = "Alex Johnson".to_string();
        doc.photo = Some(PhotoRef::new("https://example.com/me.png"));

        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["contactInfo"]["name"], "Alex Johnson");
        assert_eq!(json["photoUrl"], "https://example.com/me.png");
        assert!(json.get("professionalSummary").is_some());
    }

    #[test]
    fn test_entry_without_id_gets_one() {
        let entry: ExperienceEntry =
            serde_json::from_value(serde_json::json!({ "company": "Acme" })).unwrap();
        assert!(!entry.id.as_str().is_empty());
        assert_eq!(entry.company, "Acme");
    }

    #[test]
    fn test_has_content_rules() {
        let mut exp = ExperienceEntry::default();
        assert!(!exp.has_content());
        exp.company = "Acme".to_string();
        assert!(exp.has_content());

        let mut edu = EducationEntry::default();
        assert!(!edu.has_content());
        edu.degree = "BSc".to_string();
        assert!(edu.has_content());
    }

    #[test]
    fn test_section_parse_round_trips_path_segment() {
        for section in [
            Section::Experience,
            Section::Education,
            Section::Projects,
            Section::Certifications,
            Section::Languages,
        ] {
            assert_eq!(Section::parse(section.as_str()), Some(section));
        }
        assert_eq!(Section::parse("hobbies"), None);
    }
}
