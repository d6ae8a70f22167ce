//! The editing workspace: the resume document plus the preview choices.
//!
//! All mutations go through `Workspace`. The service holds exactly one behind a
//! lock and re-renders the preview after every change.

pub mod handlers;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::models::personalization::{PersonalizationConfig, TemplateId};
use crate::models::resume::{
    CertificationEntry, ContactInfo, EducationEntry, EntryId, ExperienceEntry, LanguageEntry,
    ListEntry, PhotoRef, ProjectEntry, ResumeDocument, Section,
};
use crate::surface::image::encode_data_url;

/// Largest accepted photo upload.
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("no {section} entry with id '{id}'")]
    EntryNotFound { section: Section, id: EntryId },

    #[error("skill index {index} is out of range (have {len})")]
    SkillIndexOutOfRange { index: usize, len: usize },

    #[error("skill cannot be empty")]
    EmptySkill,

    #[error("invalid {section} entry: {message}")]
    InvalidEntry { section: Section, message: String },

    #[error("photo is {size} bytes; the limit is {limit}")]
    PhotoTooLarge { size: usize, limit: usize },

    #[error("photo must be PNG, JPEG, GIF or WebP")]
    UnsupportedPhotoType,

    #[error("photo upload is empty")]
    EmptyPhoto,
}

// ────────────────────────────────────────────────────────────────────────────
// Section entries
// ────────────────────────────────────────────────────────────────────────────

/// An entry of any repeated section, as exchanged with the editor API.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SectionEntry {
    Experience(ExperienceEntry),
    Education(EducationEntry),
    Project(ProjectEntry),
    Certification(CertificationEntry),
    Language(LanguageEntry),
}

impl SectionEntry {
    /// Parses a JSON entry for `section`. A missing `id` gets a fresh one.
    pub fn from_json(section: Section, value: Value) -> Result<Self, EditorError> {
        let invalid = |e: serde_json::Error| EditorError::InvalidEntry {
            section,
            message: e.to_string(),
        };
        Ok(match section {
            Section::Experience => Self::Experience(serde_json::from_value(value).map_err(invalid)?),
            Section::Education => Self::Education(serde_json::from_value(value).map_err(invalid)?),
            Section::Projects => Self::Project(serde_json::from_value(value).map_err(invalid)?),
            Section::Certifications => {
                Self::Certification(serde_json::from_value(value).map_err(invalid)?)
            }
            Section::Languages => Self::Language(serde_json::from_value(value).map_err(invalid)?),
        })
    }

    pub fn section(&self) -> Section {
        match self {
            Self::Experience(_) => Section::Experience,
            Self::Education(_) => Section::Education,
            Self::Project(_) => Section::Projects,
            Self::Certification(_) => Section::Certifications,
            Self::Language(_) => Section::Languages,
        }
    }

    pub fn id(&self) -> &EntryId {
        match self {
            Self::Experience(e) => e.id(),
            Self::Education(e) => e.id(),
            Self::Project(e) => e.id(),
            Self::Certification(e) => e.id(),
            Self::Language(e) => e.id(),
        }
    }
}

fn push_fresh<T: ListEntry + Clone>(list: &mut Vec<T>, mut entry: T) -> T {
    entry.set_id(EntryId::generate());
    list.push(entry.clone());
    entry
}

fn replace_by_id<T: ListEntry + Clone>(list: &mut [T], id: &EntryId, mut entry: T) -> Option<T> {
    let slot = list.iter_mut().find(|e| e.id() == id)?;
    entry.set_id(id.clone());
    *slot = entry.clone();
    Some(entry)
}

fn remove_by_id<T: ListEntry>(list: &mut Vec<T>, id: &EntryId) -> bool {
    let before = list.len();
    list.retain(|e| e.id() != id);
    list.len() != before
}

/// Gives every entry whose id was already seen in its list a fresh one.
fn dedupe_ids<T: ListEntry>(list: &mut [T]) {
    let mut seen = HashSet::new();
    for entry in list.iter_mut() {
        if !seen.insert(entry.id().clone()) {
            let fresh = EntryId::generate();
            seen.insert(fresh.clone());
            entry.set_id(fresh);
        }
    }
}

/// Splits comma-separated skills, trimming and dropping blanks.
pub fn parse_skill_list(input: &str) -> Vec<String> {
    clean_skills(input.split(','))
}

fn clean_skills<'a>(skills: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    skills
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ────────────────────────────────────────────────────────────────────────────
// Photo upload
// ────────────────────────────────────────────────────────────────────────────

/// Validates an uploaded photo and turns it into an inline `data:` reference.
///
/// The format is sniffed from the bytes; the declared content type is only
/// used to reject obviously wrong uploads early.
pub fn photo_from_upload(
    declared_type: Option<&str>,
    bytes: &[u8],
) -> Result<PhotoRef, EditorError> {
    if bytes.is_empty() {
        return Err(EditorError::EmptyPhoto);
    }
    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(EditorError::PhotoTooLarge {
            size: bytes.len(),
            limit: MAX_PHOTO_BYTES,
        });
    }
    if let Some(declared) = declared_type {
        if !declared.starts_with("image/") && declared != "application/octet-stream" {
            return Err(EditorError::UnsupportedPhotoType);
        }
    }

    let mime = match image::guess_format(bytes) {
        Ok(image::ImageFormat::Png) => "image/png",
        Ok(image::ImageFormat::Jpeg) => "image/jpeg",
        Ok(image::ImageFormat::Gif) => "image/gif",
        Ok(image::ImageFormat::WebP) => "image/webp",
        _ => return Err(EditorError::UnsupportedPhotoType),
    };
    Ok(PhotoRef::new(encode_data_url(mime, bytes)))
}

// ────────────────────────────────────────────────────────────────────────────
// Workspace
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Workspace {
    document: ResumeDocument,
    personalization: PersonalizationConfig,
    template: TemplateId,
}

impl Workspace {
    #[cfg(test)]
    pub fn new(document: ResumeDocument) -> Self {
        let mut workspace = Self::default();
        workspace.replace_document(document);
        workspace
    }

    pub fn document(&self) -> &ResumeDocument {
        &self.document
    }

    pub fn personalization(&self) -> &PersonalizationConfig {
        &self.personalization
    }

    pub fn template(&self) -> TemplateId {
        self.template
    }

    /// Replaces the whole document. Duplicate entry ids within a section are
    /// reassigned so every entry stays addressable.
    pub fn replace_document(&mut self, mut document: ResumeDocument) {
        dedupe_ids(&mut document.experience);
        dedupe_ids(&mut document.education);
        dedupe_ids(&mut document.projects);
        dedupe_ids(&mut document.certifications);
        dedupe_ids(&mut document.languages);
        document.skills = clean_skills(document.skills.iter().map(String::as_str));
        self.document = document;
    }

    pub fn set_contact(&mut self, contact: ContactInfo) {
        self.document.contact_info = contact;
    }

    pub fn set_summary(&mut self, summary: String) {
        self.document.professional_summary = summary;
    }

    pub fn set_skills(&mut self, skills: Vec<String>) {
        self.document.skills = clean_skills(skills.iter().map(String::as_str));
    }

    pub fn add_skill(&mut self, skill: &str) -> Result<(), EditorError> {
        let skill = skill.trim();
        if skill.is_empty() {
            return Err(EditorError::EmptySkill);
        }
        self.document.skills.push(skill.to_string());
        Ok(())
    }

    pub fn remove_skill(&mut self, index: usize) -> Result<String, EditorError> {
        let len = self.document.skills.len();
        if index >= len {
            return Err(EditorError::SkillIndexOutOfRange { index, len });
        }
        Ok(self.document.skills.remove(index))
    }

    /// Appends `entry` to its section under a freshly generated id.
    pub fn add_entry(&mut self, entry: SectionEntry) -> SectionEntry {
        let doc = &mut self.document;
        match entry {
            SectionEntry::Experience(e) => SectionEntry::Experience(push_fresh(&mut doc.experience, e)),
            SectionEntry::Education(e) => SectionEntry::Education(push_fresh(&mut doc.education, e)),
            SectionEntry::Project(e) => SectionEntry::Project(push_fresh(&mut doc.projects, e)),
            SectionEntry::Certification(e) => {
                SectionEntry::Certification(push_fresh(&mut doc.certifications, e))
            }
            SectionEntry::Language(e) => SectionEntry::Language(push_fresh(&mut doc.languages, e)),
        }
    }

    /// Replaces the entry `id` in place, keeping its id and position.
    pub fn update_entry(&mut self, id: &EntryId, entry: SectionEntry) -> Result<SectionEntry, EditorError> {
        let section = entry.section();
        let doc = &mut self.document;
        let updated = match entry {
            SectionEntry::Experience(e) => {
                replace_by_id(&mut doc.experience, id, e).map(SectionEntry::Experience)
            }
            SectionEntry::Education(e) => {
                replace_by_id(&mut doc.education, id, e).map(SectionEntry::Education)
            }
            SectionEntry::Project(e) => {
                replace_by_id(&mut doc.projects, id, e).map(SectionEntry::Project)
            }
            SectionEntry::Certification(e) => {
                replace_by_id(&mut doc.certifications, id, e).map(SectionEntry::Certification)
            }
            SectionEntry::Language(e) => {
                replace_by_id(&mut doc.languages, id, e).map(SectionEntry::Language)
            }
        };
        updated.ok_or_else(|| EditorError::EntryNotFound {
            section,
            id: id.clone(),
        })
    }

    pub fn remove_entry(&mut self, section: Section, id: &EntryId) -> Result<(), EditorError> {
        let doc = &mut self.document;
        let removed = match section {
            Section::Experience => remove_by_id(&mut doc.experience, id),
            Section::Education => remove_by_id(&mut doc.education, id),
            Section::Projects => remove_by_id(&mut doc.projects, id),
            Section::Certifications => remove_by_id(&mut doc.certifications, id),
            Section::Languages => remove_by_id(&mut doc.languages, id),
        };
        if removed {
            Ok(())
        } else {
            Err(EditorError::EntryNotFound {
                section,
                id: id.clone(),
            })
        }
    }

    pub fn set_photo(&mut self, photo: PhotoRef) {
        self.document.photo = Some(photo);
    }

    pub fn clear_photo(&mut self) {
        self.document.photo = None;
    }

    /// Colours are stored verbatim; the font name is resolved at render time.
    pub fn set_personalization(&mut self, personalization: PersonalizationConfig) {
        self.personalization = personalization;
    }

    pub fn select_template(&mut self, template: TemplateId) {
        self.template = template;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Cursor;

    fn experience(company: &str) -> SectionEntry {
        SectionEntry::Experience(ExperienceEntry {
            company: company.to_string(),
            role: "Engineer".to_string(),
            ..Default::default()
        })
    }

    #[test]
    fn test_add_entry_assigns_fresh_id_and_keeps_order() {
        let mut ws = Workspace::default();
        let a = ws.add_entry(experience("Acme"));
        let b = ws.add_entry(experience("Globex"));
        assert_ne!(a.id(), b.id());
        let companies: Vec<_> = ws
            .document()
            .experience
            .iter()
            .map(|e| e.company.as_str())
            .collect();
        assert_eq!(companies, ["Acme", "Globex"]);
    }

    #[test]
    fn test_add_entry_ignores_client_supplied_id() {
        let mut ws = Workspace::default();
        let entry = SectionEntry::from_json(
            Section::Languages,
            json!({"id": "mine", "language": "German", "proficiency": "Native"}),
        )
        .unwrap();
        let added = ws.add_entry(entry);
        assert_ne!(added.id().as_str(), "mine");
    }

    #[test]
    fn test_update_preserves_id_and_position() {
        let mut ws = Workspace::default();
        ws.add_entry(experience("Acme"));
        let target = ws.add_entry(experience("Globex")).id().clone();
        ws.add_entry(experience("Initech"));

        let updated = ws.update_entry(&target, experience("Umbrella")).unwrap();
        assert_eq!(updated.id(), &target);
        assert_eq!(ws.document().experience[1].company, "Umbrella");
        assert_eq!(ws.document().experience[1].id, target);
    }

    #[test]
    fn test_update_and_remove_unknown_id_fail() {
        let mut ws = Workspace::default();
        let missing = EntryId::from("nope");
        assert!(matches!(
            ws.update_entry(&missing, experience("Acme")),
            Err(EditorError::EntryNotFound { .. })
        ));
        assert!(matches!(
            ws.remove_entry(Section::Projects, &missing),
            Err(EditorError::EntryNotFound { .. })
        ));
    }

    #[test]
    fn test_remove_entry_only_touches_its_section() {
        let mut ws = Workspace::default();
        let id = ws.add_entry(experience("Acme")).id().clone();
        assert!(ws.remove_entry(Section::Education, &id).is_err());
        ws.remove_entry(Section::Experience, &id).unwrap();
        assert!(ws.document().experience.is_empty());
    }

    #[test]
    fn test_invalid_entry_json_is_rejected() {
        let result = SectionEntry::from_json(Section::Languages, json!({"proficiency": "Expert"}));
        assert!(matches!(result, Err(EditorError::InvalidEntry { .. })));
    }

    #[test]
    fn test_skills_are_trimmed_and_blank_ones_dropped() {
        assert_eq!(parse_skill_list(" Rust, ,Go ,"), vec!["Rust", "Go"]);

        let mut ws = Workspace::default();
        ws.set_skills(vec!["  SQL ".to_string(), String::new()]);
        assert_eq!(ws.document().skills, vec!["SQL"]);
        assert!(matches!(ws.add_skill("   "), Err(EditorError::EmptySkill)));
        ws.add_skill("Kafka").unwrap();
        assert_eq!(ws.remove_skill(0).unwrap(), "SQL");
        assert!(matches!(
            ws.remove_skill(5),
            Err(EditorError::SkillIndexOutOfRange { index: 5, len: 1 })
        ));
    }

    #[test]
    fn test_replace_document_reassigns_duplicate_ids() {
        let mut doc = ResumeDocument::default();
        let shared = EntryId::from("dup");
        for name in ["A", "B"] {
            doc.projects.push(ProjectEntry {
                id: shared.clone(),
                name: name.to_string(),
                ..Default::default()
            });
        }
        let ws = Workspace::new(doc);
        let ids: HashSet<_> = ws.document().projects.iter().map(|p| p.id.clone()).collect();
        assert_eq!(ids.len(), 2);
        assert_eq!(ws.document().projects[0].id, shared);
    }

    #[test]
    fn test_photo_upload_is_sniffed_and_inlined() {
        let mut png = Cursor::new(Vec::new());
        image::RgbaImage::new(1, 1)
            .write_to(&mut png, image::ImageFormat::Png)
            .unwrap();
        let photo = photo_from_upload(Some("image/png"), png.get_ref()).unwrap();
        assert!(photo.as_str().starts_with("data:image/png;base64,"));

        assert!(matches!(
            photo_from_upload(None, b"not an image"),
            Err(EditorError::UnsupportedPhotoType)
        ));
        assert!(matches!(
            photo_from_upload(Some("text/plain"), png.get_ref()),
            Err(EditorError::UnsupportedPhotoType)
        ));
        assert!(matches!(photo_from_upload(None, b""), Err(EditorError::EmptyPhoto)));
    }

    #[test]
    fn test_oversized_photo_is_rejected() {
        let bytes = vec![0u8; MAX_PHOTO_BYTES + 1];
        assert!(matches!(
            photo_from_upload(Some("image/png"), &bytes),
            Err(EditorError::PhotoTooLarge { .. })
        ));
    }
}
