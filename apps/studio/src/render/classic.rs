//! "Classic Professional" layout: coloured sidebar with identity and contact
//! details, content column with the resume sections.

use crate::layout::{Edges, Length};
use crate::models::personalization::PersonalizationConfig;
use crate::models::resume::{ListEntry, ResumeDocument};
use crate::render::format::{
    format_date, format_date_range, github_label, linkedin_label, normalize_link,
};
use crate::surface::image::ImageLoader;
use crate::surface::node::{ImageBox, Node, TextStyle};

const SIDEBAR_TEXT: &str = "#FFFFFF";
const FOREGROUND: &str = "#1F2937";
const MUTED: &str = "#6B7280";
const CARD: &str = "#FFFFFF";

const NAME_PLACEHOLDER: &str = "Your Name";
const AVATAR_PX: f32 = 128.0;

pub fn render(doc: &ResumeDocument, style: &PersonalizationConfig, images: &ImageLoader) -> Node {
    Node::row(vec![sidebar(doc, style, images), content(doc, style)]).background(CARD)
}

// ────────────────────────────────────────────────────────────────────────────
// Sidebar
// ────────────────────────────────────────────────────────────────────────────

fn sidebar(doc: &ResumeDocument, style: &PersonalizationConfig, images: &ImageLoader) -> Node {
    let contact = &doc.contact_info;
    let mut children = Vec::new();

    if let Some(photo) = &doc.photo {
        children.push(
            Node::image(ImageBox {
                image: images.load(photo.as_str()),
                width: AVATAR_PX,
                height: AVATAR_PX,
                round: true,
                ring: Some((2.0, style.accent_color.clone())),
            })
            .centered()
            .gap_after(16.0),
        );
    }

    let name = if contact.name.trim().is_empty() {
        NAME_PLACEHOLDER
    } else {
        contact.name.as_str()
    };
    children.push(
        Node::text(name, TextStyle::new(24.0, SIDEBAR_TEXT).bold())
            .centered()
            .gap_after(4.0),
    );
    if !contact.title.is_empty() {
        children.push(
            Node::text(&contact.title, TextStyle::new(14.0, SIDEBAR_TEXT))
                .centered()
                .gap_after(16.0),
        );
    }

    let contact_lines: Vec<String> = [
        contact.address.clone(),
        contact.phone.clone(),
        contact.email.clone(),
        non_empty(&contact.linkedin).map(linkedin_label).unwrap_or_default(),
        non_empty(&contact.github).map(github_label).unwrap_or_default(),
        non_empty(&contact.portfolio)
            .map(|_| "Portfolio".to_string())
            .unwrap_or_default(),
    ]
    .into_iter()
    .filter(|line| !line.is_empty())
    .collect();

    if !contact_lines.is_empty() {
        children.push(Node::block(
            contact_lines
                .into_iter()
                .map(|line| Node::text(line, TextStyle::new(14.0, SIDEBAR_TEXT)).gap_after(8.0))
                .collect(),
        ));
    }

    Node::block(children)
        .width(Length::Percent(35.0))
        .padding(Edges::all(24.0))
        .background(&style.primary_color)
}

// ────────────────────────────────────────────────────────────────────────────
// Content column
// ────────────────────────────────────────────────────────────────────────────

fn content(doc: &ResumeDocument, style: &PersonalizationConfig) -> Node {
    let primary = style.primary_color.as_str();
    let accent = style.accent_color.as_str();
    let mut sections = Vec::new();

    if !doc.professional_summary.is_empty() {
        sections.push(section(
            "Professional Summary",
            primary,
            vec![Node::text(&doc.professional_summary, body())],
        ));
    }

    if !doc.skills.is_empty() {
        let items = doc
            .skills
            .iter()
            .map(|skill| bullet(skill, primary))
            .collect();
        sections.push(section("Technical Skills", primary, items));
    }

    let experience: Vec<Node> = doc
        .experience
        .iter()
        .filter(|e| e.has_content())
        .map(|exp| {
            let heading = match (exp.role.is_empty(), exp.company.is_empty()) {
                (false, false) => format!("{} – {}", exp.role, exp.company),
                (false, true) => exp.role.clone(),
                _ => exp.company.clone(),
            };
            let mut parts = vec![Node::text(heading, heading_style())];
            if let Some(range) = format_date_range(&exp.start_date, &exp.end_date) {
                let meta = if exp.location.is_empty() {
                    range
                } else {
                    format!("{range} | {}", exp.location)
                };
                parts.push(Node::text(meta, small()).gap_after(4.0));
            }
            if !exp.description.is_empty() {
                parts.push(Node::text(&exp.description, body()));
            }
            Node::block(parts)
        })
        .collect();
    if !experience.is_empty() {
        sections.push(section("Experience", primary, experience));
    }

    let projects: Vec<Node> = doc
        .projects
        .iter()
        .filter(|p| p.has_content())
        .map(|proj| {
            let mut parts = vec![Node::text(&proj.name, heading_style())];
            if !proj.link.is_empty() {
                parts.push(Node::text(
                    normalize_link(&proj.link),
                    TextStyle::new(12.0, accent),
                ));
            }
            if !proj.technologies.is_empty() {
                parts.push(Node::text(
                    format!("Technologies: {}", proj.technologies),
                    small(),
                ));
            }
            if !proj.description.is_empty() {
                parts.push(Node::text(&proj.description, body()));
            }
            Node::block(parts)
        })
        .collect();
    if !projects.is_empty() {
        sections.push(section("Projects", primary, projects));
    }

    let education: Vec<Node> = doc
        .education
        .iter()
        .filter(|e| e.has_content())
        .map(|edu| {
            let heading = if edu.field_of_study.is_empty() {
                edu.degree.clone()
            } else {
                format!("{} in {}", edu.degree, edu.field_of_study)
            };
            let mut parts = vec![Node::text(heading, heading_style())];
            if !edu.institution.is_empty() {
                parts.push(Node::text(
                    &edu.institution,
                    TextStyle::new(14.0, accent).bold(),
                ));
            }
            if let Some(range) = format_date_range(&edu.start_date, &edu.end_date) {
                let meta = if edu.gpa.is_empty() {
                    range
                } else {
                    format!("{range} | GPA: {}", edu.gpa)
                };
                parts.push(Node::text(meta, small()).gap_after(4.0));
            }
            if !edu.description.is_empty() {
                parts.push(Node::text(&edu.description, body()));
            }
            Node::block(parts)
        })
        .collect();
    if !education.is_empty() {
        sections.push(section("Education", primary, education));
    }

    let certifications: Vec<Node> = doc
        .certifications
        .iter()
        .filter(|c| c.has_content())
        .map(|cert| {
            let mut parts = vec![Node::text(&cert.name, heading_style())];
            let issued = if cert.date_issued.is_empty() {
                cert.issuing_organization.clone()
            } else {
                format!(
                    "{} | {}",
                    cert.issuing_organization,
                    format_date(&cert.date_issued, false)
                )
            };
            if !issued.is_empty() {
                parts.push(Node::text(issued, TextStyle::new(14.0, MUTED)));
            }
            if !cert.credential_id.is_empty() {
                parts.push(Node::text(
                    format!("Credential ID: {}", cert.credential_id),
                    small(),
                ));
            }
            Node::block(parts)
        })
        .collect();
    if !certifications.is_empty() {
        sections.push(section("Certifications", primary, certifications));
    }

    let languages: Vec<Node> = doc
        .languages
        .iter()
        .filter(|l| l.has_content())
        .map(|lang| {
            bullet(
                &format!("{}: {}", lang.language, lang.proficiency.label()),
                primary,
            )
        })
        .collect();
    if !languages.is_empty() {
        sections.push(section("Languages", primary, languages));
    }

    Node::block(sections).padding(Edges::all(32.0))
}

fn section(title: &str, color: &str, entries: Vec<Node>) -> Node {
    let mut children = Vec::with_capacity(entries.len() + 1);
    children.push(
        Node::text(title.to_uppercase(), TextStyle::new(20.0, color).bold())
            .padding(Edges {
                top: 24.0,
                bottom: 4.0,
                ..Edges::ZERO
            })
            .border_bottom(2.0, color)
            .gap_after(12.0),
    );
    children.extend(entries.into_iter().map(|entry| {
        if entry.style.gap_after > 0.0 {
            entry
        } else {
            entry.gap_after(16.0)
        }
    }));
    Node::block(children)
}

fn bullet(text: &str, color: &str) -> Node {
    Node::row(vec![
        Node::text("•", TextStyle::new(14.0, color)).width(Length::Px(18.0)),
        Node::text(text, body()),
    ])
    .gap_after(4.0)
}

fn non_empty(value: &str) -> Option<&str> {
    Some(value).filter(|v| !v.is_empty())
}

fn heading_style() -> TextStyle {
    TextStyle::new(16.0, FOREGROUND).bold()
}

fn body() -> TextStyle {
    TextStyle::new(14.0, FOREGROUND)
}

fn small() -> TextStyle {
    TextStyle::new(12.0, MUTED)
}
