//! Display formatting shared by the preview templates.

use chrono::NaiveDate;

use crate::models::personalization::TemplateId;

/// Formats an entry date for display.
///
/// - empty start date → empty; empty or `present` end date → "Present"
/// - `YYYY` → unchanged
/// - `YYYY-MM` → "Month YYYY"
/// - anything else → unchanged
pub fn format_date(date: &str, is_end_date: bool) -> String {
    let date = date.trim();
    if date.is_empty() || (is_end_date && date.eq_ignore_ascii_case("present")) {
        return if is_end_date {
            "Present".to_string()
        } else {
            String::new()
        };
    }

    if date.len() == 4 && date.chars().all(|c| c.is_ascii_digit()) {
        return date.to_string();
    }

    if let Some((year, month)) = date.split_once('-') {
        let parsed = year
            .parse::<i32>()
            .ok()
            .zip(month.parse::<u32>().ok())
            .and_then(|(y, m)| NaiveDate::from_ymd_opt(y, m, 1));
        if let Some(first_of_month) = parsed {
            return first_of_month.format("%B %Y").to_string();
        }
    }

    date.to_string()
}

/// "start - end" range, or `None` when neither end is set.
pub fn format_date_range(start: &str, end: &str) -> Option<String> {
    if start.trim().is_empty() && end.trim().is_empty() {
        return None;
    }
    Some(format!(
        "{} - {}",
        format_date(start, false),
        format_date(end, true)
    ))
}

/// Shortens a LinkedIn profile URL to "LinkedIn: handle".
pub fn linkedin_label(url: &str) -> String {
    url.replace("https://www.", "")
        .replace("linkedin.com/in/", "LinkedIn: ")
}

/// Shortens a GitHub profile URL to "GitHub: handle".
pub fn github_label(url: &str) -> String {
    url.replace("https://www.", "")
        .replace("https://", "")
        .replace("github.com/", "GitHub: ")
}

/// Prefixes scheme-less links with `https://`.
pub fn normalize_link(link: &str) -> String {
    if link.starts_with("http") {
        link.to_string()
    } else {
        format!("https://{link}")
    }
}

/// Download name derived from the contact name, e.g. `Alex_Johnson_classic.pdf`.
pub fn suggested_file_name(contact_name: &str, template: TemplateId) -> String {
    let stem = contact_name.split_whitespace().collect::<Vec<_>>().join("_");
    let stem = if stem.is_empty() { "resume" } else { &stem };
    format!("{stem}_{}.pdf", template.id())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_date_variants() {
        assert_eq!(format_date("2023", false), "2023");
        assert_eq!(format_date("2023-03", false), "March 2023");
        assert_eq!(format_date("", false), "");
        assert_eq!(format_date("", true), "Present");
        assert_eq!(format_date("present", true), "Present");
        assert_eq!(format_date("Présent", true), "Présent");
        assert_eq!(format_date("2023-13", false), "2023-13");
        assert_eq!(format_date("Spring 2020", false), "Spring 2020");
    }

    #[test]
    fn test_date_range_requires_one_side() {
        assert_eq!(format_date_range("", ""), None);
        assert_eq!(
            format_date_range("2021-01", ""),
            Some("January 2021 - Present".to_string())
        );
    }

    #[test]
    fn test_profile_labels() {
        assert_eq!(
            linkedin_label("https://www.linkedin.com/in/alexj/"),
            "LinkedIn: alexj/"
        );
        assert_eq!(github_label("https://github.com/alexj"), "GitHub: alexj");
    }

    #[test]
    fn test_normalize_link() {
        assert_eq!(normalize_link("example.com"), "https://example.com");
        assert_eq!(normalize_link("http://example.com"), "http://example.com");
    }

    #[test]
    fn test_suggested_file_name() {
        assert_eq!(
            suggested_file_name("Alex  Johnson", TemplateId::Classic),
            "Alex_Johnson_classic.pdf"
        );
        assert_eq!(
            suggested_file_name("   ", TemplateId::Classic),
            "resume_classic.pdf"
        );
    }
}
