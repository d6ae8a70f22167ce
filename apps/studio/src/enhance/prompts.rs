use crate::llm_client::prompts::{JSON_ONLY_SYSTEM, NO_FABRICATION_INSTRUCTION};

pub fn enhance_system_prompt() -> String {
    format!(
        "{JSON_ONLY_SYSTEM}\n\n\
         You are an expert resume writer. You rewrite one section of a resume so it \
         reads clearly, uses strong action verbs and stays concise.\n\n\
         {NO_FABRICATION_INSTRUCTION}"
    )
}

pub fn build_enhance_prompt(section_text: &str, section_label: &str) -> String {
    format!(
        "Rewrite the following resume section.\n\n\
         Section type: {section_label}\n\n\
         Section text:\n\"\"\"\n{section_text}\n\"\"\"\n\n\
         Keep the original language and roughly the original length. \
         Preserve line breaks used as bullet separators.\n\n\
         Return JSON of exactly this shape:\n\
         {{\"optimizedContent\": \"<rewritten section text>\"}}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_carries_label_and_text() {
        let prompt = build_enhance_prompt("Built APIs.", "Experience Description");
        assert!(prompt.contains("Section type: Experience Description"));
        assert!(prompt.contains("Built APIs."));
        assert!(prompt.contains("\"optimizedContent\""));
    }
}
