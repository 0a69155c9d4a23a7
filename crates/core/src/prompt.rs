//! Lesson-note prompt assembly.

use crate::{format::format_timestamp, types::OutputFormat};

/// Render the instruction prompt for the text-generation call. Pure: the same
/// inputs always produce the same string.
pub fn build_prompt(
    title: Option<&str>,
    duration_ms: u64,
    transcript_text: &str,
    extra_context: &str,
    output_format: OutputFormat,
) -> String {
    let duration_text = if duration_ms > 0 {
        format_timestamp(duration_ms)
    } else {
        "unknown".to_string()
    };

    let format_hint = match output_format {
        OutputFormat::Html => {
            "Output valid HTML only. Use a single <article> element with <h2> section headings."
        }
        OutputFormat::Md => "Output in Markdown.",
    };

    let extra_block = if extra_context.is_empty() {
        String::new()
    } else {
        format!("\n\nAdditional context (files or notes):\n{extra_context}")
    };

    let title_line = format!("Title: {}", title.unwrap_or("(unknown)"));
    let duration_line = format!("Approx duration: {duration_text}");

    [
        "You are turning a class recording transcript into student-ready lesson notes.",
        "The student is a beginner and does NOT know the concepts yet.",
        "Use the same language as the transcript.",
        "Use the Additional context files as authoritative when they clarify terms, code, or project setup.",
        "Correct obvious ASR errors when the intended term is unambiguous from context",
        "(e.g., 'Bit' -> 'Vite', library names, commands). If unsure, keep the original.",
        "Avoid filler and repetition. Do not invent details.",
        format_hint,
        "\nOutput format (no timeline):",
        "1) Class goal (1-2 sentences): what the class aimed to build or achieve.",
        "2) What was built/changed (step-by-step, 6-10 bullets):",
        "- Each bullet is ONE short step (<= 18 words).",
        "- If timestamps are present in the transcript, you may prefix a step with [mm:ss] where it starts.",
        "- Do NOT use time ranges.",
        "3) Concepts explained (6-10 bullets):",
        "- Simple, beginner-friendly definitions of new terms used in class.",
        "- Use the project/context files to improve clarity.",
        "4) Commands & code patterns (5-10 bullets):",
        "- Only commands/snippets explicitly mentioned or shown.",
        "- Keep them short and accurate.",
        "5) Key takeaways (3-6 bullets):",
        "- What a student should remember after this class.",
        "6) Summary (3-5 sentences):",
        "- A clear recap in plain language.",
        "\nVideo metadata:",
        title_line.as_str(),
        duration_line.as_str(),
        "\nTranscript:",
        transcript_text,
        extra_block.as_str(),
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_is_deterministic() {
        let a = build_prompt(Some("T"), 65_000, "body", "ctx", OutputFormat::Md);
        let b = build_prompt(Some("T"), 65_000, "body", "ctx", OutputFormat::Md);
        assert_eq!(a, b);
    }

    #[test]
    fn prompt_carries_metadata_and_transcript() {
        let prompt = build_prompt(
            Some("Intro to Vite"),
            65_000,
            "[00:00] hello",
            "",
            OutputFormat::Md,
        );
        assert!(prompt.contains("Title: Intro to Vite"));
        assert!(prompt.contains("Approx duration: 01:05"));
        assert!(prompt.contains("[00:00] hello"));
        assert!(prompt.contains("Output in Markdown."));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn prompt_lists_all_six_sections() {
        let prompt = build_prompt(None, 0, "t", "", OutputFormat::Md);
        for section in [
            "1) Class goal",
            "2) What was built/changed",
            "3) Concepts explained",
            "4) Commands & code patterns",
            "5) Key takeaways",
            "6) Summary",
        ] {
            assert!(prompt.contains(section), "missing section: {section}");
        }
    }

    #[test]
    fn missing_title_and_duration_get_placeholders() {
        let prompt = build_prompt(None, 0, "t", "", OutputFormat::Md);
        assert!(prompt.contains("Title: (unknown)"));
        assert!(prompt.contains("Approx duration: unknown"));
    }

    #[test]
    fn html_format_and_extra_context() {
        let prompt = build_prompt(None, 0, "t", "package.json contents", OutputFormat::Html);
        assert!(prompt.contains("single <article> element"));
        assert!(prompt.contains("Additional context (files or notes):\npackage.json contents"));
    }
}
