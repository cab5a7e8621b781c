//! Deterministic degraded answer, served whenever the inference client
//! cannot produce text. Always succeeds; the labeling line is the only
//! way an end user can tell this apart from a model answer.

/// Lines of reference excerpt included in the degraded answer.
const EXCERPT_LINES: usize = 8;

/// Builds the degraded answer: fixed explanatory preamble, the question
/// echoed back, and a short excerpt of the current reference content.
pub fn fallback_reply(question: &str, reference: &str) -> String {
    let excerpt = reference
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && trimmed != "---"
        })
        .take(EXCERPT_LINES)
        .collect::<Vec<_>>()
        .join("\n");

    let question = if question.trim().is_empty() {
        "General question"
    } else {
        question
    };

    format!(
        "⚠️ Vertex AI configuration is missing, so showing a quick guide summary instead of an AI response.\n\n\
         📌 Question: {question}\n\
         ✅ Full AI answers will return once you add GOOGLE_CLOUD_PROJECT and VERTEX_LOCATION to Cloud Run env variables.\n\
         ✅ Grant the Vertex AI User (roles/aiplatform.user) role to the service account.\n\
         \nQuick Info:\n{excerpt}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::FALLBACK_GUIDE;

    #[test]
    fn starts_with_the_fixed_preamble_and_echoes_the_question() {
        let reply = fallback_reply("Can I open a bank account without SSN?", FALLBACK_GUIDE);
        assert!(reply.starts_with("⚠️ Vertex AI configuration is missing"));
        assert!(reply.contains("Can I open a bank account without SSN?"));
    }

    #[test]
    fn excerpt_is_at_most_eight_lines() {
        let reply = fallback_reply("q", FALLBACK_GUIDE);
        let excerpt = reply.split("Quick Info:\n").nth(1).unwrap();
        assert!(excerpt.lines().count() <= 8);
    }

    #[test]
    fn separator_lines_are_excluded_from_the_excerpt() {
        let reference = "block one\n---\nblock two\n---\nblock three";
        let reply = fallback_reply("q", reference);
        let excerpt = reply.split("Quick Info:\n").nth(1).unwrap();
        assert_eq!(excerpt, "block one\nblock two\nblock three");
    }

    #[test]
    fn empty_question_becomes_general_question() {
        let reply = fallback_reply("   ", FALLBACK_GUIDE);
        assert!(reply.contains("📌 Question: General question"));
    }
}
