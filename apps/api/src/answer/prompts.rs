//! Prompt composition. Pure functions of their inputs; every model call
//! is built here so the domain constraint cannot be bypassed by a route.

/// Fixed domain/style directive appended to every task prompt. Restricts
/// the topic domain and mandates the output template the UI renders.
pub const DOMAIN_DIRECTIVE: &str = "\
🇺🇸 ONLY ANSWER ABOUT USA-RELATED TOPICS
✅ USA VISA / SSN / BANK / HOUSING / UBER / TAX / HEALTH
• Add emoji to each step: ✅ 🚀 💰 📱 🏠 🪪 ✈️ 🏥 💳
• CAPITALIZE important words
• Short paragraphs, long lists
• USE OUTPUT TEMPLATE:
  1) Quick Summary (3 items)
  2) Step-by-Step Checklist
  3) Common Mistakes / Risks
  4) Official Links (if available)
  5) Next Step (one clear recommendation)
⚠️ USA / NJ / NY ONLY!";

/// Builds the full generation prompt: task instruction, domain directive,
/// current reference data, then the user's question.
pub fn compose(task_system: &str, question: &str, reference: &str) -> String {
    format!(
        "{task_system}\n\n{DOMAIN_DIRECTIVE}\n\nReference data:\n{reference}\n\nUser question:\n{question}"
    )
}
