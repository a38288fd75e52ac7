//! Prompt templates sent to the model.

/// Persona used whenever a directory has no context of its own.
pub const DEFAULT_PERSONA: &str = "You are an expert in expression. You receive texts and \
    reformulate them clearly while keeping their full meaning.";

pub(crate) const REPLY_SHAPE: &str = "{\"text\": \"...\"}";

pub(crate) const JSON_REPLY: &str =
    "Answer only with a JSON object of the form {\"text\": \"...\"} and nothing else.";

pub(crate) fn persona(context: &str) -> &str {
    let context = context.trim();
    if context.is_empty() {
        DEFAULT_PERSONA
    } else {
        context
    }
}

pub fn rephrase(context: &str, chunk: &str) -> String {
    format!(
        "{}\n\nRephrase the following text fully. Do not summarize and do not leave \
         anything out. Keep the language of the original.\n\nText:\n{}\n\n{}",
        persona(context),
        chunk,
        JSON_REPLY
    )
}

pub fn translate(user_query: &str, chunk: &str) -> String {
    format!(
        "You are a professional translator.\n\nTranslate the following text into the \
         language implied by this request: \"{}\". Translate everything and add no \
         commentary.\n\nText:\n{}\n\n{}",
        user_query.trim(),
        chunk,
        JSON_REPLY
    )
}

pub fn add_text(context: &str, user_query: &str, chunk: &str) -> String {
    format!(
        "{}\n\nHere is an excerpt of the document being written:\n{}\n\nWrite the new \
         passage the author asks for: \"{}\". Return only the new passage, matching the \
         tone and language of the document.\n\n{}",
        persona(context),
        chunk,
        user_query.trim(),
        JSON_REPLY
    )
}

pub fn synthesize(context: &str, user_query: &str, partials: &[String]) -> String {
    let drafts = partials
        .iter()
        .enumerate()
        .map(|(i, p)| format!("Draft {}:\n{}", i + 1, p))
        .collect::<Vec<_>>()
        .join("\n\n");
    format!(
        "{}\n\nSeveral drafts were written, each from a different part of the same \
         document, in answer to this request: \"{}\".\n\n{}\n\nMerge them into one \
         coherent passage that answers the request once.\n\n{}",
        persona(context),
        user_query.trim(),
        drafts,
        JSON_REPLY
    )
}

pub fn describe_persona(description: &str) -> String {
    format!(
        "Write a persona for a writing assistant, in two short sentences, addressed to \
         the assistant as \"You are ...\". The assistant will be used for: \"{}\".\n\n{}",
        description.trim(),
        JSON_REPLY
    )
}
