//! Prompt construction.

use commentpilot_protocols::LanguageStyle;

/// Instruction placed before the quoted context for each tone.
pub fn style_prefix(style: LanguageStyle) -> &'static str {
    match style {
        LanguageStyle::Formal => {
            "Please generate a formal and professional response to this content:"
        }
        LanguageStyle::Casual => "Create a casual and relaxed response to this:",
        LanguageStyle::Friendly => "Write a friendly and warm response to this:",
        LanguageStyle::Professional => "Compose a business-appropriate response to this:",
        LanguageStyle::Humorous => "Generate a funny and light-hearted response to this:",
    }
}

/// Compose `{prefix} "{context}"`.
///
/// Unknown tone names are resolved to casual before they get here (see
/// [`LanguageStyle::from_name`]).
pub fn build_prompt(context: &str, style: LanguageStyle) -> String {
    format!("{} \"{}\"", style_prefix(style), context)
}
