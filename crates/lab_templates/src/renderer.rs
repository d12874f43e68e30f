//! Placeholder substitution for stack templates.

use tracing::debug;

/// Token replaced by the Kestra configuration fragment.
pub const KESTRA_CONFIGURATION_PLACEHOLDER: &str = "KESTRA_CONFIGURATION_PLACEHOLDER";

/// Token replaced by the Kestra init script fragment.
pub const KESTRA_INIT_SCRIPT_PLACEHOLDER: &str = "KESTRA_INIT_SCRIPT_PLACEHOLDER";

/// Renders placeholder slots into a template body.
///
/// Multi-line replacements are re-indented to the column of the placeholder so
/// that the embedded block stays aligned inside whitespace-sensitive documents
/// such as YAML literal blocks.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlaceholderRenderer;

impl PlaceholderRenderer {
    /// Create a new renderer.
    pub fn new() -> Self {
        Self
    }

    /// Apply every `(token, replacement)` slot to `body`, in order.
    pub fn materialize<'a, I>(&self, body: &str, slots: I) -> String
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        slots
            .into_iter()
            .fold(body.to_string(), |rendered, (token, replacement)| {
                replace_placeholder(&rendered, token, replacement)
            })
    }
}

/// Replace every occurrence of `placeholder` in `body` with `replacement`.
///
/// The indentation applied to continuation lines is the number of characters
/// between the start of the line and the first occurrence of the placeholder.
/// A body without the placeholder is returned unchanged.
pub fn replace_placeholder(body: &str, placeholder: &str, replacement: &str) -> String {
    let Some(index) = body.find(placeholder) else {
        return body.to_string();
    };

    let indentation = indentation_at(body, index);
    debug!(placeholder, indentation, "Substituting placeholder");

    let indented = replacement.replace('\n', &format!("\n{}", " ".repeat(indentation)));
    body.replace(placeholder, &indented)
}

/// Character column of the byte offset `index` within its line.
fn indentation_at(body: &str, index: usize) -> usize {
    body[..index]
        .chars()
        .rev()
        .take_while(|c| *c != '\n')
        .count()
}
