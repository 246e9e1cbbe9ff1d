/// Escape text for insertion as HTML markup.
///
/// Chat bubbles are inserted as markup, so anything the visitor typed must
/// pass through here first. Escapes the five characters that can open a tag,
/// an entity, or break out of an attribute value.
pub fn escape_html(text: &str) -> String {
    let mut result = String::with_capacity(text.len() + text.len() / 4);

    for c in text.chars() {
        match c {
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#39;"),
            _ => result.push(c),
        }
    }

    result
}
