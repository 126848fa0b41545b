/// Escapes caller-supplied text for inclusion in an HTML document.
///
/// Every character with a meaning in HTML (including quotes, `=` and
/// whitespace) is turned into an entity, so the result is safe both as
/// element content and inside attribute values. Use this for plain text; it
/// does not keep any markup.
pub fn escape_text(input: &str) -> String {
    ammonia::clean_text(input)
}
