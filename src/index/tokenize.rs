/// Split text into lowercase alphanumeric terms.
///
/// Any non-alphanumeric character is a separator, so `zap-request.md`
/// yields `["zap", "request", "md"]`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
