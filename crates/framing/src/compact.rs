/// Sequence that starts a comment running to the end of the line.
pub const COMMENT_INTRODUCER: &str = "--";

/// Squeeze a script into a single transmittable line.
///
/// Each line is cut at the first comment introducer and trimmed; lines left
/// empty are dropped and the survivors are joined with single spaces.
pub fn compact(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let code = match line.find(COMMENT_INTRODUCER) {
                Some(idx) => line.get(..idx).unwrap_or(line),
                None => line,
            };
            code.trim()
        })
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
