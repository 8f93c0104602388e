//! Text rendering for container diagnostics.
//!
//! Formats resolution paths, function display names and
//! "did you mean?" hints used by the container's error types.

/// Separator placed between an aggregate message and the error it wraps.
pub const INNER_ERROR_SEPARATOR: &str = "------------------------------------------------";

/// Renders a resolution path as a readable string.
///
/// # Examples
/// ```
/// use sanad_support::rendering::render_chain;
///
/// let chain = vec!["Session", "Repository", "Session"];
/// assert_eq!(render_chain(&chain), "Session → Repository → Session");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Strips module paths from a fully qualified type name, keeping generics.
///
/// ```
/// use sanad_support::rendering::display_name;
///
/// assert_eq!(display_name("app::db::Pool"), "Pool");
/// assert_eq!(display_name("alloc::sync::Arc<dyn app::Clock>"), "Arc<dyn Clock>");
/// ```
pub fn display_name(full_name: &str) -> String {
    let mut out = String::with_capacity(full_name.len());
    let mut segment = String::new();
    let mut chars = full_name.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '&' | '(' | ')' | '[' | ']' | ';' => {
                out.push_str(&segment);
                out.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    out.push_str(&segment);
    out
}

/// Appends the rendered inner error below an aggregate message.
///
/// ```
/// use sanad_support::rendering::render_aggregate;
///
/// let text = render_aggregate("Error instantiating Mailer.", Some("smtp host missing"));
/// assert!(text.starts_with("Error instantiating Mailer."));
/// assert!(text.ends_with("inner error: smtp host missing"));
/// ```
pub fn render_aggregate(message: &str, inner: Option<&str>) -> String {
    match inner {
        Some(inner) => format!("{message}\n{INNER_ERROR_SEPARATOR}\ninner error: {inner}"),
        None => message.to_string(),
    }
}

/// Picks up to `max` candidates that look like `requested`.
///
/// Candidates are compared on their display names, case-insensitively.
/// A candidate qualifies when one name contains the other or when the
/// edit distance is at most a third of the longer name. Closest first.
pub fn suggest_similar<'a>(requested: &str, candidates: &[&'a str], max: usize) -> Vec<&'a str> {
    let wanted = display_name(requested).to_lowercase();

    let mut scored: Vec<(&'a str, usize)> = candidates
        .iter()
        .filter_map(|&candidate| {
            let name = display_name(candidate).to_lowercase();
            if name == wanted {
                return Some((candidate, 0));
            }
            if !name.is_empty() && (name.contains(&wanted) || wanted.contains(&name)) {
                return Some((candidate, 1));
            }

            let distance = edit_distance(&wanted, &name);
            let limit = wanted.chars().count().max(name.chars().count()) / 3;
            (distance <= limit).then_some((candidate, distance + 1))
        })
        .collect();

    scored.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(b.0)));
    scored.into_iter().take(max).map(|(name, _)| name).collect()
}

/// Levenshtein distance over chars, single-row variant.
fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            let cost = usize::from(ca != *cb);
            row[j + 1] = (above + 1).min(row[j] + 1).min(diagonal + cost);
            diagonal = above;
        }
    }

    row[b.len()]
}
