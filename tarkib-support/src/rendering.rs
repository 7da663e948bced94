//! Text rendering utilities for human-friendly error messages.
//!
//! Type names in a Tarkib container are opaque configuration strings,
//! often namespaced (`app\logging\FileLogger`, `app::db::Connection`,
//! `app.db.connection`). The helpers here know how to split such names
//! into segments so that suggestions and chain rendering stay readable.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use tarkib_support::rendering::render_chain;
///
/// let chain = ["UserService", "UserRepo", "Database", "UserService"];
/// assert_eq!(render_chain(&chain), "UserService → UserRepo → Database → UserService");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    let mut out = String::new();
    for (i, entry) in chain.iter().enumerate() {
        if i > 0 {
            out.push_str(" → ");
        }
        out.push_str(entry.as_ref());
    }
    out
}

/// Returns the last namespace segment of a type name.
///
/// Recognizes `\`, `::` and `.` as namespace separators.
///
/// # Examples
/// ```
/// use tarkib_support::rendering::last_segment;
///
/// assert_eq!(last_segment(r"app\logging\FileLogger"), "FileLogger");
/// assert_eq!(last_segment("app::db::Connection"), "Connection");
/// assert_eq!(last_segment("app.db.connection"), "connection");
/// assert_eq!(last_segment("Logger"), "Logger");
/// ```
pub fn last_segment(name: &str) -> &str {
    name.rsplit(['\\', ':', '.'])
        .next()
        .unwrap_or(name)
}

/// Generates "did you mean?" suggestions for an unknown type name.
///
/// Compares the requested name against all registered names and returns
/// up to `max_suggestions` close matches, best first.
pub fn suggest_similar(
    requested: &str,
    available: &[&str],
    max_suggestions: usize,
) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = last_segment(&requested_lower).to_string();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            if name == requested {
                return None;
            }
            let name_lower = name.to_lowercase();
            let name_short = last_segment(&name_lower);

            // Full-name substring match ranks highest.
            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            // Then a match on the final segment alone.
            if name_short.contains(&requested_short) || requested_short.contains(name_short) {
                return Some((name, 80));
            }

            // Otherwise a shared prefix of the final segment.
            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();
            if common >= 3 {
                return Some((name, common * 10));
            }

            None
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
