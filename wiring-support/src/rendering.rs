//! Text rendering for names and error messages.
//!
//! The token API keys registrations by *class name*. A Rust type has no
//! class name, only a path like `my_app::users::UserService`, so the short
//! name is derived here and used everywhere a name key is needed.

/// Renders a dependency chain as a readable string.
///
/// # Examples
/// ```
/// use wiring_support::rendering::render_chain;
///
/// let chain = vec!["UserController", "UserService", "UserController"];
/// assert_eq!(render_chain(&chain), "UserController → UserService → UserController");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Derives the class name of a fully qualified Rust type name.
///
/// Every path segment is reduced to its last component, generic
/// arguments included, so the result is stable across module moves.
///
/// ```
/// use wiring_support::rendering::class_name;
///
/// assert_eq!(class_name("my_app::services::user::UserService"), "UserService");
/// assert_eq!(class_name("alloc::sync::Arc<dyn my_app::traits::Logger>"), "Arc<dyn Logger>");
/// assert_eq!(class_name("my_app::Repo<my_app::User, u64>"), "Repo<User, u64>");
/// ```
pub fn class_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' | '(' | ')' | '[' | ']' | '&' | ';' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Suggests registered names close to a requested one.
///
/// Candidates are scored by substring containment first, then by the
/// length of the common prefix of their class names. At most
/// `max_suggestions` names are returned, best first.
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_short = class_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter(|&&name| name != requested)
        .filter_map(|&name| {
            let name_lower = name.to_lowercase();
            let name_short = class_name(name).to_lowercase();

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 80));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    scored.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}
