//! Component names, paths and spelling hints.

use crate::error::{TreeError, TreeResult};

/// Separator between component names in a path, e.g. `form-address-street`.
pub const NAME_SEPARATOR: char = '-';

/// Check whether `name` is a legal component name: non-empty, ASCII
/// alphanumerics and underscores only.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.bytes().all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

/// Validate a component name.
pub fn validate_name(name: &str) -> TreeResult<()> {
    if is_valid_name(name) {
        Ok(())
    } else {
        Err(TreeError::invalid_argument(format!(
            "Component name must be non-empty alphanumeric string, '{name}' given."
        )))
    }
}

/// Split a path into its first segment and the remainder, if any.
pub fn split_path(path: &str) -> (&str, Option<&str>) {
    match path.split_once(NAME_SEPARATOR) {
        Some((head, rest)) => (head, Some(rest)),
        None => (path, None),
    }
}

/// Suggest the closest candidate to a misspelled `value`.
///
/// Candidates equal to `value` are ignored. A candidate is only suggested
/// when its edit distance is within a quarter of the value's length plus one.
pub fn suggestion<'a, I>(candidates: I, value: &str) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = value.chars().count() / 4 + 1;
    let mut best: Option<(usize, &str)> = None;
    for candidate in candidates {
        if candidate == value {
            continue;
        }
        let distance = levenshtein(candidate, value);
        if distance <= threshold && best.is_none_or(|(d, _)| distance < d) {
            best = Some((distance, candidate));
        }
    }
    best.map(|(_, candidate)| candidate.to_string())
}

fn levenshtein(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != *cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}
