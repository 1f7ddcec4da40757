//! Shared helpers
//!
//! Name suggestions for unknown function calls, and the stack limits used by
//! every recursive walk over an expression tree.

/// Stack space below which a recursive walk moves onto a fresh segment
pub const STACK_RED_ZONE: usize = 64 * 1024;
/// Size of each fresh segment
pub const STACK_GROW_SIZE: usize = 1024 * 1024;

/// Levenshtein edit distance between two strings.
/// Uses O(min(m,n)) space with two-row optimization.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let (m, n) = (a_chars.len(), b_chars.len());

    if m == 0 {
        return n;
    }
    if n == 0 {
        return m;
    }

    let mut prev: Vec<usize> = (0..=n).collect();
    let mut curr: Vec<usize> = vec![0; n + 1];

    for i in 1..=m {
        curr[0] = i;
        for j in 1..=n {
            let cost = usize::from(a_chars[i - 1] != b_chars[j - 1]);
            curr[j] = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[n]
}

/// Closest candidate within `threshold` edits; ties keep the earliest candidate
pub fn find_similar_name<'a, I>(name: &str, candidates: I, threshold: usize) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut best: Option<(&str, usize)> = None;

    for candidate in candidates {
        let distance = levenshtein_distance(name, candidate);
        if distance <= threshold && best.is_none_or(|(_, d)| distance < d) {
            best = Some((candidate, distance));
        }
    }

    best.map(|(candidate, _)| candidate)
}

/// ` (did you mean `name`?)` or nothing
pub fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean `{name}`?)"),
        None => String::new(),
    }
}
