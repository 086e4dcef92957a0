//! Gestalt (Ratcliff/Obershelp) string similarity.
//!
//! `ratio = 2 * M / (len(a) + len(b))`, where `M` is the total length of
//! the matching blocks found by repeatedly taking the longest common
//! substring and recursing on the unmatched text to its left and right.
//! Ratios are in `[0, 1]`; two empty strings score 1.

/// A candidate and its similarity to the query.
#[derive(Debug, Clone, PartialEq)]
pub struct Match {
    pub candidate: String,
    pub score: f64,
}

/// Similarity of two strings, compared character by character.
pub fn similarity_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matched_chars(&a, &b) as f64 / total as f64
}

/// Up to `n` candidates scoring at least `cutoff`, best first.
///
/// Equal scores are ordered by candidate, larger first.
pub fn closest_matches<'a, I>(query: &str, candidates: I, n: usize, cutoff: f64) -> Vec<Match>
where
    I: IntoIterator<Item = &'a str>,
{
    if n == 0 {
        return Vec::new();
    }
    let mut matches: Vec<Match> = candidates
        .into_iter()
        .filter_map(|candidate| {
            let score = similarity_ratio(candidate, query);
            (score >= cutoff).then(|| Match {
                candidate: candidate.to_string(),
                score,
            })
        })
        .collect();
    matches.sort_by(|x, y| {
        y.score
            .total_cmp(&x.score)
            .then_with(|| y.candidate.cmp(&x.candidate))
    });
    matches.truncate(n);
    matches
}

/// Total size of the matching blocks between `a` and `b`.
fn matched_chars(a: &[char], b: &[char]) -> usize {
    let mut total = 0;
    let mut queue = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = queue.pop() {
        let (i, j, k) = longest_match(a, b, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        total += k;
        if alo < i && blo < j {
            queue.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            queue.push((i + k, ahi, j + k, bhi));
        }
    }
    total
}

/// Longest common block of `a[alo..ahi]` and `b[blo..bhi]`.
///
/// Returns `(i, j, k)` with `a[i..i+k] == b[j..j+k]`; among equally long
/// blocks the one starting earliest in `a`, then earliest in `b`, wins.
fn longest_match(
    a: &[char],
    b: &[char],
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // run[j + 1] = length of the common suffix ending at a[i], b[j]
    let mut prev = vec![0usize; bhi + 1];
    let mut curr = vec![0usize; bhi + 1];
    for i in alo..ahi {
        for j in blo..bhi {
            curr[j + 1] = if a[i] == b[j] { prev[j] + 1 } else { 0 };
            let k = curr[j + 1];
            if k > best_k {
                best_i = i + 1 - k;
                best_j = j + 1 - k;
                best_k = k;
            }
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    (best_i, best_j, best_k)
}
