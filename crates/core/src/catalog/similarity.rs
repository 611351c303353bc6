//! Gestalt pattern matching (Ratcliff/Obershelp) similarity.
//!
//! `ratio(a, b) = 2 * M / (|a| + |b|)` where `M` is the number of characters
//! in the matching blocks found by recursively taking the longest common
//! substring and matching the pieces on either side of it.

use std::collections::HashMap;

/// Similarity in `0.0..=1.0`. Two empty strings are identical.
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }

    let matched = matching_characters(&a, &b);
    2.0 * matched as f64 / total as f64
}

fn matching_characters(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, ch) in b.iter().enumerate() {
        b2j.entry(*ch).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, size) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if size == 0 {
            continue;
        }
        matched += size;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + size < ahi && j + size < bhi {
            pending.push((i + size, ahi, j + size, bhi));
        }
    }
    matched
}

/// Longest block `a[i..i+size] == b[j..j+size]` inside the window. Among
/// equally long blocks the one starting earliest in `a` wins, then earliest
/// in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_size) = (alo, blo, 0);
    // run length of the match ending at (i - 1, j), keyed by j
    let mut previous: HashMap<usize, usize> = HashMap::new();

    for (i, ch) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut current: HashMap<usize, usize> = HashMap::new();
        let Some(positions) = b2j.get(ch) else {
            previous = current;
            continue;
        };

        for &j in positions {
            if j < blo {
                continue;
            }
            if j >= bhi {
                break;
            }
            let extends =
                j.checked_sub(1).and_then(|prev_j| previous.get(&prev_j)).copied().unwrap_or(0);
            let run = extends + 1;
            current.insert(j, run);
            if run > best_size {
                best_i = i + 1 - run;
                best_j = j + 1 - run;
                best_size = run;
            }
        }
        previous = current;
    }

    (best_i, best_j, best_size)
}
