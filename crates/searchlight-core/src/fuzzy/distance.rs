//! Edit distance and normalized similarity
//!
//! Optimal string alignment distance: insertions, deletions, substitutions
//! and adjacent transpositions each cost one edit. Works on chars, not bytes.

/// Edit distance between two char sequences
pub fn edit_distance(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }

    // Three rolling rows: two back (for transpositions), previous, current
    let mut two_back: Vec<usize> = vec![0; b.len() + 1];
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr: Vec<usize> = vec![0; b.len() + 1];

    for i in 1..=a.len() {
        curr[0] = i;
        for j in 1..=b.len() {
            let cost = if a[i - 1] == b[j - 1] { 0 } else { 1 };
            let mut best = (prev[j] + 1).min(curr[j - 1] + 1).min(prev[j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(two_back[j - 2] + 1);
            }
            curr[j] = best;
        }
        std::mem::swap(&mut two_back, &mut prev);
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Similarity in [0, 1]: `1 - distance / longest length`
pub fn similarity(a: &[char], b: &[char]) -> f32 {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - edit_distance(a, b) as f32 / longest as f32
}

/// Similarity, or `None` when it cannot reach `min`
///
/// The length difference is a lower bound on the distance, so most poor
/// candidates are rejected without running the DP.
pub fn similarity_at_least(a: &[char], b: &[char], min: f32) -> Option<f32> {
    let longest = a.len().max(b.len());
    if longest == 0 {
        return Some(1.0);
    }

    let length_gap = a.len().abs_diff(b.len());
    if 1.0 - (length_gap as f32 / longest as f32) < min {
        return None;
    }

    let score = similarity(a, b);
    (score >= min).then_some(score)
}
