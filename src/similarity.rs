use std::collections::HashSet;

/// Coarse pair statistics used to decide whether the overlap oracle is worth
/// invoking: token-set Jaccard similarity plus the two token counts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenStats {
    /// `None` when both token sets are empty (the ratio is undefined).
    pub jaccard: Option<f64>,
    pub r_tokens: usize,
    pub s_tokens: usize,
}

/// Deduplicated set of all cell values across the admissible columns.
pub fn token_set(columns: &[Vec<String>]) -> HashSet<&str> {
    columns
        .iter()
        .flat_map(|col| col.iter().map(String::as_str))
        .collect()
}

/// Jaccard similarity between the cell-token sets of two normalized tables.
pub fn token_similarity(r_columns: &[Vec<String>], s_columns: &[Vec<String>]) -> TokenStats {
    let r = token_set(r_columns);
    let s = token_set(s_columns);
    let intersection = r.intersection(&s).count();
    let union = r.len() + s.len() - intersection;
    let jaccard = if union == 0 {
        None
    } else {
        Some(intersection as f64 / union as f64)
    };
    TokenStats {
        jaccard,
        r_tokens: r.len(),
        s_tokens: s.len(),
    }
}
