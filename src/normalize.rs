use crate::models::RawTable;

/// Turn a stored row-major table into a column-oriented matrix with the
/// header rows stripped. Rows shorter than `num_columns` are padded with
/// empty cells so every column has the same height.
pub fn to_columns(raw: &RawTable) -> Vec<Vec<String>> {
    let body = raw.rows.iter().skip(raw.num_header_rows);
    let mut columns: Vec<Vec<String>> = vec![Vec::new(); raw.num_columns];
    for row in body {
        for (c, col) in columns.iter_mut().enumerate() {
            col.push(row.get(c).cloned().unwrap_or_default());
        }
    }
    columns
}

/// Drop columns carrying fewer than `min_distinct` distinct values.
/// Near-constant columns in scraped tables are boilerplate (labels, units)
/// and would otherwise dominate the overlap search.
pub fn filter_low_variety(columns: Vec<Vec<String>>, min_distinct: usize) -> Vec<Vec<String>> {
    columns
        .into_iter()
        .filter(|col| {
            let distinct: std::collections::HashSet<&String> = col.iter().collect();
            distinct.len() >= min_distinct
        })
        .collect()
}

/// Normalize per the corpus policy: column-orient, strip headers, and apply
/// the dataset's admissibility filter when it defines one.
pub fn normalize(raw: &RawTable, min_distinct: Option<usize>) -> Vec<Vec<String>> {
    let columns = to_columns(raw);
    match min_distinct {
        Some(n) => filter_low_variety(columns, n),
        None => columns,
    }
}

/// Width, height and area of a normalized table. Height is 0 when every
/// column was filtered away.
pub fn dimensions(columns: &[Vec<String>]) -> (usize, usize, usize) {
    let w = columns.len();
    let h = columns.first().map(|c| c.len()).unwrap_or(0);
    (w, h, w * h)
}
