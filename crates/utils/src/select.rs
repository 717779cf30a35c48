//! Top-N selection within cross-sections.

use polars::prelude::*;

/// Select the `n` best ranked rows in each group.
///
/// Rows are ordered by `rank_var` ascending (rank 1 is best); ties are broken
/// by row order. Rows with a null rank never qualify.
///
/// # Arguments
/// * `df` - Input LazyFrame
/// * `n` - Number of rows to keep per group
/// * `rank_var` - Column to order by
/// * `group_vars` - Columns to group by (typically "date")
/// * `filter` - If true, return only the top rows; if false, add a boolean
///   `rank_mask` column and keep every row
///
/// # Returns
/// LazyFrame with the selected rows or the mask column.
pub fn top_n_by_group(
    df: LazyFrame,
    n: u32,
    rank_var: &str,
    group_vars: &[&str],
    filter: bool,
) -> LazyFrame {
    let group_exprs: Vec<Expr> = group_vars.iter().map(|&c| col(c)).collect();

    let position = col(rank_var)
        .rank(RankOptions { method: RankMethod::Ordinal, descending: false }, None)
        .over(group_exprs)
        .cast(DataType::Int64);
    let in_top = position.lt_eq(lit(i64::from(n))).fill_null(lit(false));

    if filter { df.filter(in_top) } else { df.with_column(in_top.alias("rank_mask")) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LazyFrame {
        df! {
            "date" => &[1, 1, 1, 1, 2, 2, 2, 2],
            "symbol" => &["A", "B", "C", "D", "A", "B", "C", "D"],
            "rank" => &[
                Some(4.0),
                Some(1.0),
                Some(2.0),
                Some(3.0),
                None,
                Some(2.0),
                Some(1.0),
                Some(3.0),
            ],
        }
        .unwrap()
        .lazy()
    }

    #[test]
    fn top_n_by_group_filter() {
        let result = top_n_by_group(sample(), 2, "rank", &["date"], true)
            .sort(["date", "symbol"], SortMultipleOptions::default())
            .collect()
            .unwrap();

        let symbols: Vec<Option<&str>> =
            result.column("symbol").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(symbols, vec![Some("B"), Some("C"), Some("B"), Some("C")]);
    }

    #[test]
    fn top_n_by_group_mask() {
        let result = top_n_by_group(sample(), 3, "rank", &["date"], false).collect().unwrap();

        assert_eq!(result.height(), 8);
        let mask: Vec<Option<bool>> =
            result.column("rank_mask").unwrap().bool().unwrap().into_iter().collect();
        assert_eq!(
            mask,
            [false, true, true, true, false, true, true, true].map(Some).to_vec()
        );
    }

    #[test]
    fn n_larger_than_group_keeps_ranked_rows() {
        let result = top_n_by_group(sample(), 10, "rank", &["date"], true).collect().unwrap();
        assert_eq!(result.height(), 7);
    }
}
