//! Weighted edit distance.

use super::EditCosts;

/// Minimum total cost of single-character edits turning `a` into `b`.
///
/// Classic dynamic program over the `(|a|+1) x (|b|+1)` prefix table, kept
/// as two rolling rows. Characters are Unicode scalar values.
///
/// The result is symmetric only when `costs.insert == costs.delete`; with
/// other weights `distance(a, b) != distance(b, a)` is expected.
///
/// # Examples
///
/// ```
/// use lexmerge::similarity::{distance, EditCosts};
///
/// let costs = EditCosts::new(4, 3, 5);
/// assert_eq!(distance("testing", "toasting", costs), 9);
/// assert_eq!(distance("", "abc", costs), 12);
/// ```
#[must_use]
pub fn distance(a: &str, b: &str, costs: EditCosts) -> u32 {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    // prev[j] is the cost of turning a[..i-1] into b[..j].
    let mut prev: Vec<u32> = (0..=b.len())
        .map(|j| costs.insert.saturating_mul(len_u32(j)))
        .collect();
    let mut curr = vec![0u32; b.len() + 1];

    for (i, &ca) in a.iter().enumerate() {
        curr[0] = costs.delete.saturating_mul(len_u32(i + 1));
        for (j, &cb) in b.iter().enumerate() {
            let substitute = if ca == cb {
                prev[j]
            } else {
                prev[j].saturating_add(costs.substitute)
            };
            let delete = prev[j + 1].saturating_add(costs.delete);
            let insert = curr[j].saturating_add(costs.insert);
            curr[j + 1] = substitute.min(delete).min(insert);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

fn len_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
