use crate::similarity::ScoreMatrix;

/// Majority label among each query's `k` best references.
///
/// Ties in the tally go to the label that entered it first, i.e. the one whose best-ranked
/// reference is nearest. With `k = 1` this is exactly the nearest-neighbor label. `k` is clamped
/// to the reference count; `None` for a query only when there are no references.
pub fn knn_vote(matrix: &ScoreMatrix, ref_labels: &[u32], k: usize) -> Vec<Option<u32>> {
    let metric = matrix.metric();
    let k = k.max(1);

    (0..matrix.rows())
        .map(|r| {
            let mut tally: Vec<(u32, usize)> = Vec::with_capacity(k);
            for idx in metric.rank(matrix.row(r)).into_iter().take(k) {
                let label = ref_labels[idx];
                match tally.iter_mut().find(|(l, _)| *l == label) {
                    Some((_, count)) => *count += 1,
                    None => tally.push((label, 1)),
                }
            }

            let mut best: Option<(u32, usize)> = None;
            for &(label, count) in &tally {
                if best.is_none_or(|(_, c)| count > c) {
                    best = Some((label, count));
                }
            }
            best.map(|(label, _)| label)
        })
        .collect()
}
