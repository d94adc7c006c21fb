//! Scalar losses over score vectors. All return the mean over the batch; empty input gives `0.0`.

/// `mean(max(0, margin - pos + neg))`
pub fn hinge_loss(pos: &[f32], neg: &[f32], margin: f32) -> f32 {
    mean(
        pos.iter()
            .zip(neg)
            .map(|(&p, &n)| (margin - p + n).max(0.0)),
    )
}

/// Hinge term plus an intra-class term pulling every positive score above `intra_margin`:
/// `hinge + intra_weight * mean(max(0, intra_margin - pos))`.
pub fn improved_triplet_loss(
    pos: &[f32],
    neg: &[f32],
    margin: f32,
    intra_margin: f32,
    intra_weight: f32,
) -> f32 {
    let intra = mean(pos.iter().map(|&p| (intra_margin - p).max(0.0)));
    hinge_loss(pos, neg, margin) + intra_weight * intra
}

/// Mean sigmoid cross-entropy of raw logits against 0/1 targets.
pub fn sigmoid_loss(logits: &[f32], targets: &[f32]) -> f32 {
    mean(logits.iter().zip(targets).map(|(&x, &t)| stable_bce(x, t)))
}

/// Numerically stable `σ(x)`.
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// First column of `softmax(row)`.
pub fn softmax_first(row: &[f32]) -> f32 {
    let Some(&first) = row.first() else {
        return 0.0;
    };
    let max = row.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let denom: f32 = row.iter().map(|&z| (z - max).exp()).sum();
    (first - max).exp() / denom
}

/// `max(x, 0) - x*t + log(1 + exp(-|x|))`
fn stable_bce(logit: f32, target: f32) -> f32 {
    logit.max(0.0) - logit * target + (1.0 + (-logit.abs()).exp()).ln()
}

fn mean(values: impl Iterator<Item = f32>) -> f32 {
    let (sum, count) = values.fold((0.0f32, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 { 0.0 } else { sum / count as f32 }
}
