/// Dense placements for a list of raw scores, returned in input order.
///
/// Higher scores place better. Equal scores share a placement and the next
/// lower score continues from it without a gap, so `[10, 10, 7]` places
/// `[1, 1, 2]`.
pub fn dense_placements(scores: &[i32]) -> Vec<i32> {
    let mut distinct = scores.to_vec();
    distinct.sort_unstable_by(|a, b| b.cmp(a));
    distinct.dedup();

    scores
        .iter()
        .map(|score| distinct.partition_point(|higher| higher > score) as i32 + 1)
        .collect()
}
