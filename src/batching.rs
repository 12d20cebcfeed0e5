//! Order-preserving batch splitting for bounded-memory inference.

/// Clamp the configured batch size so it never exceeds the input count.
///
/// A batch size larger than the input would only pad allocations; zero is
/// treated as 1 so splitting always makes progress.
pub fn effective_batch_size(requested: usize, total: usize) -> usize {
    requested.max(1).min(total.max(1))
}

/// Partition texts into `ceil(N / batch_size)` contiguous batches.
///
/// Input order is preserved across batch boundaries so output rows map
/// back to input positions; the last batch may be smaller.
pub fn batch_texts(texts: &[String], batch_size: usize) -> impl Iterator<Item = &[String]> {
    texts.chunks(batch_size.max(1))
}
