//! Joins translated windows back into one text

/// Separator placed between consecutive translated chunks
pub const CHUNK_SEPARATOR: &str = " ";

/// Concatenate translated chunks in order.
///
/// Text translated twice because it sat in an overlap region is kept twice;
/// the join does not try to deduplicate it.
pub fn join<S: AsRef<str>>(chunks: &[S]) -> String {
    let capacity = chunks.iter().map(|c| c.as_ref().len() + 1).sum();
    let mut joined = String::with_capacity(capacity);

    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            joined.push_str(CHUNK_SEPARATOR);
        }
        joined.push_str(chunk.as_ref());
    }

    joined
}
