/// Essentially np.bincount(keys).
pub fn bincount(keys: &[usize]) -> Vec<usize> {
    let max = match keys.iter().max() {
        Some(&m) => m,
        None => return Vec::new(),
    };

    let mut counts = vec![0; max + 1];
    for &key in keys {
        counts[key] += 1;
    }
    counts
}

/// Positions of `keys` ordered by decreasing key, in `O(n + max key)` time.
///
/// Positions sharing a key keep their relative order.
pub fn order_by_decreasing_key(keys: &[usize]) -> Vec<usize> {
    let counts = bincount(keys);

    // offsets[k] is the first output slot of key k, largest keys first.
    let mut offsets = vec![0; counts.len()];
    let mut next = 0;
    for key in (0..counts.len()).rev() {
        offsets[key] = next;
        next += counts[key];
    }

    let mut order = vec![0; keys.len()];
    for (position, &key) in keys.iter().enumerate() {
        order[offsets[key]] = position;
        offsets[key] += 1;
    }
    order
}
