/// Returns the index of the first maximum in `values`.
///
/// The running maximum starts at `0.0` and only a strictly larger value
/// replaces it, so a slice with no positive value yields `0`.
pub fn argmax(values: &[f64]) -> usize {
    let max = values.iter().fold(0.0, |max, &v| if v > max { v } else { max });
    values.iter().position(|&v| v == max).unwrap_or(0)
}

/// Returns a vector of `len` zeros with a one at `index`.
pub fn one_hot(index: usize, len: usize) -> Vec<f64> {
    let mut encoded = vec![0.0; len];
    encoded[index] = 1.0;
    encoded
}

/// Reads the trailing class label of a training row.
///
/// Returns `None` for an empty row, or if the label is not a non-negative
/// integer.
pub fn label_of(row: &[f64]) -> Option<usize> {
    let &label = row.last()?;
    if label >= 0.0 && label.fract() == 0.0 && label <= usize::MAX as f64 {
        Some(label as usize)
    } else {
        None
    }
}
