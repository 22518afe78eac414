//! Decide when a sequence of expansion coefficients has converged.

/// Return the number of coefficients to keep, or `None` if the sequence is not resolved.
///
/// The magnitudes are normalised by the larger of their maximum and
/// `scale_hint`. The sequence is resolved when its monotone envelope drops
/// below `tol` and at least an eighth of the coefficients (minimum 2) lie in
/// the tail below `tol`.
pub fn chop(magnitudes: &[f64], tol: f64, scale_hint: f64) -> Option<usize> {
    let n = magnitudes.len();
    let vscale = magnitudes.iter().cloned().fold(scale_hint.abs(), f64::max);
    if vscale == 0.0 {
        return Some(1);
    }

    // envelope[j] = max_{k >= j} |c_k| / vscale
    let mut envelope = vec![0.0; n];
    let mut running = 0.0f64;
    for j in (0..n).rev() {
        running = running.max(magnitudes[j] / vscale);
        envelope[j] = running;
    }

    let cutoff = envelope.iter().position(|&e| e <= tol)?;
    let tail = std::cmp::max(2, n / 8);
    if n - cutoff < tail {
        return None;
    }
    Some(std::cmp::max(cutoff, 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometric_decay_is_chopped() {
        let mags: Vec<f64> = (0..33).map(|k| 0.5f64.powi(k)).collect();
        let length = chop(&mags, 1E-6, 0.0).unwrap();
        // 0.5^20 < 1E-6 < 0.5^19
        assert_eq!(length, 20);
    }

    #[test]
    fn test_slow_decay_is_unresolved() {
        let mags: Vec<f64> = (0..17).map(|k| 0.9f64.powi(k)).collect();
        assert!(chop(&mags, 1E-10, 0.0).is_none());
    }

    #[test]
    fn test_zero_and_scale_hint() {
        assert_eq!(chop(&[0.0; 17], 1E-10, 0.0), Some(1));
        let mags: Vec<f64> = (0..17).map(|k| 1E-6 * 0.1f64.powi(k)).collect();
        // Relative to itself this needs many terms, relative to the hint it is negligible.
        assert_eq!(chop(&mags, 3E-10, 1.0), Some(4));
    }
}
