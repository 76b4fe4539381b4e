use ndarray::Array2;

/// Floor applied to power values before taking the logarithm.
pub(crate) const AMIN: f32 = 1e-10;
/// Dynamic range kept below the loudest cell.
pub(crate) const TOP_DB: f32 = 80.0;

/// Convert power to decibels relative to the matrix maximum, clipped to `TOP_DB` below it.
pub(crate) fn power_to_db_in_place(values: &mut Array2<f32>) {
    let reference = values.iter().copied().fold(0.0_f32, f32::max);
    let ref_db = 10.0 * reference.max(AMIN).log10();
    values.mapv_inplace(|p| 10.0 * p.max(AMIN).log10() - ref_db);
    let peak = values.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let floor = peak - TOP_DB;
    values.mapv_inplace(|db| db.max(floor));
}

/// Min-max scale into `[0, 1]` using the matrix's own extremes.
///
/// A constant matrix has no range to scale and maps to all zeros.
pub(crate) fn normalize_min_max_in_place(values: &mut Array2<f32>) {
    let (min, max) = values
        .iter()
        .copied()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let range = max - min;
    if !range.is_finite() || range <= f32::EPSILON {
        values.fill(0.0);
        return;
    }
    values.mapv_inplace(|v| ((v - min) / range).clamp(0.0, 1.0));
}
