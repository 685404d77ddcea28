//! Axis tick selection and labels

use super::data::{SEAM_EAST, SEAM_WEST};

/// Longitude label: `0°`, `<n>°W` west of Greenwich, `<n>°E` east of it
pub fn degree_label(longitude: i32) -> String {
    match longitude {
        0 => "0°".to_string(),
        l if l < 0 => format!("{}°W", l.unsigned_abs()),
        l => format!("{}°E", l),
    }
}

/// Longitude tick values for the current domain
///
/// Multiples of `step` that are on screen; when none are, every
/// `ceil(n / max_ticks)`-th visible longitude.
pub fn longitude_ticks(current: &[i32], step: i32, max_ticks: usize) -> Vec<i32> {
    if step > 0 {
        let desired: Vec<i32> = (SEAM_WEST..=SEAM_EAST)
            .step_by(step as usize)
            .filter(|lon| current.contains(lon))
            .collect();
        if !desired.is_empty() {
            return desired;
        }
    }

    let every = current.len().div_ceil(max_ticks.max(1)).max(1);
    current.iter().step_by(every).copied().collect()
}

/// Decade tick values: one per visible decade
pub fn decade_ticks(current: &[i32]) -> Vec<i32> {
    current.to_vec()
}
