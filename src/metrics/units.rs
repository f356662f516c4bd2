//! Human-scaled magnitudes ("12.30 MB/s") by repeated division

/// Step between consecutive unit labels.
pub const UNIT_STEP: f64 = 1024.0;

/// Network throughput labels, smallest first. Inputs are kilobits.
pub const NETWORK_SPEED_UNITS: &[&str] = &["Kbps", "Mbps", "Gbps"];

/// Disk throughput labels, smallest first. Inputs are kilobytes.
pub const DISK_SPEED_UNITS: &[&str] = &["KB/s", "MB/s", "GB/s"];

/// Rescale `magnitude` into the largest unit of `units` that keeps it under
/// [`UNIT_STEP`].
///
/// A magnitude equal to the step moves up (`1024 K` reads as `1 M`): the
/// comparison is `>=`, not the strict `>` that "under" would suggest. Once
/// the last label is reached the value saturates there, however large it is.
/// An empty label list returns the magnitude untouched with an empty label.
pub fn scale<'a>(magnitude: f64, units: &[&'a str]) -> (f64, &'a str) {
    let mut value = magnitude;
    let mut index = 0;

    if units.is_empty() {
        return (value, "");
    }

    while value >= UNIT_STEP && index + 1 < units.len() {
        value /= UNIT_STEP;
        index += 1;
    }

    (value, units[index])
}

#[cfg(test)]
mod tests {
    use super::*;

    const KMG: &[&str] = &["K", "M", "G"];

    #[test]
    fn test_boundary_moves_to_next_unit() {
        assert_eq!(scale(1024.0, KMG), (1.0, "M"));
        assert_eq!(scale(1023.999, KMG), (1023.999, "K"));
    }

    #[test]
    fn test_recurses_across_units() {
        let (value, unit) = scale(3.0 * 1024.0 * 1024.0, KMG);
        assert_eq!(unit, "G");
        assert!((value - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_saturates_at_last_unit() {
        let (value, unit) = scale(5000.0 * 1024.0 * 1024.0, KMG);
        assert_eq!(unit, "G");
        assert!((value - 5000.0).abs() < 1e-9);
    }

    #[test]
    fn test_small_and_empty() {
        assert_eq!(scale(0.0, KMG), (0.0, "K"));
        assert_eq!(scale(2048.0, &[]), (2048.0, ""));
    }
}
