use chrono::{DateTime, Utc};

#[must_use]
pub fn format_datetime(value: DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.1}")
}

/// Signed, one decimal: `+1.5`, `-0.3`, `0.0`.
#[must_use]
pub fn format_delta(delta: f64) -> String {
    if delta > 0.0 {
        format!("+{delta:.1}")
    } else if delta < 0.0 {
        format!("{delta:.1}")
    } else {
        "0.0".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wheel_core::time::fixed_now;

    #[test]
    fn formats_are_stable() {
        assert_eq!(format_datetime(fixed_now()), "2024-03-01 09:00");
        assert_eq!(format_score(7.8), "7.8");
        assert_eq!(format_delta(1.5), "+1.5");
        assert_eq!(format_delta(-0.3), "-0.3");
        assert_eq!(format_delta(0.0), "0.0");
    }
}
