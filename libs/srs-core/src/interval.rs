//! Human-readable interval formatting.

/// Format a day count for display ("1 day", "2 wk 3 d", "1 mo", ...).
pub fn format_interval(days: u32) -> String {
    match days {
        1 => "1 day".to_string(),
        d if d < 7 => format!("{d} days"),
        d if d < 30 => {
            let weeks = d / 7;
            let rest = d % 7;
            if rest == 0 {
                format!("{weeks} wk")
            } else {
                format!("{weeks} wk {rest} d")
            }
        }
        d if d < 365 => {
            let months = d / 30;
            let rest = d % 30;
            if rest == 0 {
                format!("{months} mo")
            } else {
                format!("{months} mo {rest} d")
            }
        }
        d => {
            let years = d / 365;
            let rest = d % 365;
            if rest == 0 {
                format!("{years} yr")
            } else {
                format!("{years} yr {rest} d")
            }
        }
    }
}
