//! Display transforms for keypoint data. The stored model keeps raw values.

use crate::model::Landmark;

/// `LEFT_KNEE` / `left_knee` -> `left knee`.
pub fn landmark_label(name: &str) -> String {
    name.replace('_', " ").to_lowercase()
}

/// Visibility in [0, 1] as a rounded percentage, clamped for out-of-range input.
pub fn visibility_percent(visibility: f64) -> u32 {
    (visibility.clamp(0.0, 1.0) * 100.0).round() as u32
}

pub fn landmark_line(l: &Landmark) -> String {
    format!(
        "{:<16} x {:.3}  y {:.3}  visibility {}%",
        landmark_label(&l.name),
        l.x,
        l.y,
        visibility_percent(l.visibility)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_replace_underscores() {
        assert_eq!(landmark_label("left_knee"), "left knee");
        assert_eq!(landmark_label("RIGHT_FOOT_INDEX"), "right foot index");
    }

    #[test]
    fn visibility_rounds_to_whole_percent() {
        assert_eq!(visibility_percent(0.92), 92);
        assert_eq!(visibility_percent(0.0049), 0);
        assert_eq!(visibility_percent(1.7), 100);
    }

    #[test]
    fn line_contains_label_and_percent() {
        let l = Landmark {
            name: "left_knee".into(),
            x: 0.4,
            y: 0.6,
            visibility: 0.92,
        };
        let line = landmark_line(&l);
        assert!(line.starts_with("left knee"));
        assert!(line.ends_with("visibility 92%"));
    }
}
