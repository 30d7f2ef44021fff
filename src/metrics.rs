//! Mocked performance metrics shown next to the analysis.
//!
//! This is static presentation data; nothing here is computed from keypoints.

pub struct PerformanceMetric {
    pub label: &'static str,
    pub percent: u8,
}

pub const PERFORMANCE_METRICS: &[PerformanceMetric] = &[
    PerformanceMetric {
        label: "Balance",
        percent: 82,
    },
    PerformanceMetric {
        label: "Knee alignment",
        percent: 74,
    },
    PerformanceMetric {
        label: "Hip mobility",
        percent: 68,
    },
    PerformanceMetric {
        label: "Symmetry",
        percent: 79,
    },
    PerformanceMetric {
        label: "Stability",
        percent: 71,
    },
];

pub const RECOMMENDATIONS: &[&str] = &[
    "Keep the knees tracking over the toes during the descent.",
    "Slow down the eccentric phase to improve control.",
    "Add single-leg balance drills to even out left/right symmetry.",
];
