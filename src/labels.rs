//! Static label and recommendation tables. Output index `i` of a classifier
//! maps to entry `i` of the matching class table.

pub const SOIL_CLASSES: [&str; 8] = [
    "alluvial",
    "black",
    "chalky",
    "clay soil",
    "mary",
    "red",
    "sand",
    "slit",
];

pub const PEST_CLASSES: [&str; 7] = [
    "aphid",
    "armyworm",
    "beetle",
    "mite",
    "sawfly",
    "stemborer",
    "stemfly",
];

pub const DEFAULT_RECOMMENDATION: &str = "General soil maintenance recommended";

// Keyed by soil class name. "mary" has no entry here; lookups for it fall
// back to the default text.
const SOIL_RECOMMENDATIONS: &[(&str, &[&str])] = &[
    (
        "alluvial",
        &[
            "Suitable for crops like rice, wheat, sugarcane, and cotton",
            "Ensure proper irrigation for deep-rooted crops",
        ],
    ),
    (
        "black",
        &[
            "Great for cotton cultivation",
            "Use organic matter to retain moisture",
            "Avoid over-irrigation",
        ],
    ),
    (
        "chalky",
        &[
            "Best for crops like barley and oats",
            "Add organic matter to improve fertility",
            "Use cover crops to prevent erosion",
        ],
    ),
    (
        "clay soil",
        &[
            "Add organic matter to improve drainage",
            "Use raised beds for better root growth",
            "Avoid working soil when wet",
        ],
    ),
    (
        "slit",
        &[
            "Avoid compaction by minimizing foot traffic",
            "Add organic matter to improve structure",
            "Use cover crops to prevent erosion",
        ],
    ),
    (
        "red",
        &[
            "Add fertilizers and organic compost",
            "Best for pulses and groundnut",
            "Requires proper water management",
        ],
    ),
    (
        "sand",
        &[
            "Add organic matter to improve water retention",
            "Use mulch to reduce water evaporation",
            "Frequent light fertilization",
        ],
    ),
];

/// Advisory text for a soil class, falling back to a single generic line
/// when the class has no dedicated entry.
pub fn recommendations_for(soil_type: &str) -> Vec<String> {
    SOIL_RECOMMENDATIONS
        .iter()
        .find(|(name, _)| *name == soil_type)
        .map(|(_, tips)| tips.iter().map(|tip| tip.to_string()).collect())
        .unwrap_or_else(|| vec![DEFAULT_RECOMMENDATION.to_string()])
}
