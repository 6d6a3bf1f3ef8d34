use crate::model::Category;
use serde::{Deserialize, Serialize};

/// Which quadrant the two off-diagonal flag combinations land in.
///
/// `Standard` files a task under the label that matches its flags.
/// `Transposed` swaps the off-diagonal cases and swaps the axis headers with
/// them, so the matrix reads importance across rows and urgency across
/// columns while each category keeps its screen position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum QuadrantMapping {
    #[default]
    Standard,
    Transposed,
}

/// Header text for the matrix: columns left to right, rows top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLabels {
    pub columns: [&'static str; 2],
    pub rows: [&'static str; 2],
}

impl QuadrantMapping {
    pub fn classify(&self, urgent: bool, important: bool) -> Category {
        match (self, urgent, important) {
            (_, true, true) => Category::UrgentImportant,
            (_, false, false) => Category::NotUrgentNotImportant,
            (QuadrantMapping::Standard, true, false) => Category::UrgentNotImportant,
            (QuadrantMapping::Standard, false, true) => Category::NotUrgentImportant,
            (QuadrantMapping::Transposed, true, false) => Category::NotUrgentImportant,
            (QuadrantMapping::Transposed, false, true) => Category::UrgentNotImportant,
        }
    }

    pub fn axis_labels(&self) -> AxisLabels {
        match self {
            QuadrantMapping::Standard => AxisLabels {
                columns: ["Important", "Not Important"],
                rows: ["Urgent", "Not Urgent"],
            },
            QuadrantMapping::Transposed => AxisLabels {
                columns: ["Urgent", "Not Urgent"],
                rows: ["Important", "Not Important"],
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            QuadrantMapping::Standard => "standard",
            QuadrantMapping::Transposed => "transposed",
        }
    }
}
