//! Wet/dry classification and the hover label drawn over chart points

use serde::Serialize;

/// Readings above this are dry
pub const DRY_THRESHOLD: f64 = 20000.0;
pub const Y_MIN: f64 = 0.0;
pub const Y_MAX: f64 = 30000.0;

/// Pixels between a point and its hover label
const LABEL_OFFSET: i32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Moisture {
    Wet,
    Dry,
}

impl Moisture {
    pub fn label(self) -> &'static str {
        match self {
            Self::Wet => "Wet",
            Self::Dry => "Dry",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Self::Wet => "blue",
            Self::Dry => "red",
        }
    }
}

/// `Dry` strictly above the threshold, `Wet` otherwise
pub fn classify(value: f64) -> Moisture {
    if value > DRY_THRESHOLD {
        Moisture::Dry
    } else {
        Moisture::Wet
    }
}

/// Label shown while the pointer hovers one plotted point
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoverLabel {
    pub display_index: usize,
    pub timestamp: String,
    pub value: f64,
    pub moisture: Moisture,
    /// Backend coordinates of the point itself
    pub x: i32,
    pub y: i32,
}

impl HoverLabel {
    pub fn new(display_index: usize, timestamp: &str, value: f64, at: (i32, i32)) -> Self {
        Self {
            display_index,
            timestamp: timestamp.to_string(),
            value,
            moisture: classify(value),
            x: at.0,
            y: at.1,
        }
    }

    /// Where the text baseline goes, just above the point
    pub fn label_position(&self) -> (i32, i32) {
        (self.x, self.y - LABEL_OFFSET)
    }

    pub fn to_svg(&self) -> String {
        let (lx, ly) = self.label_position();
        format!(
            "<g class=\"hover-point\"><circle cx=\"{x}\" cy=\"{y}\" r=\"6\" fill=\"transparent\"/>\
             <title>{title}</title>\
             <text class=\"hover-label\" x=\"{lx}\" y=\"{ly}\" text-anchor=\"middle\" \
             font-family=\"Arial\" font-weight=\"bold\" font-size=\"10\" fill=\"{color}\">{label}</text></g>",
            x = self.x,
            y = self.y,
            title = crate::shared::escape_xml(&format!("{} ({})", self.timestamp, self.value)),
            lx = lx,
            ly = ly,
            color = self.moisture.color(),
            label = self.moisture.label(),
        )
    }
}

/// CSS that keeps labels hidden until their point is hovered
pub const HOVER_STYLE: &str =
    ".hover-label{visibility:hidden}.hover-point:hover .hover-label{visibility:visible}";
