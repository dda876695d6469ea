use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub background: String,
    pub line_color: String,
    pub text_color: String,
    pub selected_color: String,
    pub exit_to_other_area_color: String,
    pub obstacle_color: String,
    pub non_straight_color: String,
    pub intersection_color: String,
    pub long_connection_color: String,
    pub force_mark_color: String,
    pub arrow_fill: String,
}

impl Theme {
    /// Black-on-white palette with saturated issue colors.
    pub fn classic() -> Self {
        Self {
            font_family: "sans-serif".to_string(),
            font_size: 12.0,
            background: "#FFFFFF".to_string(),
            line_color: "#000000".to_string(),
            text_color: "#000000".to_string(),
            selected_color: "#008000".to_string(),
            exit_to_other_area_color: "#0000FF".to_string(),
            obstacle_color: "#FF0000".to_string(),
            non_straight_color: "#FFFF00".to_string(),
            intersection_color: "#FF00FF".to_string(),
            long_connection_color: "#008000".to_string(),
            force_mark_color: "#006400".to_string(),
            arrow_fill: "#FFFFFF".to_string(),
        }
    }

    pub fn modern() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 13.0,
            background: "#FFFFFF".to_string(),
            line_color: "#1C2430".to_string(),
            text_color: "#1C2430".to_string(),
            selected_color: "#2E9E5B".to_string(),
            exit_to_other_area_color: "#2F6FDB".to_string(),
            obstacle_color: "#E5484D".to_string(),
            non_straight_color: "#F5B700".to_string(),
            intersection_color: "#C2298A".to_string(),
            long_connection_color: "#2E9E5B".to_string(),
            force_mark_color: "#1F5C3A".to_string(),
            arrow_fill: "#FFFFFF".to_string(),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
