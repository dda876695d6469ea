use crate::theme::Theme;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutConfig {
    pub room_height: i32,
    pub text_padding: i32,
    pub arrow_radius: i32,
    pub room_spacing_x: i32,
    pub room_spacing_y: i32,
    pub room_stroke_width: f32,
    pub connection_stroke_width: f32,
    pub hint_stroke_width: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            room_height: 32,
            text_padding: 8,
            arrow_radius: 8,
            room_spacing_x: 32,
            room_spacing_y: 32,
            room_stroke_width: 2.0,
            connection_stroke_width: 2.0,
            hint_stroke_width: 1.0,
        }
    }
}

/// Concrete faces the CSS generic families resolve to, for both text
/// measurement and rasterization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GenericFamilies {
    pub sans_serif: String,
    pub serif: String,
    pub monospace: String,
}

impl Default for GenericFamilies {
    fn default() -> Self {
        Self {
            sans_serif: "DejaVu Sans".to_string(),
            serif: "DejaVu Serif".to_string(),
            monospace: "DejaVu Sans Mono".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Face `sans-serif` resolves to; also usvg's default family.
    pub font_family: String,
    pub serif_family: String,
    pub monospace_family: String,
    pub load_system_fonts: bool,
}

impl RenderConfig {
    pub fn generic_families(&self) -> GenericFamilies {
        GenericFamilies {
            sans_serif: self.font_family.clone(),
            serif: self.serif_family.clone(),
            monospace: self.monospace_family.clone(),
        }
    }
}

impl Default for RenderConfig {
    fn default() -> Self {
        let families = GenericFamilies::default();
        Self {
            font_family: families.sans_serif,
            serif_family: families.serif,
            monospace_family: families.monospace,
            load_system_fonts: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub theme: Theme,
    pub layout: LayoutConfig,
    pub render: RenderConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            theme: Theme::classic(),
            layout: LayoutConfig::default(),
            render: RenderConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ThemeVariables {
    font_family: Option<String>,
    font_size: Option<f32>,
    background: Option<String>,
    line_color: Option<String>,
    text_color: Option<String>,
    selected_color: Option<String>,
    exit_to_other_area_color: Option<String>,
    obstacle_color: Option<String>,
    non_straight_color: Option<String>,
    intersection_color: Option<String>,
    long_connection_color: Option<String>,
    force_mark_color: Option<String>,
    arrow_fill: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LayoutConfigFile {
    room_height: Option<i32>,
    text_padding: Option<i32>,
    arrow_radius: Option<i32>,
    room_spacing_x: Option<i32>,
    room_spacing_y: Option<i32>,
    room_stroke_width: Option<f32>,
    connection_stroke_width: Option<f32>,
    hint_stroke_width: Option<f32>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct RenderConfigFile {
    font_family: Option<String>,
    serif_family: Option<String>,
    monospace_family: Option<String>,
    load_system_fonts: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    theme: Option<String>,
    theme_variables: Option<ThemeVariables>,
    layout: Option<LayoutConfigFile>,
    render: Option<RenderConfigFile>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parses a config document (JSON, or JSON5 as a fallback) over the defaults.
pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = match serde_json::from_str(contents) {
        Ok(parsed) => parsed,
        Err(json_err) => json5::from_str(contents)
            .map_err(|_| anyhow::anyhow!("invalid config file: {json_err}"))?,
    };

    let mut config = Config::default();

    if let Some(theme_name) = parsed.theme.as_deref() {
        match theme_name {
            "modern" => config.theme = Theme::modern(),
            "classic" | "default" => config.theme = Theme::classic(),
            other => anyhow::bail!("unknown theme `{other}`"),
        }
    }

    if let Some(vars) = parsed.theme_variables {
        if let Some(v) = vars.font_family {
            config.theme.font_family = v;
        }
        if let Some(v) = vars.font_size {
            config.theme.font_size = v;
        }
        if let Some(v) = vars.background {
            config.theme.background = v;
        }
        if let Some(v) = vars.line_color {
            config.theme.line_color = v;
        }
        if let Some(v) = vars.text_color {
            config.theme.text_color = v;
        }
        if let Some(v) = vars.selected_color {
            config.theme.selected_color = v;
        }
        if let Some(v) = vars.exit_to_other_area_color {
            config.theme.exit_to_other_area_color = v;
        }
        if let Some(v) = vars.obstacle_color {
            config.theme.obstacle_color = v;
        }
        if let Some(v) = vars.non_straight_color {
            config.theme.non_straight_color = v;
        }
        if let Some(v) = vars.intersection_color {
            config.theme.intersection_color = v;
        }
        if let Some(v) = vars.long_connection_color {
            config.theme.long_connection_color = v;
        }
        if let Some(v) = vars.force_mark_color {
            config.theme.force_mark_color = v;
        }
        if let Some(v) = vars.arrow_fill {
            config.theme.arrow_fill = v;
        }
    }

    if let Some(layout) = parsed.layout {
        if let Some(v) = layout.room_height {
            config.layout.room_height = v;
        }
        if let Some(v) = layout.text_padding {
            config.layout.text_padding = v;
        }
        if let Some(v) = layout.arrow_radius {
            config.layout.arrow_radius = v;
        }
        if let Some(v) = layout.room_spacing_x {
            config.layout.room_spacing_x = v;
        }
        if let Some(v) = layout.room_spacing_y {
            config.layout.room_spacing_y = v;
        }
        if let Some(v) = layout.room_stroke_width {
            config.layout.room_stroke_width = v;
        }
        if let Some(v) = layout.connection_stroke_width {
            config.layout.connection_stroke_width = v;
        }
        if let Some(v) = layout.hint_stroke_width {
            config.layout.hint_stroke_width = v;
        }
    }

    if config.layout.room_height <= 0
        || config.layout.room_spacing_x <= 0
        || config.layout.room_spacing_y <= 0
    {
        anyhow::bail!("room height and spacing must be positive");
    }

    if let Some(render) = parsed.render {
        if let Some(v) = render.font_family {
            config.render.font_family = v;
        }
        if let Some(v) = render.serif_family {
            config.render.serif_family = v;
        }
        if let Some(v) = render.monospace_family {
            config.render.monospace_family = v;
        }
        if let Some(v) = render.load_system_fonts {
            config.render.load_system_fonts = v;
        }
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = load_config(None).unwrap();
        assert_eq!(config.layout.room_height, 32);
        assert_eq!(config.layout.room_spacing_x, 32);
        assert_eq!(config.theme.line_color, "#000000");
    }

    #[test]
    fn overlays_partial_file() {
        let config = parse_config(
            r##"{"theme": "modern", "themeVariables": {"lineColor": "#123456"},
                "layout": {"roomSpacingX": 48}}"##,
        )
        .unwrap();
        assert_eq!(config.theme.line_color, "#123456");
        assert_eq!(config.theme.font_size, 13.0);
        assert_eq!(config.layout.room_spacing_x, 48);
        assert_eq!(config.layout.room_spacing_y, 32);
    }

    #[test]
    fn render_families_overlay() {
        let config = parse_config(r#"{"render": {"fontFamily": "Liberation Sans"}}"#).unwrap();
        let families = config.render.generic_families();
        assert_eq!(families.sans_serif, "Liberation Sans");
        assert_eq!(families.serif, "DejaVu Serif");
        assert_eq!(families.monospace, "DejaVu Sans Mono");
    }

    #[test]
    fn accepts_json5() {
        let config = parse_config("{ layout: { textPadding: 4, }, // trailing\n }").unwrap();
        assert_eq!(config.layout.text_padding, 4);
    }

    #[test]
    fn rejects_non_positive_spacing() {
        assert!(parse_config(r#"{"layout": {"roomSpacingY": 0}}"#).is_err());
        assert!(parse_config(r#"{"theme": "neon"}"#).is_err());
    }
}
