use crate::ir::DeviceTier;

#[derive(Debug, Clone, PartialEq)]
pub struct TierPalette {
    pub stroke: String,
    pub fill: String,
}

impl TierPalette {
    fn new(stroke: &str, fill: &str) -> Self {
        Self {
            stroke: stroke.to_string(),
            fill: fill.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Theme {
    pub font_family: String,
    pub font_size: f32,
    pub title_color: String,
    pub text_color: String,
    pub muted_text_color: String,
    pub background: String,
    pub grid_color: String,
    pub cpe: TierPalette,
    pub wan: TierPalette,
    pub fw: TierPalette,
    pub fw_unit_fill: String,
    pub cloud_fill_start: String,
    pub cloud_fill_end: String,
    pub cloud_stroke: String,
    pub link_color: String,
    pub active_color: String,
    pub tooltip_background: String,
    pub tooltip_text_color: String,
    pub legend_background: String,
    pub legend_border: String,
}

impl Theme {
    pub fn classic() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 14.0,
            title_color: "#1f2937".to_string(),
            text_color: "#374151".to_string(),
            muted_text_color: "#6b7280".to_string(),
            background: "#ffffff".to_string(),
            grid_color: "#eeeeee".to_string(),
            cpe: TierPalette::new("#10b981", "#ecfdf5"),
            wan: TierPalette::new("#0ea5e9", "#eff6ff"),
            fw: TierPalette::new("#fb923c", "#fff7ed"),
            fw_unit_fill: "#fed7aa".to_string(),
            cloud_fill_start: "#f8fafc".to_string(),
            cloud_fill_end: "#eef2ff".to_string(),
            cloud_stroke: "#c7d2fe".to_string(),
            link_color: "#1f2937".to_string(),
            active_color: "#6366f1".to_string(),
            tooltip_background: "#111827".to_string(),
            tooltip_text_color: "#f9fafb".to_string(),
            legend_background: "#ffffff".to_string(),
            legend_border: "#e5e7eb".to_string(),
        }
    }

    pub fn high_contrast() -> Self {
        Self {
            font_family: "Inter, Segoe UI, system-ui, -apple-system, sans-serif".to_string(),
            font_size: 15.0,
            title_color: "#000000".to_string(),
            text_color: "#000000".to_string(),
            muted_text_color: "#1f2937".to_string(),
            background: "#ffffff".to_string(),
            grid_color: "#d1d5db".to_string(),
            cpe: TierPalette::new("#047857", "#d1fae5"),
            wan: TierPalette::new("#0369a1", "#dbeafe"),
            fw: TierPalette::new("#c2410c", "#ffedd5"),
            fw_unit_fill: "#fdba74".to_string(),
            cloud_fill_start: "#ffffff".to_string(),
            cloud_fill_end: "#e0e7ff".to_string(),
            cloud_stroke: "#4338ca".to_string(),
            link_color: "#000000".to_string(),
            active_color: "#db2777".to_string(),
            tooltip_background: "#000000".to_string(),
            tooltip_text_color: "#ffffff".to_string(),
            legend_background: "#ffffff".to_string(),
            legend_border: "#000000".to_string(),
        }
    }

    pub fn palette(&self, tier: DeviceTier) -> &TierPalette {
        match tier {
            DeviceTier::Cpe => &self.cpe,
            DeviceTier::Wan => &self.wan,
            DeviceTier::Fw => &self.fw,
        }
    }

    pub fn palette_mut(&mut self, tier: DeviceTier) -> &mut TierPalette {
        match tier {
            DeviceTier::Cpe => &mut self.cpe,
            DeviceTier::Wan => &mut self.wan,
            DeviceTier::Fw => &mut self.fw,
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}
