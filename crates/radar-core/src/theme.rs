//! Design-system colors and score tiers.
//!
//! Pure lookups mirroring the Compliance Radar design tokens: severity,
//! scan-status, and regulation colors, score tiers, and the light/dark
//! palettes. Regulation codes outside the known set fall back to a
//! neutral gray.

use serde::{Deserialize, Serialize};

use crate::types::{ScanStatus, Severity};

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

/// Fallback for unrecognised regulation codes.
pub const NEUTRAL_GRAY: Rgb = Rgb(0x61, 0x61, 0x61);

/// Display color for a finding severity.
pub const fn severity_color(severity: Severity) -> Rgb {
    match severity {
        Severity::Critical => Rgb(0xD3, 0x2F, 0x2F),
        Severity::High => Rgb(0xF4, 0x43, 0x36),
        Severity::Medium => Rgb(0xFF, 0x98, 0x00),
        Severity::Low => Rgb(0xFF, 0xC1, 0x07),
        Severity::Info => Rgb(0x21, 0x96, 0xF3),
    }
}

/// Display color for a scan status.
pub const fn status_color(status: ScanStatus) -> Rgb {
    match status {
        ScanStatus::Pending => Rgb(0xFF, 0xA7, 0x26),
        ScanStatus::Running => Rgb(0x42, 0xA5, 0xF5),
        ScanStatus::Completed => Rgb(0x66, 0xBB, 0x6A),
        ScanStatus::Failed => Rgb(0xEF, 0x53, 0x50),
    }
}

/// Display color for a regulation code; neutral gray when unrecognised.
pub fn regulation_color(code: &str) -> Rgb {
    match code {
        "NIS2" => Rgb(0x19, 0x76, 0xD2),
        "ISO27001" => Rgb(0x7B, 0x1F, 0xA2),
        "DORA" => Rgb(0x00, 0x89, 0x7B),
        "RGPD" => Rgb(0x5E, 0x35, 0xB1),
        "HDS" => Rgb(0xE6, 0x4A, 0x19),
        "SecNumCloud" => Rgb(0x02, 0x77, 0xBD),
        "NIST" => Rgb(0x6A, 0x1B, 0x9A),
        "TOGAF" => Rgb(0x00, 0x79, 0x6B),
        _ => NEUTRAL_GRAY,
    }
}

// ── Score tiers ───────────────────────────────────────────────────

/// Qualitative tier of a conformity score in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreTier {
    /// score >= 0.8
    Good,
    /// 0.6 <= score < 0.8
    Warning,
    /// score < 0.6
    Critical,
}

impl ScoreTier {
    pub fn for_score(score: f64) -> Self {
        if score >= 0.8 {
            ScoreTier::Good
        } else if score >= 0.6 {
            ScoreTier::Warning
        } else {
            ScoreTier::Critical
        }
    }

    /// Tier color under the given palette.
    pub const fn color(self, palette: &Palette) -> Rgb {
        match self {
            ScoreTier::Good => palette.success,
            ScoreTier::Warning => palette.warning,
            ScoreTier::Critical => palette.error,
        }
    }
}

/// Render a `[0.0, 1.0]` score as a rounded percentage, e.g. `0.85` → `"85%"`.
pub fn format_score(score: f64) -> String {
    format!("{}%", (score * 100.0).round() as i64)
}

// ── Palettes ──────────────────────────────────────────────────────

/// Light/dark display mode. The preference persists across sessions;
/// absence of a stored value defaults to light.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Light,
    Dark,
}

impl Mode {
    pub const fn toggled(self) -> Self {
        match self {
            Mode::Light => Mode::Dark,
            Mode::Dark => Mode::Light,
        }
    }
}

/// Fixed palette derived from the display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    pub mode: Mode,
    pub primary: Rgb,
    pub secondary: Rgb,
    pub error: Rgb,
    pub warning: Rgb,
    pub success: Rgb,
    pub info: Rgb,
    pub background: Rgb,
    pub surface: Rgb,
    pub text: Rgb,
    pub text_secondary: Rgb,
}

impl Palette {
    pub const fn for_mode(mode: Mode) -> Self {
        match mode {
            Mode::Light => Palette {
                mode,
                primary: Rgb(0x19, 0x76, 0xD2),
                secondary: Rgb(0x7B, 0x1F, 0xA2),
                error: Rgb(0xD3, 0x2F, 0x2F),
                warning: Rgb(0xFF, 0x98, 0x00),
                success: Rgb(0x38, 0x8E, 0x3C),
                info: Rgb(0x02, 0x88, 0xD1),
                background: Rgb(0xF5, 0xF5, 0xF5),
                surface: Rgb(0xFF, 0xFF, 0xFF),
                text: Rgb(0x21, 0x21, 0x21),
                text_secondary: Rgb(0x61, 0x61, 0x61),
            },
            Mode::Dark => Palette {
                mode,
                primary: Rgb(0x42, 0xA5, 0xF5),
                secondary: Rgb(0xBA, 0x68, 0xC8),
                error: Rgb(0xEF, 0x53, 0x50),
                warning: Rgb(0xFF, 0xB7, 0x4D),
                success: Rgb(0x66, 0xBB, 0x6A),
                info: Rgb(0x29, 0xB6, 0xF6),
                background: Rgb(0x12, 0x12, 0x12),
                surface: Rgb(0x1E, 0x1E, 0x1E),
                text: Rgb(0xE0, 0xE0, 0xE0),
                text_secondary: Rgb(0x9E, 0x9E, 0x9E),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_colors_match_design_tokens() {
        assert_eq!(severity_color(Severity::Critical), Rgb(0xD3, 0x2F, 0x2F));
        assert_eq!(severity_color(Severity::High), Rgb(0xF4, 0x43, 0x36));
        assert_eq!(severity_color(Severity::Medium), Rgb(0xFF, 0x98, 0x00));
        assert_eq!(severity_color(Severity::Low), Rgb(0xFF, 0xC1, 0x07));
        assert_eq!(severity_color(Severity::Info), Rgb(0x21, 0x96, 0xF3));
    }

    #[test]
    fn status_colors_match_design_tokens() {
        assert_eq!(status_color(ScanStatus::Pending), Rgb(0xFF, 0xA7, 0x26));
        assert_eq!(status_color(ScanStatus::Running), Rgb(0x42, 0xA5, 0xF5));
        assert_eq!(status_color(ScanStatus::Completed), Rgb(0x66, 0xBB, 0x6A));
        assert_eq!(status_color(ScanStatus::Failed), Rgb(0xEF, 0x53, 0x50));
    }

    #[test]
    fn unknown_regulation_falls_back_to_gray() {
        assert_eq!(regulation_color("NIS2"), Rgb(0x19, 0x76, 0xD2));
        assert_eq!(regulation_color("SecNumCloud"), Rgb(0x02, 0x77, 0xBD));
        assert_eq!(regulation_color("SOX"), NEUTRAL_GRAY);
        assert_eq!(regulation_color(""), NEUTRAL_GRAY);
    }

    #[test]
    fn score_tiers_at_documented_boundaries() {
        assert_eq!(ScoreTier::for_score(0.85), ScoreTier::Good);
        assert_eq!(ScoreTier::for_score(0.80), ScoreTier::Good);
        assert_eq!(ScoreTier::for_score(0.79), ScoreTier::Warning);
        assert_eq!(ScoreTier::for_score(0.65), ScoreTier::Warning);
        assert_eq!(ScoreTier::for_score(0.60), ScoreTier::Warning);
        assert_eq!(ScoreTier::for_score(0.40), ScoreTier::Critical);
        assert_eq!(ScoreTier::for_score(0.0), ScoreTier::Critical);
    }

    #[test]
    fn scores_render_as_rounded_percentages() {
        assert_eq!(format_score(0.85), "85%");
        assert_eq!(format_score(0.65), "65%");
        assert_eq!(format_score(0.40), "40%");
        assert_eq!(format_score(0.876), "88%");
        assert_eq!(format_score(0.0), "0%");
        assert_eq!(format_score(1.0), "100%");
    }

    #[test]
    fn toggling_mode_twice_is_identity() {
        let mode = Mode::Light;
        assert_eq!(mode.toggled().toggled(), mode);
        assert_eq!(Palette::for_mode(mode.toggled().toggled()), Palette::for_mode(mode));
    }

    #[test]
    fn palettes_differ_by_mode() {
        let light = Palette::for_mode(Mode::Light);
        let dark = Palette::for_mode(Mode::Dark);
        assert_eq!(light.background, Rgb(0xF5, 0xF5, 0xF5));
        assert_eq!(dark.background, Rgb(0x12, 0x12, 0x12));
        assert_eq!(dark.surface, Rgb(0x1E, 0x1E, 0x1E));
        assert_ne!(light.primary, dark.primary);
    }

    #[test]
    fn tier_color_tracks_palette() {
        let light = Palette::for_mode(Mode::Light);
        assert_eq!(ScoreTier::Good.color(&light), light.success);
        assert_eq!(ScoreTier::Warning.color(&light), light.warning);
        assert_eq!(ScoreTier::Critical.color(&light), light.error);
    }
}
