// SPDX-License-Identifier: PMPL-1.0-or-later

//! Locale-specific drawing presets.
//!
//! A preset bundles the text-rendering attributes a draw sink needs (font,
//! alignment, color, transforms, wrapping). The engine only stores and hands
//! these out; it never draws. Presets are keyed by name within a locale, and
//! a name missing from one locale falls back to the default locale's preset.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HAlign {
    #[default]
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VAlign {
    #[default]
    Top,
    Middle,
    Bottom,
}

/// Solid color or a 4-point gradient (one 0xRRGGBB value per corner).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorSpec {
    Solid(u32),
    Gradient([u32; 4]),
}

/// Text-drawing attributes for one preset name in one locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawingPreset {
    /// Host font handle by name. `None` leaves the sink's current font.
    pub font: Option<String>,
    pub halign: HAlign,
    pub valign: VAlign,
    pub color: Option<ColorSpec>,
    pub scale: f32,
    /// Degrees.
    pub rotation: f32,
    /// Opacity in `0.0..=1.0`; clamped on construction and update.
    pub alpha: f32,
    /// Line separation; `-1.0` means the font's default.
    pub sep: f32,
    /// Wrap width; `None` means unbounded.
    pub width: Option<f32>,
    /// Marks a base preset meant for per-locale specialization rather than
    /// direct use.
    pub is_template: bool,
}

impl Default for DrawingPreset {
    fn default() -> Self {
        Self {
            font: None,
            halign: HAlign::Left,
            valign: VAlign::Top,
            color: None,
            scale: 1.0,
            rotation: 0.0,
            alpha: 1.0,
            sep: -1.0,
            width: None,
            is_template: false,
        }
    }
}

impl DrawingPreset {
    pub fn with_font(font: impl Into<String>) -> Self {
        Self {
            font: Some(font.into()),
            ..Self::default()
        }
    }

    /// Clone a template as a directly usable preset.
    pub fn specialized(&self) -> Self {
        Self {
            is_template: false,
            ..self.clone()
        }
    }

    /// Read one field by selector, for hosts that address preset data
    /// dynamically instead of destructuring the struct.
    pub fn field(&self, field: PresetField) -> PresetValue {
        match field {
            PresetField::Font => PresetValue::Font(self.font.clone()),
            PresetField::HAlign => PresetValue::HAlign(self.halign),
            PresetField::VAlign => PresetValue::VAlign(self.valign),
            PresetField::Color => PresetValue::Color(self.color),
            PresetField::Scale => PresetValue::Scale(self.scale),
            PresetField::Rotation => PresetValue::Rotation(self.rotation),
            PresetField::Alpha => PresetValue::Alpha(self.alpha),
            PresetField::Sep => PresetValue::Sep(self.sep),
            PresetField::Width => PresetValue::Width(self.width),
            PresetField::Template => PresetValue::Template(self.is_template),
        }
    }

    /// Apply a batch of single-field updates.
    pub fn apply(&mut self, updates: &[PresetUpdate]) {
        for update in updates {
            match update {
                PresetUpdate::Font(font) => self.font = Some(font.clone()),
                PresetUpdate::HAlign(halign) => self.halign = *halign,
                PresetUpdate::VAlign(valign) => self.valign = *valign,
                PresetUpdate::Color(color) => self.color = Some(*color),
                PresetUpdate::Scale(scale) => self.scale = *scale,
                PresetUpdate::Rotation(rotation) => self.rotation = *rotation,
                PresetUpdate::Alpha(alpha) => self.alpha = alpha.clamp(0.0, 1.0),
                PresetUpdate::Sep(sep) => self.sep = *sep,
                PresetUpdate::Width(width) => self.width = *width,
                PresetUpdate::Template(flag) => self.is_template = *flag,
            }
        }
    }
}

/// Field selector for [`DrawingPreset::field`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresetField {
    Font,
    HAlign,
    VAlign,
    Color,
    Scale,
    Rotation,
    Alpha,
    Sep,
    Width,
    Template,
}

/// One field value as returned by [`DrawingPreset::field`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresetValue {
    Font(Option<String>),
    HAlign(HAlign),
    VAlign(VAlign),
    Color(Option<ColorSpec>),
    Scale(f32),
    Rotation(f32),
    Alpha(f32),
    Sep(f32),
    Width(Option<f32>),
    Template(bool),
}

/// One field update for [`DrawingPreset::apply`].
#[derive(Debug, Clone, PartialEq)]
pub enum PresetUpdate {
    Font(String),
    HAlign(HAlign),
    VAlign(VAlign),
    Color(ColorSpec),
    Scale(f32),
    Rotation(f32),
    Alpha(f32),
    Sep(f32),
    Width(Option<f32>),
    Template(bool),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alpha_updates_are_clamped() {
        let mut preset = DrawingPreset::default();
        preset.apply(&[PresetUpdate::Alpha(2.5)]);
        assert_eq!(preset.alpha, 1.0);
        preset.apply(&[PresetUpdate::Alpha(-0.5)]);
        assert_eq!(preset.alpha, 0.0);
    }

    #[test]
    fn specialized_clears_template_flag_only() {
        let template = DrawingPreset {
            font: Some("fTitle".to_string()),
            is_template: true,
            ..DrawingPreset::default()
        };
        let usable = template.specialized();
        assert!(!usable.is_template);
        assert_eq!(usable.font.as_deref(), Some("fTitle"));
    }

    #[test]
    fn field_selector_reads_match_the_struct() {
        let preset = DrawingPreset {
            font: Some("fBody".to_string()),
            alpha: 0.5,
            ..DrawingPreset::default()
        };
        assert_eq!(
            preset.field(PresetField::Font),
            PresetValue::Font(Some("fBody".to_string()))
        );
        assert_eq!(preset.field(PresetField::Alpha), PresetValue::Alpha(0.5));
        assert_eq!(preset.field(PresetField::Width), PresetValue::Width(None));
    }

    #[test]
    fn apply_batch_sets_every_named_field() {
        let mut preset = DrawingPreset::default();
        preset.apply(&[
            PresetUpdate::HAlign(HAlign::Center),
            PresetUpdate::Color(ColorSpec::Solid(0x00ff00)),
            PresetUpdate::Width(Some(320.0)),
        ]);
        assert_eq!(preset.halign, HAlign::Center);
        assert_eq!(preset.color, Some(ColorSpec::Solid(0x00ff00)));
        assert_eq!(preset.width, Some(320.0));
    }
}
