//! User-adjustable visual settings.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const NODE_SIZE_SCALE_RANGE: RangeInclusive<u8> = 1..=20;
pub const FORCE_STRENGTH_RANGE: RangeInclusive<u8> = 1..=100;
pub const EDGE_THICKNESS_SCALE_RANGE: RangeInclusive<u8> = 1..=10;

/// Visual knobs that shape layout physics and drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisualSettings {
    /// Scales the largest node radius.
    pub node_size_scale: u8,
    /// Scales many-body repulsion.
    pub force_strength: u8,
    /// Scales link stroke width.
    pub edge_thickness_scale: u8,
    pub show_labels: bool,
    pub show_tooltips: bool,
}

impl Default for VisualSettings {
    fn default() -> Self {
        Self {
            node_size_scale: 10,
            force_strength: 30,
            edge_thickness_scale: 1,
            show_labels: true,
            show_tooltips: true,
        }
    }
}

impl VisualSettings {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("nodeSizeScale", self.node_size_scale, NODE_SIZE_SCALE_RANGE)?;
        check("forceStrength", self.force_strength, FORCE_STRENGTH_RANGE)?;
        check(
            "edgeThicknessScale",
            self.edge_thickness_scale,
            EDGE_THICKNESS_SCALE_RANGE,
        )?;
        Ok(())
    }

    /// Apply a partial update, returning the merged settings.
    ///
    /// `self` is left untouched when the result would be out of range.
    pub fn merged(&self, patch: &PartialVisualSettings) -> Result<Self, ValidationError> {
        let next = Self {
            node_size_scale: patch.node_size_scale.unwrap_or(self.node_size_scale),
            force_strength: patch.force_strength.unwrap_or(self.force_strength),
            edge_thickness_scale: patch
                .edge_thickness_scale
                .unwrap_or(self.edge_thickness_scale),
            show_labels: patch.show_labels.unwrap_or(self.show_labels),
            show_tooltips: patch.show_tooltips.unwrap_or(self.show_tooltips),
        };
        next.validate()?;
        Ok(next)
    }

    /// Whether moving from `self` to `other` changes layout physics.
    ///
    /// Label and tooltip toggles only affect drawing.
    pub fn affects_layout(&self, other: &Self) -> bool {
        self.node_size_scale != other.node_size_scale
            || self.force_strength != other.force_strength
    }
}

fn check(name: &'static str, value: u8, range: RangeInclusive<u8>) -> Result<(), ValidationError> {
    if range.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::SettingOutOfRange {
        name,
        value: value as i64,
        min: *range.start() as i64,
        max: *range.end() as i64,
    })
}

/// A partial settings update, as delivered by settings widgets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialVisualSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_size_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub force_strength: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edge_thickness_scale: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_labels: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_tooltips: Option<bool>,
}
