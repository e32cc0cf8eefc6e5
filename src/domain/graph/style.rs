//! Visual encodings: node color from buy/sell mix, node radius and link width.
//!
//! All functions are pure and deterministic.

use crate::shared::Viewport;
use std::fmt;

/// Radius floor so zero-volume wallets stay visible.
pub const MIN_RADIUS: f64 = 3.0;
/// Hue reached at a 100% buy ratio.
pub const GREEN_HUE: f64 = 142.0;

/// Wallets with no legs.
pub const NEUTRAL: Hsl = Hsl::new(0.0, 0.0, 60.0);
/// All sells.
pub const PURE_RED: Hsl = Hsl::new(0.0, 84.0, 60.0);
/// All buys.
pub const PURE_GREEN: Hsl = Hsl::new(GREEN_HUE, 71.0, 45.0);

/// A color in HSL space: hue in degrees, saturation and lightness in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub h: f64,
    pub s: f64,
    pub l: f64,
}

impl Hsl {
    pub const fn new(h: f64, s: f64, l: f64) -> Self {
        Self { h, s, l }
    }

    /// CSS notation, e.g. `hsl(142, 71%, 45%)`.
    pub fn to_css(&self) -> String {
        format!(
            "hsl({}, {}%, {}%)",
            round2(self.h),
            round2(self.s),
            round2(self.l)
        )
    }

    pub fn to_rgb(&self) -> (u8, u8, u8) {
        let s = (self.s / 100.0).clamp(0.0, 1.0);
        let l = (self.l / 100.0).clamp(0.0, 1.0);
        let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
        let h = self.h.rem_euclid(360.0) / 60.0;
        let x = c * (1.0 - (h % 2.0 - 1.0).abs());
        let (r, g, b) = match h as u32 {
            0 => (c, x, 0.0),
            1 => (x, c, 0.0),
            2 => (0.0, c, x),
            3 => (0.0, x, c),
            4 => (x, 0.0, c),
            _ => (c, 0.0, x),
        };
        let m = l - c / 2.0;
        let channel = |v: f64| ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8;
        (channel(r), channel(g), channel(b))
    }

    pub fn to_hex(&self) -> String {
        let (r, g, b) = self.to_rgb();
        format!("#{:02x}{:02x}{:02x}", r, g, b)
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_css())
    }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Buy share of all legs as a percentage in `[0, 100]`. `None` with no legs.
pub fn buy_ratio(buy_count: u32, sell_count: u32) -> Option<f64> {
    let total = buy_count as u64 + sell_count as u64;
    if total == 0 {
        return None;
    }
    Some(buy_count as f64 / total as f64 * 100.0)
}

/// Node fill color.
///
/// Red at 0% buys through to green at 100%, hue linear in the buy ratio.
/// Near either end (below 20% or above 80%) the color is slightly more
/// saturated so lopsided wallets stand out.
pub fn node_color(buy_count: u32, sell_count: u32) -> Hsl {
    match buy_ratio(buy_count, sell_count) {
        None => NEUTRAL,
        Some(ratio) => color_for_ratio(ratio),
    }
}

/// Color for a buy ratio percentage. Values outside `[0, 100]` are clamped.
pub fn color_for_ratio(ratio: f64) -> Hsl {
    let ratio = ratio.clamp(0.0, 100.0);
    if ratio <= 0.0 {
        return PURE_RED;
    }
    if ratio >= 100.0 {
        return PURE_GREEN;
    }

    let hue = ratio / 100.0 * GREEN_HUE;
    if !(20.0..=80.0).contains(&ratio) {
        Hsl::new(hue, 80.0, 55.0)
    } else {
        Hsl::new(hue, 70.0, 50.0)
    }
}

/// Largest radius a node can be drawn at: `scale × 4`, `scale × 2.5` on
/// narrow viewports.
pub fn max_render_size(node_size_scale: u8, viewport: Viewport) -> f64 {
    let factor = if viewport.is_narrow() { 2.5 } else { 4.0 };
    node_size_scale as f64 * factor
}

/// `max(3, normalized_size × max_render_size)`. `NaN` sizes fall to the floor.
pub fn node_radius(normalized_size: f64, max_render_size: f64) -> f64 {
    (normalized_size * max_render_size).max(MIN_RADIUS)
}

/// Stroke width for a link, between `0.5` and `2.0` times the thickness scale.
pub fn link_width(amount: f64, max_amount: f64, edge_thickness_scale: u8) -> f64 {
    let relative = if max_amount > 0.0 && amount.is_finite() {
        (amount / max_amount).clamp(0.0, 1.0)
    } else {
        0.0
    };
    edge_thickness_scale as f64 * (0.5 + 1.5 * relative)
}
