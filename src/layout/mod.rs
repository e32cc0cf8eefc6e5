//! Force-directed layout: physics parameters, per-node bodies, commands and frames.
//!
//! The [`Simulation`] owns every body for the duration of a run. Everything
//! outside it (the renderer, drag handling) talks to it with
//! [`LayoutCommand`]s and reads positions from published [`LayoutFrame`]s.

pub mod forces;
pub mod quadtree;
pub mod simulation;

#[cfg(feature = "native")]
pub mod driver;

pub use simulation::Simulation;

#[cfg(feature = "native")]
pub use driver::SimulationHandle;

use crate::domain::graph::style;
use crate::settings::VisualSettings;
use crate::shared::{Point, Viewport, WalletId};
use serde::Serialize;

/// Alpha below which the simulation counts as settled.
pub const ALPHA_MIN: f64 = 0.001;
/// Alpha target while a node is being dragged, and the alpha a reheat jumps to.
pub const REHEAT_ALPHA: f64 = 0.3;
/// Fraction of velocity lost each tick.
pub const VELOCITY_DECAY: f64 = 0.4;

/// Decay that brings alpha from 1 to `ALPHA_MIN` in 300 ticks.
pub fn default_alpha_decay() -> f64 {
    1.0 - ALPHA_MIN.powf(1.0 / 300.0)
}

/// Physics parameters derived from the visual settings and viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutConfig {
    pub center: Point,
    /// Rest length of every link.
    pub link_distance: f64,
    /// Many-body charge per node; negative repels.
    pub charge: f64,
    /// Minimum distance used by the many-body force.
    pub charge_distance_min: f64,
    /// Barnes–Hut opening threshold; `0` is exact.
    pub charge_theta: f64,
    pub center_strength: f64,
    /// Added to each node's rendered radius for collision.
    pub collide_padding: f64,
    pub collide_iterations: usize,
    pub collide_strength: f64,
    /// Largest rendered node radius.
    pub max_render_size: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
}

impl LayoutConfig {
    pub fn for_viewport(settings: &VisualSettings, viewport: Viewport) -> Self {
        let narrow = viewport.is_narrow();
        let charge_factor = if narrow { 5.0 } else { 10.0 };

        Self {
            center: viewport.center(),
            link_distance: if narrow { 60.0 } else { 100.0 },
            charge: -(settings.force_strength as f64) * charge_factor,
            charge_distance_min: 1.0,
            charge_theta: 0.9,
            center_strength: 0.05,
            collide_padding: 5.0,
            collide_iterations: 2,
            collide_strength: 1.0,
            max_render_size: style::max_render_size(settings.node_size_scale, viewport),
            alpha_min: ALPHA_MIN,
            alpha_decay: default_alpha_decay(),
            velocity_decay: VELOCITY_DECAY,
        }
    }

    pub fn node_radius(&self, normalized_size: f64) -> f64 {
        style::node_radius(normalized_size, self.max_render_size)
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self::for_viewport(&VisualSettings::default(), Viewport::default())
    }
}

/// Mutable per-node physics state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Body {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Pinned x, overriding the simulated position.
    pub fx: Option<f64>,
    /// Pinned y, overriding the simulated position.
    pub fy: Option<f64>,
    pub radius: f64,
}

impl Body {
    pub fn at(position: Point, radius: f64) -> Self {
        Self {
            x: position.x,
            y: position.y,
            vx: 0.0,
            vy: 0.0,
            fx: None,
            fy: None,
            radius,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// Where a simulation run is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutPhase {
    /// Bodies placed at their seed positions, no tick yet.
    Seeding,
    /// Alpha decaying toward its target.
    Running,
    /// Alpha under the minimum; ticks no longer move anything visibly.
    Settled,
    /// A node is pinned by a drag and alpha is held up.
    Perturbed,
}

/// Messages into a running simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutCommand {
    /// Fix a node at a world position (drag start/move).
    Pin { id: WalletId, x: f64, y: f64 },
    /// Let a pinned node move freely again (drag end).
    Release { id: WalletId },
    /// Rebuild force parameters and reheat, keeping positions.
    UpdateSettings {
        settings: VisualSettings,
        viewport: Viewport,
    },
    Stop,
}

/// Snapshot of all node positions after a tick.
///
/// `positions` is index-aligned with the graph's `nodes`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutFrame {
    pub tick: u64,
    pub alpha: f64,
    pub phase: LayoutPhase,
    pub positions: Vec<Point>,
}

impl LayoutFrame {
    pub fn position(&self, index: usize) -> Option<Point> {
        self.positions.get(index).copied()
    }
}
