//! Simulation state: bodies, springs, alpha schedule and pin handling.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::SeedableRng;

use super::forces::{self, Spring};
use super::{Body, LayoutCommand, LayoutConfig, LayoutFrame, LayoutPhase, REHEAT_ALPHA};
use crate::domain::graph::TradeGraph;
use crate::error::LayoutError;
use crate::settings::VisualSettings;
use crate::shared::{Point, Viewport, WalletId};

/// One run of the force layout over a fixed graph.
///
/// Built fresh for every rebuilt graph, starting in [`LayoutPhase::Seeding`]
/// at the aggregator's seed positions.
pub struct Simulation {
    bodies: Vec<Body>,
    sizes: Vec<f64>,
    springs: Vec<Spring>,
    index: HashMap<WalletId, usize>,
    config: LayoutConfig,
    alpha: f64,
    alpha_target: f64,
    phase: LayoutPhase,
    tick: u64,
    rng: StdRng,
}

impl Simulation {
    pub fn new(graph: &TradeGraph, settings: &VisualSettings, viewport: Viewport) -> Self {
        Self::with_rng(graph, settings, viewport, StdRng::from_entropy())
    }

    /// Deterministic run: the same graph and seed produce the same frames.
    pub fn with_seed(
        graph: &TradeGraph,
        settings: &VisualSettings,
        viewport: Viewport,
        seed: u64,
    ) -> Self {
        Self::with_rng(graph, settings, viewport, StdRng::seed_from_u64(seed))
    }

    fn with_rng(
        graph: &TradeGraph,
        settings: &VisualSettings,
        viewport: Viewport,
        rng: StdRng,
    ) -> Self {
        let config = LayoutConfig::for_viewport(settings, viewport);

        let index: HashMap<WalletId, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.wallet.id.clone(), i))
            .collect();

        let sizes: Vec<f64> = graph.nodes.iter().map(|n| n.normalized_size).collect();
        let bodies = graph
            .nodes
            .iter()
            .map(|n| Body::at(n.position, config.node_radius(n.normalized_size)))
            .collect();

        let pairs: Vec<(usize, usize)> = graph
            .links
            .iter()
            .filter_map(|l| Some((*index.get(&l.source)?, *index.get(&l.target)?)))
            .collect();
        let springs = Spring::from_pairs(&pairs, graph.nodes.len());

        tracing::debug!(
            nodes = graph.nodes.len(),
            springs = springs.len(),
            "Seeded simulation"
        );

        Self {
            bodies,
            sizes,
            springs,
            index,
            config,
            alpha: 1.0,
            alpha_target: 0.0,
            phase: LayoutPhase::Seeding,
            tick: 0,
            rng,
        }
    }

    pub fn phase(&self) -> LayoutPhase {
        self.phase
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn bodies(&self) -> &[Body] {
        &self.bodies
    }

    pub fn ticks(&self) -> u64 {
        self.tick
    }

    pub fn is_settled(&self) -> bool {
        self.phase == LayoutPhase::Settled
    }

    pub fn position(&self, id: &WalletId) -> Option<Point> {
        self.index.get(id).map(|&i| self.bodies[i].position())
    }

    /// Advance one tick.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.config.alpha_decay;
        let alpha = self.alpha;
        let c = &self.config;

        forces::apply_links(
            &mut self.bodies,
            &self.springs,
            c.link_distance,
            alpha,
            &mut self.rng,
        );
        forces::apply_many_body(
            &mut self.bodies,
            c.charge,
            c.charge_distance_min,
            c.charge_theta,
            alpha,
            &mut self.rng,
        );
        forces::apply_center(&mut self.bodies, c.center, c.center_strength, alpha);
        forces::apply_collide(
            &mut self.bodies,
            c.collide_padding,
            c.collide_strength,
            c.collide_iterations,
            &mut self.rng,
        );

        let keep = 1.0 - c.velocity_decay;
        for body in &mut self.bodies {
            match body.fx {
                Some(fx) => {
                    body.x = fx;
                    body.vx = 0.0;
                }
                None => {
                    body.vx *= keep;
                    body.x += body.vx;
                }
            }
            match body.fy {
                Some(fy) => {
                    body.y = fy;
                    body.vy = 0.0;
                }
                None => {
                    body.vy *= keep;
                    body.y += body.vy;
                }
            }
        }

        self.tick += 1;
        self.phase = match self.phase {
            LayoutPhase::Perturbed => LayoutPhase::Perturbed,
            _ if self.alpha < self.config.alpha_min => LayoutPhase::Settled,
            _ => LayoutPhase::Running,
        };
    }

    /// Tick until settled or `max_ticks` have run. Returns the ticks taken.
    pub fn run_until_settled(&mut self, max_ticks: u64) -> u64 {
        let start = self.tick;
        while !self.is_settled() && self.tick - start < max_ticks {
            self.tick();
        }
        self.tick - start
    }

    /// Fix a node at `at` and hold alpha up while it is dragged.
    pub fn pin(&mut self, id: &WalletId, at: Point) -> Result<(), LayoutError> {
        let idx = self.lookup(id)?;
        let body = &mut self.bodies[idx];
        body.fx = Some(at.x);
        body.fy = Some(at.y);
        self.alpha_target = REHEAT_ALPHA;
        self.phase = LayoutPhase::Perturbed;
        Ok(())
    }

    /// Release a pinned node and let alpha decay again.
    pub fn release(&mut self, id: &WalletId) -> Result<(), LayoutError> {
        let idx = self.lookup(id)?;
        let body = &mut self.bodies[idx];
        body.fx = None;
        body.fy = None;

        if !self.bodies.iter().any(Body::is_pinned) {
            self.alpha_target = 0.0;
            if self.phase == LayoutPhase::Perturbed {
                self.phase = LayoutPhase::Running;
            }
        }
        Ok(())
    }

    /// Rebuild force parameters for new settings and reheat, keeping positions.
    pub fn update_settings(&mut self, settings: &VisualSettings, viewport: Viewport) {
        self.config = LayoutConfig::for_viewport(settings, viewport);
        for (body, &size) in self.bodies.iter_mut().zip(&self.sizes) {
            body.radius = self.config.node_radius(size);
        }
        self.reheat();
    }

    /// Jump alpha back up so the layout adjusts.
    pub fn reheat(&mut self) {
        self.alpha = REHEAT_ALPHA;
        if self.phase != LayoutPhase::Perturbed {
            self.phase = LayoutPhase::Running;
        }
    }

    /// Apply one command. Returns `false` for [`LayoutCommand::Stop`].
    pub fn apply(&mut self, command: LayoutCommand) -> Result<bool, LayoutError> {
        match command {
            LayoutCommand::Pin { id, x, y } => self.pin(&id, Point::new(x, y))?,
            LayoutCommand::Release { id } => self.release(&id)?,
            LayoutCommand::UpdateSettings { settings, viewport } => {
                self.update_settings(&settings, viewport)
            }
            LayoutCommand::Stop => return Ok(false),
        }
        Ok(true)
    }

    pub fn frame(&self) -> LayoutFrame {
        LayoutFrame {
            tick: self.tick,
            alpha: self.alpha,
            phase: self.phase,
            positions: self.bodies.iter().map(Body::position).collect(),
        }
    }

    fn lookup(&self, id: &WalletId) -> Result<usize, LayoutError> {
        self.index
            .get(id)
            .copied()
            .ok_or_else(|| LayoutError::UnknownNode(id.to_string()))
    }
}
