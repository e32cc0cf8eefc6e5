//! Render model: what to draw for a graph at a given layout frame, and
//! how pointer input maps back onto it.
//!
//! Nothing here draws pixels. A [`Scene`] is a flat list of sprites in world
//! coordinates that any canvas backend can paint after applying the current
//! [`ZoomTransform`].

pub mod interaction;
pub mod zoom;

pub use interaction::{Interaction, NodeDetail, Tooltip};
pub use zoom::ZoomTransform;

use crate::domain::graph::style::{self, Hsl};
use crate::domain::graph::TradeGraph;
use crate::layout::{LayoutConfig, LayoutFrame};
use crate::settings::VisualSettings;
use crate::shared::{Point, TradeId, Viewport, WalletId};
use std::collections::HashMap;

/// One wallet circle.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeSprite {
    pub id: WalletId,
    pub center: Point,
    pub radius: f64,
    pub fill: Hsl,
    /// Short address, when labels are on.
    pub label: Option<String>,
}

impl NodeSprite {
    pub fn contains(&self, world: Point) -> bool {
        self.center.distance_to(world) <= self.radius
    }
}

/// One trade line from seller to buyer.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSprite {
    pub id: TradeId,
    pub from: Point,
    pub to: Point,
    pub width: f64,
}

/// Everything to draw for one frame. Edges are painted first, then nodes in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scene {
    pub edges: Vec<EdgeSprite>,
    pub nodes: Vec<NodeSprite>,
}

impl Scene {
    /// Node positions come from `frame`; a node the frame does not cover
    /// falls back to its seed position.
    pub fn build(
        graph: &TradeGraph,
        frame: &LayoutFrame,
        settings: &VisualSettings,
        viewport: Viewport,
    ) -> Self {
        let config = LayoutConfig::for_viewport(settings, viewport);

        let nodes: Vec<NodeSprite> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, node)| NodeSprite {
                id: node.wallet.id.clone(),
                center: frame.position(i).unwrap_or(node.position),
                radius: config.node_radius(node.normalized_size),
                fill: style::node_color(node.wallet.buy_count, node.wallet.sell_count),
                label: settings.show_labels.then(|| node.wallet.id.short()),
            })
            .collect();

        let index: HashMap<&WalletId, usize> = nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (&n.id, i))
            .collect();

        let max_amount = graph.max_link_amount();
        let edges = graph
            .links
            .iter()
            .filter_map(|link| {
                let from = nodes[*index.get(&link.source)?].center;
                let to = nodes[*index.get(&link.target)?].center;
                Some(EdgeSprite {
                    id: link.id.clone(),
                    from,
                    to,
                    width: style::link_width(link.amount, max_amount, settings.edge_thickness_scale),
                })
            })
            .collect();

        Self { edges, nodes }
    }

    pub fn node(&self, id: &WalletId) -> Option<&NodeSprite> {
        self.nodes.iter().find(|n| &n.id == id)
    }

    /// Topmost node containing `world`, if any.
    pub fn hit_test(&self, world: Point) -> Option<&NodeSprite> {
        self.nodes.iter().rev().find(|n| n.contains(world))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::aggregate_with_rng;
    use crate::domain::trade::Trade;
    use crate::layout::LayoutPhase;
    use crate::shared::Direction;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn graph() -> TradeGraph {
        let leg = |id: &str, wallet: &str, direction, amount: f64| Trade {
            trade_id: id.into(),
            wallet: wallet.into(),
            subaccount_id: 1,
            direction,
            trade_amount: amount,
            trade_price: 2000.0,
            index_price: 2000.0,
            timestamp: 0,
        };
        aggregate_with_rng(
            &[
                leg("t1", "0x4c2e1d7f8a9b0c3d4e5f6a7b8c9d0e1f2a3b9a1f", Direction::Sell, 4.0),
                leg("t1", "0xB", Direction::Buy, 4.0),
                leg("t2", "0xB", Direction::Sell, 1.0),
                leg("t2", "0xC", Direction::Buy, 1.0),
            ],
            Viewport::default(),
            &mut StdRng::seed_from_u64(5),
        )
    }

    fn frame(positions: Vec<Point>) -> LayoutFrame {
        LayoutFrame {
            tick: 1,
            alpha: 0.5,
            phase: LayoutPhase::Running,
            positions,
        }
    }

    fn positions() -> Vec<Point> {
        vec![
            Point::new(100.0, 100.0),
            Point::new(200.0, 100.0),
            Point::new(300.0, 100.0),
        ]
    }

    #[test]
    fn test_build_scene() {
        let g = graph();
        let scene = Scene::build(&g, &frame(positions()), &VisualSettings::default(), Viewport::default());

        assert_eq!(scene.nodes.len(), 3);
        assert_eq!(scene.edges.len(), 2);

        let a = &scene.nodes[0];
        assert_eq!(a.center, Point::new(100.0, 100.0));
        assert_eq!(a.fill, style::PURE_RED);
        assert_eq!(a.label.as_deref(), Some("0x4c2e…9a1f"));

        // 0xB traded the most notional
        assert_eq!(scene.nodes[1].radius, 40.0);
        assert_eq!(scene.nodes[2].fill, style::PURE_GREEN);

        let e = &scene.edges[0];
        assert_eq!((e.from, e.to), (positions()[0], positions()[1]));
        assert_eq!(e.width, 2.0);
        assert_eq!(scene.edges[1].width, 0.875);
    }

    #[test]
    fn test_labels_toggle() {
        let g = graph();
        let settings = VisualSettings {
            show_labels: false,
            ..Default::default()
        };
        let scene = Scene::build(&g, &frame(positions()), &settings, Viewport::default());
        assert!(scene.nodes.iter().all(|n| n.label.is_none()));
    }

    #[test]
    fn test_short_frame_falls_back_to_seed() {
        let g = graph();
        let scene = Scene::build(&g, &frame(vec![]), &VisualSettings::default(), Viewport::default());
        assert_eq!(scene.nodes[2].center, g.nodes[2].position);
    }

    #[test]
    fn test_hit_test_topmost() {
        let g = graph();
        let mut pts = positions();
        pts[2] = Point::new(205.0, 100.0);
        let scene = Scene::build(&g, &frame(pts), &VisualSettings::default(), Viewport::default());

        let hit = scene.hit_test(Point::new(204.0, 100.0)).unwrap();
        assert_eq!(hit.id.as_str(), "0xC");
        assert!(scene.hit_test(Point::new(900.0, 900.0)).is_none());
    }
}
