//! Pointer interaction state: hover, selection and drag.
//!
//! Hover and selection are mutually exclusive: while a node is selected no
//! tooltip is shown. Drags never touch simulation state directly; they yield
//! [`LayoutCommand`]s for the caller to forward.

use crate::domain::graph::{GraphNode, NodeType, TradeGraph};
use crate::layout::LayoutCommand;
use crate::settings::VisualSettings;
use crate::shared::fmt::num;
use crate::shared::{Point, WalletId};
use serde::Serialize;

/// Compact hover card.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tooltip {
    pub id: WalletId,
    pub label: String,
    pub volume: String,
    pub trade_count: u32,
}

impl Tooltip {
    fn for_node(node: &GraphNode) -> Self {
        Self {
            id: node.wallet.id.clone(),
            label: node.wallet.id.short(),
            volume: num::usd(node.wallet.total_notional_volume),
            trade_count: node.wallet.trade_count,
        }
    }
}

/// Detail panel for the selected wallet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeDetail {
    pub id: WalletId,
    pub node_type: NodeType,
    pub total_notional_volume: f64,
    /// e.g. `$12,345`.
    pub volume: String,
    pub total_amount: f64,
    pub trade_count: u32,
    pub buy_count: u32,
    pub sell_count: u32,
    /// e.g. `62.5%`; `—` with no legs.
    pub buy_ratio: String,
    pub sell_ratio: String,
    pub subaccount_ids: Vec<u64>,
}

impl NodeDetail {
    pub fn for_node(node: &GraphNode) -> Self {
        let w = &node.wallet;
        let (buy_ratio, sell_ratio) = match w.buy_ratio() {
            Some(pct) => (num::percent(pct / 100.0), num::percent(1.0 - pct / 100.0)),
            None => (num::percent(f64::NAN), num::percent(f64::NAN)),
        };

        Self {
            id: w.id.clone(),
            node_type: node.node_type,
            total_notional_volume: w.total_notional_volume,
            volume: num::usd(w.total_notional_volume),
            total_amount: w.total_amount,
            trade_count: w.trade_count,
            buy_count: w.buy_count,
            sell_count: w.sell_count,
            buy_ratio,
            sell_ratio,
            subaccount_ids: w.subaccount_ids.iter().copied().collect(),
        }
    }
}

/// Hover/selection/drag state for one graph view.
///
/// Reset whenever the graph is rebuilt.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Interaction {
    hovered: Option<WalletId>,
    selected: Option<WalletId>,
    dragging: Option<WalletId>,
}

impl Interaction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn hovered(&self) -> Option<&WalletId> {
        self.hovered.as_ref()
    }

    pub fn selected(&self) -> Option<&WalletId> {
        self.selected.as_ref()
    }

    pub fn dragging(&self) -> Option<&WalletId> {
        self.dragging.as_ref()
    }

    /// Pointer moved over `hit` (or empty space). Ignored while a node is
    /// selected.
    pub fn hover(&mut self, hit: Option<&WalletId>) {
        if self.selected.is_some() {
            self.hovered = None;
            return;
        }
        self.hovered = hit.cloned();
    }

    /// Click on `hit`. Clicking a node selects it, clicking the selected node
    /// again or empty space clears the selection.
    pub fn click(&mut self, hit: Option<&WalletId>) {
        self.selected = match hit {
            Some(id) if self.selected.as_ref() != Some(id) => Some(id.clone()),
            _ => None,
        };
        if self.selected.is_some() {
            self.hovered = None;
        }
    }

    /// Tooltip to show, if any.
    pub fn tooltip(&self, graph: &TradeGraph, settings: &VisualSettings) -> Option<Tooltip> {
        if !settings.show_tooltips || self.selected.is_some() || self.dragging.is_some() {
            return None;
        }
        let node = graph.node(self.hovered.as_ref()?)?;
        Some(Tooltip::for_node(node))
    }

    /// Detail panel for the selected node, if any.
    pub fn detail(&self, graph: &TradeGraph) -> Option<NodeDetail> {
        let node = graph.node(self.selected.as_ref()?)?;
        Some(NodeDetail::for_node(node))
    }

    /// Start dragging `id`, pinning it where the pointer is.
    pub fn drag_start(&mut self, id: &WalletId, world: Point) -> LayoutCommand {
        self.dragging = Some(id.clone());
        self.hovered = None;
        pin(id, world)
    }

    /// Move the dragged node. `None` when nothing is being dragged.
    pub fn drag_move(&self, world: Point) -> Option<LayoutCommand> {
        self.dragging.as_ref().map(|id| pin(id, world))
    }

    /// Drop the dragged node, releasing its pin.
    pub fn drag_end(&mut self) -> Option<LayoutCommand> {
        self.dragging
            .take()
            .map(|id| LayoutCommand::Release { id })
    }
}

fn pin(id: &WalletId, world: Point) -> LayoutCommand {
    LayoutCommand::Pin {
        id: id.clone(),
        x: world.x,
        y: world.y,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::graph::aggregate;
    use crate::domain::trade::Trade;
    use crate::shared::{Direction, Viewport};

    fn graph() -> TradeGraph {
        let leg = |id: &str, wallet: &str, subaccount_id, direction| Trade {
            trade_id: id.into(),
            wallet: wallet.into(),
            subaccount_id,
            direction,
            trade_amount: 1.0,
            trade_price: 2000.0,
            index_price: 2000.0,
            timestamp: 0,
        };
        aggregate(
            &[
                leg("t1", "A", 9, Direction::Sell),
                leg("t1", "B", 1, Direction::Buy),
                leg("t2", "A", 4, Direction::Buy),
                leg("t2", "C", 1, Direction::Sell),
                leg("t3", "A", 4, Direction::Buy),
                leg("t3", "C", 1, Direction::Sell),
            ],
            Viewport::default(),
        )
    }

    #[test]
    fn test_hover_shows_tooltip() {
        let g = graph();
        let mut ui = Interaction::new();
        ui.hover(Some(&"A".into()));
        let tip = ui.tooltip(&g, &VisualSettings::default()).unwrap();
        assert_eq!(tip.id.as_str(), "A");
        assert_eq!(tip.volume, "$6,000");
        assert_eq!(tip.trade_count, 3);
    }

    #[test]
    fn test_tooltips_can_be_disabled() {
        let g = graph();
        let mut ui = Interaction::new();
        ui.hover(Some(&"A".into()));
        let settings = VisualSettings {
            show_tooltips: false,
            ..Default::default()
        };
        assert!(ui.tooltip(&g, &settings).is_none());
    }

    #[test]
    fn test_selection_suppresses_hover() {
        let g = graph();
        let mut ui = Interaction::new();
        ui.hover(Some(&"B".into()));
        ui.click(Some(&"A".into()));
        assert!(ui.hovered().is_none());
        assert!(ui.tooltip(&g, &VisualSettings::default()).is_none());

        ui.hover(Some(&"B".into()));
        assert!(ui.hovered().is_none());
        assert!(ui.tooltip(&g, &VisualSettings::default()).is_none());

        // clicking empty space clears the selection and hover works again
        ui.click(None);
        ui.hover(Some(&"B".into()));
        assert!(ui.tooltip(&g, &VisualSettings::default()).is_some());
    }

    #[test]
    fn test_click_selected_again_deselects() {
        let mut ui = Interaction::new();
        ui.click(Some(&"A".into()));
        assert_eq!(ui.selected().map(WalletId::as_str), Some("A"));
        ui.click(Some(&"A".into()));
        assert!(ui.selected().is_none());
    }

    #[test]
    fn test_detail_panel() {
        let g = graph();
        let mut ui = Interaction::new();
        ui.click(Some(&"A".into()));
        let d = ui.detail(&g).unwrap();
        assert_eq!(d.id.as_str(), "A");
        assert_eq!(d.trade_count, 3);
        assert_eq!((d.buy_count, d.sell_count), (2, 1));
        assert_eq!(d.buy_ratio, "66.7%");
        assert_eq!(d.sell_ratio, "33.3%");
        assert_eq!(d.subaccount_ids, vec![4, 9]);
        assert_eq!(d.node_type, NodeType::Buyer);
        assert_eq!(d.volume, "$6,000");
    }

    #[test]
    fn test_drag_emits_pin_and_release() {
        let mut ui = Interaction::new();
        let id: WalletId = "B".into();

        let cmd = ui.drag_start(&id, Point::new(1.0, 2.0));
        assert_eq!(
            cmd,
            LayoutCommand::Pin {
                id: id.clone(),
                x: 1.0,
                y: 2.0
            }
        );
        assert_eq!(
            ui.drag_move(Point::new(3.0, 4.0)),
            Some(LayoutCommand::Pin {
                id: id.clone(),
                x: 3.0,
                y: 4.0
            })
        );
        assert_eq!(ui.drag_end(), Some(LayoutCommand::Release { id }));
        assert_eq!(ui.drag_end(), None);
        assert_eq!(ui.drag_move(Point::new(0.0, 0.0)), None);
    }
}
