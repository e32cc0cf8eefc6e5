//! Graph domain: wallet nodes, trade links, aggregate statistics.
//!
//! A [`TradeGraph`] is rebuilt from scratch on every successful fetch; nothing
//! here is updated incrementally.

pub mod aggregate;
pub mod style;

pub use aggregate::{aggregate, aggregate_with_rng};

use crate::domain::trade::Trade;
use crate::shared::{Direction, Point, TradeId, WalletId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Per-wallet totals accumulated over every leg the wallet took part in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletNode {
    pub id: WalletId,
    pub total_amount: f64,
    /// `Σ trade_amount × index_price` over this wallet's legs.
    pub total_notional_volume: f64,
    pub trade_count: u32,
    pub buy_count: u32,
    pub sell_count: u32,
    pub subaccount_ids: BTreeSet<u64>,
}

impl WalletNode {
    pub fn new(id: WalletId) -> Self {
        Self {
            id,
            total_amount: 0.0,
            total_notional_volume: 0.0,
            trade_count: 0,
            buy_count: 0,
            sell_count: 0,
            subaccount_ids: BTreeSet::new(),
        }
    }

    /// Fold one leg into the totals.
    pub fn record(&mut self, trade: &Trade) {
        self.trade_count += 1;
        match trade.direction {
            Direction::Buy => self.buy_count += 1,
            Direction::Sell => self.sell_count += 1,
        }
        self.total_amount += trade.trade_amount;
        self.total_notional_volume += trade.notional();
        self.subaccount_ids.insert(trade.subaccount_id);
    }

    /// Share of legs that were buys, as a percentage. `None` with no legs.
    pub fn buy_ratio(&self) -> Option<f64> {
        style::buy_ratio(self.buy_count, self.sell_count)
    }

    pub fn node_type(&self) -> NodeType {
        NodeType::from_counts(self.buy_count, self.sell_count)
    }
}

/// Majority side of a wallet's legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Buyer,
    Seller,
    Mixed,
}

impl NodeType {
    pub fn from_counts(buy_count: u32, sell_count: u32) -> Self {
        match buy_count.cmp(&sell_count) {
            std::cmp::Ordering::Greater => Self::Buyer,
            std::cmp::Ordering::Less => Self::Seller,
            std::cmp::Ordering::Equal => Self::Mixed,
        }
    }
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeType::Buyer => write!(f, "Buyer"),
            NodeType::Seller => write!(f, "Seller"),
            NodeType::Mixed => write!(f, "Mixed"),
        }
    }
}

/// A wallet as the layout and renderer see it.
///
/// `position` is only the seed; the live position belongs to the running
/// simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphNode {
    #[serde(flatten)]
    pub wallet: WalletNode,
    /// `total_notional_volume / max` over all nodes, `1` when the max is 0.
    pub normalized_size: f64,
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(flatten)]
    pub position: Point,
}

impl GraphNode {
    pub fn id(&self) -> &WalletId {
        &self.wallet.id
    }
}

/// One matched trade drawn as an edge from the seller to the buyer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
    pub id: TradeId,
    /// Wallet of the sell leg.
    pub source: WalletId,
    /// Wallet of the buy leg.
    pub target: WalletId,
    pub amount: f64,
    pub price: f64,
    pub timestamp: i64,
}

/// Totals across the whole graph.
///
/// Volumes are halved sums: every trade lands in two wallets' accumulators.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub total_volume: f64,
    pub total_notional_volume: f64,
    /// Legs seen.
    pub trade_count: u64,
    pub wallet_count: usize,
    pub link_count: usize,
    /// Trade ids dropped for lacking a buy or a sell leg.
    pub unmatched_trade_count: usize,
}

/// Aggregated counterparty graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeGraph {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphLink>,
    pub stats: GraphStats,
}

impl TradeGraph {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: &WalletId) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| &n.wallet.id == id)
    }

    /// Largest link amount, ignoring `NaN`. `0` without links.
    pub fn max_link_amount(&self) -> f64 {
        self.links.iter().map(|l| l.amount).fold(0.0, f64::max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leg(id: &str, wallet: &str, direction: Direction, subaccount_id: u64) -> Trade {
        Trade {
            trade_id: id.into(),
            wallet: wallet.into(),
            subaccount_id,
            direction,
            trade_amount: 2.0,
            trade_price: 1990.0,
            index_price: 2000.0,
            timestamp: 0,
        }
    }

    #[test]
    fn test_wallet_record_keeps_count_invariant() {
        let mut w = WalletNode::new("A".into());
        w.record(&leg("t1", "A", Direction::Buy, 7));
        w.record(&leg("t2", "A", Direction::Sell, 3));
        w.record(&leg("t3", "A", Direction::Buy, 7));

        assert_eq!(w.trade_count, w.buy_count + w.sell_count);
        assert_eq!(w.buy_count, 2);
        assert_eq!(w.total_amount, 6.0);
        assert_eq!(w.total_notional_volume, 12_000.0);
        assert_eq!(w.subaccount_ids.iter().copied().collect::<Vec<_>>(), vec![3, 7]);
    }

    #[test]
    fn test_node_type_by_majority() {
        assert_eq!(NodeType::from_counts(3, 1), NodeType::Buyer);
        assert_eq!(NodeType::from_counts(1, 3), NodeType::Seller);
        assert_eq!(NodeType::from_counts(2, 2), NodeType::Mixed);
        assert_eq!(NodeType::from_counts(0, 0), NodeType::Mixed);
    }

    #[test]
    fn test_graph_node_json_shape() {
        let mut wallet = WalletNode::new("0xabc".into());
        wallet.record(&leg("t1", "0xabc", Direction::Sell, 1));
        let node = GraphNode {
            node_type: wallet.node_type(),
            wallet,
            normalized_size: 1.0,
            position: Point::new(10.0, 20.0),
        };
        let json = serde_json::to_value(&node).unwrap();
        assert_eq!(json["id"], "0xabc");
        assert_eq!(json["type"], "seller");
        assert_eq!(json["sellCount"], 1);
        assert_eq!(json["totalNotionalVolume"], 4000.0);
        assert_eq!(json["normalizedSize"], 1.0);
        assert_eq!(json["subaccountIds"], serde_json::json!([1]));
        assert_eq!(json["x"], 10.0);
    }
}
