//! Trade aggregation: folds a flat list of legs into wallet nodes and trade links.

use super::{GraphLink, GraphNode, GraphStats, NodeType, TradeGraph, WalletNode};
use crate::domain::trade::Trade;
use crate::shared::{Direction, Point, TradeId, Viewport, WalletId};
use rand::Rng;
use std::collections::HashMap;

/// Build the counterparty graph for `trades`, seeding node positions from the
/// thread-local RNG.
pub fn aggregate(trades: &[Trade], viewport: Viewport) -> TradeGraph {
    aggregate_with_rng(trades, viewport, &mut rand::thread_rng())
}

/// Build the counterparty graph for `trades`, seeding node positions from `rng`.
///
/// Nodes and links come out in first-seen order, so the same input always
/// yields the same graph apart from positions. A trade id missing either its
/// buy or its sell leg produces no link. Malformed amounts arrive as `NaN`
/// and flow into the affected wallet's totals unchanged.
pub fn aggregate_with_rng<R: Rng + ?Sized>(
    trades: &[Trade],
    viewport: Viewport,
    rng: &mut R,
) -> TradeGraph {
    let mut wallets = WalletTable::default();
    for trade in trades {
        wallets.entry(&trade.wallet, viewport, rng).record(trade);
    }

    let mut links = LinkTable::default();
    for trade in trades {
        links.record(trade);
    }

    let max_notional = wallets
        .rows
        .iter()
        .map(|(w, _)| w.total_notional_volume)
        .fold(0.0, f64::max);

    let nodes: Vec<GraphNode> = wallets
        .rows
        .into_iter()
        .map(|(wallet, position)| {
            let normalized_size = if max_notional > 0.0 {
                (wallet.total_notional_volume / max_notional).clamp(0.0, 1.0)
            } else {
                1.0
            };
            GraphNode {
                node_type: NodeType::from_counts(wallet.buy_count, wallet.sell_count),
                wallet,
                normalized_size,
                position,
            }
        })
        .collect();

    let (links, unmatched) = links.finish();

    let total_amount: f64 = nodes.iter().map(|n| n.wallet.total_amount).sum();
    let total_notional: f64 = nodes.iter().map(|n| n.wallet.total_notional_volume).sum();

    let stats = GraphStats {
        total_volume: total_amount / 2.0,
        total_notional_volume: total_notional / 2.0,
        trade_count: trades.len() as u64,
        wallet_count: nodes.len(),
        link_count: links.len(),
        unmatched_trade_count: unmatched,
    };

    tracing::debug!(
        legs = trades.len(),
        wallets = stats.wallet_count,
        links = stats.link_count,
        unmatched,
        "Aggregated trade graph"
    );

    TradeGraph {
        nodes,
        links,
        stats,
    }
}

/// Wallet accumulators in first-seen order.
#[derive(Default)]
struct WalletTable {
    rows: Vec<(WalletNode, Point)>,
    index: HashMap<WalletId, usize>,
}

impl WalletTable {
    fn entry<R: Rng + ?Sized>(
        &mut self,
        id: &WalletId,
        viewport: Viewport,
        rng: &mut R,
    ) -> &mut WalletNode {
        let idx = match self.index.get(id) {
            Some(&idx) => idx,
            None => {
                let idx = self.rows.len();
                self.rows
                    .push((WalletNode::new(id.clone()), viewport.random_point(rng)));
                self.index.insert(id.clone(), idx);
                idx
            }
        };
        &mut self.rows[idx].0
    }
}

struct PartialLink {
    id: TradeId,
    source: Option<WalletId>,
    target: Option<WalletId>,
    amount: f64,
    price: f64,
    timestamp: i64,
}

/// Partial links keyed by trade id, in first-seen order.
#[derive(Default)]
struct LinkTable {
    rows: Vec<PartialLink>,
    index: HashMap<TradeId, usize>,
}

impl LinkTable {
    fn record(&mut self, trade: &Trade) {
        let idx = match self.index.get(&trade.trade_id) {
            Some(&idx) => idx,
            None => {
                let idx = self.rows.len();
                self.rows.push(PartialLink {
                    id: trade.trade_id.clone(),
                    source: None,
                    target: None,
                    amount: trade.trade_amount,
                    price: trade.trade_price,
                    timestamp: trade.timestamp,
                });
                self.index.insert(trade.trade_id.clone(), idx);
                idx
            }
        };

        let row = &mut self.rows[idx];
        match trade.direction {
            Direction::Sell => row.source = Some(trade.wallet.clone()),
            Direction::Buy => row.target = Some(trade.wallet.clone()),
        }
    }

    /// Complete links plus the number of trade ids that were dropped.
    fn finish(self) -> (Vec<GraphLink>, usize) {
        let total = self.rows.len();
        let links: Vec<GraphLink> = self
            .rows
            .into_iter()
            .filter_map(|row| match (row.source, row.target) {
                (Some(source), Some(target)) => Some(GraphLink {
                    id: row.id,
                    source,
                    target,
                    amount: row.amount,
                    price: row.price,
                    timestamp: row.timestamp,
                }),
                _ => None,
            })
            .collect();
        let unmatched = total - links.len();
        (links, unmatched)
    }
}
