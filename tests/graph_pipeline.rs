//! Offline end-to-end test: wire JSON → fetcher → aggregation → layout → scene.
//!
//! Pages are served from memory, so this runs without network access.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use counterparty_graph::domain::trade::wire::{TradeHistoryPage, TradeHistoryRequest};
use counterparty_graph::error::HttpError;
use counterparty_graph::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Serves canned pages and remembers which pages were asked for.
struct MemorySource {
    pages: HashMap<u32, TradeHistoryPage>,
    requested: Mutex<Vec<u32>>,
}

impl MemorySource {
    fn from_json(pages: &[&str]) -> Self {
        let pages = pages
            .iter()
            .enumerate()
            .map(|(i, json)| {
                let page: TradeHistoryPage = serde_json::from_str(json).expect("valid page json");
                (i as u32 + 1, page)
            })
            .collect();
        Self {
            pages,
            requested: Mutex::new(Vec::new()),
        }
    }
}

impl TradeHistorySource for MemorySource {
    async fn fetch_page(
        &self,
        request: &TradeHistoryRequest,
    ) -> Result<TradeHistoryPage, HttpError> {
        self.requested.lock().unwrap().push(request.page);
        self.pages
            .get(&request.page)
            .cloned()
            .ok_or_else(|| HttpError::Remote {
                status: 404,
                message: format!("no page {}", request.page),
            })
    }
}

const PAGE_1: &str = r#"{
  "trades": [
    {"trade_id": "t1", "wallet": "0xAAAA000000000000000000000000000000000001", "subaccount_id": 11,
     "direction": "sell", "trade_amount": "1.0", "trade_price": "1995", "index_price": "2000", "timestamp": 1709251200000},
    {"trade_id": "t1", "wallet": "0xBBBB000000000000000000000000000000000002", "subaccount_id": 22,
     "direction": "buy", "trade_amount": "1.0", "trade_price": "1995", "index_price": "2000", "timestamp": 1709251200000}
  ],
  "pagination": {"num_pages": 2, "count": 5}
}"#;

const PAGE_2: &str = r#"{
  "trades": [
    {"trade_id": "t2", "wallet": "0xBBBB000000000000000000000000000000000002", "subaccount_id": 23,
     "direction": "sell", "trade_amount": 0.5, "trade_price": 2010, "index_price": 2000, "timestamp": 1709251260000},
    {"trade_id": "t2", "wallet": "0xCCCC000000000000000000000000000000000003", "subaccount_id": 33,
     "direction": "buy", "trade_amount": "0.5", "trade_price": "2010", "index_price": "2000", "timestamp": 1709251260000},
    {"trade_id": "t3", "wallet": "0xCCCC000000000000000000000000000000000003", "subaccount_id": 33,
     "direction": "sell", "trade_amount": "2.0", "trade_price": "2005", "index_price": "2000", "timestamp": 1709251320000}
  ],
  "pagination": {"num_pages": 2, "count": 5}
}"#;

fn filters() -> TradeFilters {
    TradeFilters {
        page_size: 3,
        ..TradeFilters::last("ETH", DAY)
    }
}

#[test]
fn fetch_aggregate_layout_render() {
    let fetcher = TradeHistoryFetcher::new(MemorySource::from_json(&[PAGE_1, PAGE_2]), 7 * DAY, 3);

    let progress = Mutex::new(Vec::new());
    let history = tokio_test::block_on(
        fetcher.fetch_all(&filters(), |p| progress.lock().unwrap().push(p.percentage)),
    )
    .expect("fetch should succeed");

    assert_eq!(history.trades.len(), 5);
    assert_eq!(history.pagination.num_pages, 2);
    assert_eq!(*fetcher.source().requested.lock().unwrap(), vec![1, 2]);
    assert_eq!(progress.into_inner().unwrap(), vec![50.0, 100.0]);

    let viewport = Viewport::new(1024.0, 768.0);
    let graph = counterparty_graph::domain::graph::aggregate_with_rng(
        &history.trades,
        viewport,
        &mut StdRng::seed_from_u64(11),
    );

    // A sold to B, B sold to C; C's t3 sell has no buyer
    assert_eq!(graph.stats.wallet_count, 3);
    assert_eq!(graph.stats.link_count, 2);
    assert_eq!(graph.stats.unmatched_trade_count, 1);
    assert_eq!(graph.stats.total_volume, 2.5);
    assert_eq!(graph.stats.total_notional_volume, 5000.0);

    let links: Vec<_> = graph
        .links
        .iter()
        .map(|l| (l.id.as_str(), l.source.short(), l.target.short()))
        .collect();
    assert_eq!(
        links,
        vec![
            ("t1", "0xAAAA…0001".to_string(), "0xBBBB…0002".to_string()),
            ("t2", "0xBBBB…0002".to_string(), "0xCCCC…0003".to_string()),
        ]
    );

    let c = graph.node(&"0xCCCC000000000000000000000000000000000003".into()).unwrap();
    assert_eq!(c.wallet.total_notional_volume, 5000.0);
    assert_eq!(c.normalized_size, 1.0);
    assert_eq!(c.node_type, NodeType::Mixed);

    let settings = VisualSettings::default();
    let mut sim = Simulation::with_seed(&graph, &settings, viewport, 5);
    sim.run_until_settled(1_000);
    assert_eq!(sim.phase(), LayoutPhase::Settled);

    let frame = sim.frame();
    let scene = Scene::build(&graph, &frame, &settings, viewport);
    assert_eq!(scene.nodes.len(), 3);
    assert_eq!(scene.edges.len(), 2);

    // click the biggest node through a zoomed view
    let mut zoom = ZoomTransform::default();
    zoom.zoom_at(2.0, viewport.center());
    let target = scene.nodes[2].center;
    let hit = scene.hit_test(zoom.invert(zoom.apply(target))).unwrap();

    let mut ui = Interaction::new();
    ui.click(Some(&hit.id));
    let detail = ui.detail(&graph).unwrap();
    assert_eq!(detail.volume, "$5,000");
    assert_eq!(detail.subaccount_ids, vec![33]);
    assert!(ui.tooltip(&graph, &settings).is_none());
}

#[test]
fn oversized_window_never_hits_the_network() {
    let fetcher = TradeHistoryFetcher::new(MemorySource::from_json(&[PAGE_1, PAGE_2]), 7 * DAY, 3);
    let filters = TradeFilters::last("ETH", 8 * DAY);

    let err = tokio_test::block_on(fetcher.fetch_all(&filters, |_| {})).unwrap_err();
    assert!(matches!(
        err,
        GraphError::Validation(ValidationError::WindowTooLarge { .. })
    ));
    assert!(fetcher.source().requested.lock().unwrap().is_empty());
}

#[test]
fn graph_serializes_for_the_view() {
    let single_page = PAGE_1.replace(r#""num_pages": 2"#, r#""num_pages": 1"#);
    let fetcher = TradeHistoryFetcher::new(MemorySource::from_json(&[single_page.as_str()]), 7 * DAY, 3);
    let history = tokio_test::block_on(fetcher.fetch_all(&filters(), |_| {})).unwrap();
    let graph = aggregate(&history.trades, Viewport::default());

    let json = serde_json::to_value(&graph).unwrap();
    assert_eq!(json["links"][0]["source"], "0xAAAA000000000000000000000000000000000001");
    assert_eq!(json["nodes"][0]["type"], "seller");
    assert_eq!(json["stats"]["totalNotionalVolume"], 2000.0);
}
