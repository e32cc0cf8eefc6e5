//! # Counterparty Graph
//!
//! Turns a paginated trade history into a force-directed graph of
//! counterparties: one node per wallet sized by notional volume and colored
//! by buy/sell mix, one edge per matched trade from seller to buyer.
//!
//! ## Architecture
//!
//! The crate is organized in layers:
//!
//! 1. **Core**: Newtypes, domain models, aggregation, layout physics, render model (no I/O)
//! 2. **HTTP API**: `TradeGraphHttp` for `POST /trade-history`, no retries
//! 3. **Fetcher**: `TradeHistoryFetcher`: page discovery, batched concurrent pages, progress
//! 4. **Native driver**: `SimulationHandle` ticking the layout on a tokio task
//! 5. **High-Level**: `GraphClient` builder and `GraphController` view lifecycle
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use counterparty_graph::prelude::*;
//!
//! let client = GraphClient::builder()
//!     .base_url("http://localhost:3000/api")
//!     .build()?;
//!
//! let mut view = client.controller(
//!     client.filters("ETH"),
//!     VisualSettings::default(),
//!     Viewport::new(1280.0, 720.0),
//! )?;
//! view.refresh()?;
//! while let Some(event) = view.next_event().await {
//!     // Loading → Progress… → Ready | Empty | Failed
//! }
//! ```

// ── Layer 1: Core ────────────────────────────────────────────────────────────

/// Shared newtypes, geometry and formatting.
pub mod shared;

/// Domain modules (vertical slices): types, wire types, conversions, clients.
pub mod domain;

/// Unified error types.
pub mod error;

/// Network defaults.
pub mod network;

/// User-adjustable visual settings.
pub mod settings;

/// Force-directed layout simulation.
pub mod layout;

/// Scene building, hit testing, pan/zoom and pointer interaction.
pub mod render;

// ── Layer 2: HTTP API ────────────────────────────────────────────────────────

/// HTTP client for the trade-history proxy.
#[cfg(feature = "http")]
pub mod http;

// ── Layer 5: High-Level ──────────────────────────────────────────────────────

/// `GraphClient`: the primary entry point.
#[cfg(feature = "http")]
pub mod client;

/// `GraphController`: filter state, fetch generations, view events.
#[cfg(feature = "native")]
pub mod controller;

// ── Prelude ──────────────────────────────────────────────────────────────────

pub mod prelude {
    // Shared newtypes
    pub use crate::shared::{Direction, InstrumentType, Point, TradeId, TxStatus, Viewport, WalletId};

    // Domain types: trade
    pub use crate::domain::trade::{
        FetchProgress, PartialFilters, Trade, TradeFilters, TradeHistory, TradeHistoryFetcher,
        TradeHistorySource,
    };

    // Domain types: graph
    pub use crate::domain::graph::style::Hsl;
    pub use crate::domain::graph::{
        aggregate, GraphLink, GraphNode, GraphStats, NodeType, TradeGraph, WalletNode,
    };

    // Settings
    pub use crate::settings::{PartialVisualSettings, VisualSettings};

    // Layout
    pub use crate::layout::{LayoutCommand, LayoutConfig, LayoutFrame, LayoutPhase, Simulation};
    #[cfg(feature = "native")]
    pub use crate::layout::SimulationHandle;

    // Render
    pub use crate::render::{Interaction, NodeDetail, Scene, Tooltip, ZoomTransform};

    // Errors
    pub use crate::error::{GraphError, HttpError, LayoutError, ValidationError};

    // Network
    pub use crate::network::{DEFAULT_API_URL, DEFAULT_MAX_WINDOW};

    // HTTP client
    #[cfg(feature = "http")]
    pub use crate::client::{GraphClient, GraphClientBuilder};
    #[cfg(feature = "http")]
    pub use crate::http::TradeGraphHttp;

    // Controller
    #[cfg(feature = "native")]
    pub use crate::controller::{GraphController, ViewEvent};
}
