//! HTTP client layer: `TradeGraphHttp` for the trade-history proxy.

pub mod client;

pub use client::TradeGraphHttp;
