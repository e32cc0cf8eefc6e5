//! Domain modules organized as vertical slices.
//!
//! - `trade`: trade legs, query filters, wire types and the paginated fetcher
//! - `graph`: wallet nodes, trade links, aggregation and visual encodings

pub mod graph;
pub mod trade;
