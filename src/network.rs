//! Network defaults for the trade-history proxy.

use std::time::Duration;

/// Default base URL of the trade-history proxy.
pub const DEFAULT_API_URL: &str = "http://localhost:3000/api";

/// Path of the trade-history endpoint, relative to the base URL.
pub const TRADE_HISTORY_PATH: &str = "/trade-history";

/// Longest time range a single query may span.
pub const DEFAULT_MAX_WINDOW: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Number of pages requested concurrently after page 1.
pub const DEFAULT_BATCH_SIZE: usize = 3;

/// Trades per page requested from the proxy.
pub const DEFAULT_PAGE_SIZE: u32 = 1000;

/// Per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
