//! Conversions from wire types to domain types for trades.

use super::wire::TradeRecord;
use super::Trade;
use crate::shared::serde_util::parse_lenient_f64;

impl From<TradeRecord> for Trade {
    fn from(t: TradeRecord) -> Self {
        Self {
            trade_amount: parse_lenient_f64(&t.trade_amount),
            trade_price: parse_lenient_f64(&t.trade_price),
            index_price: parse_lenient_f64(&t.index_price),
            trade_id: t.trade_id,
            wallet: t.wallet,
            subaccount_id: t.subaccount_id,
            direction: t.direction,
            timestamp: t.timestamp,
        }
    }
}
