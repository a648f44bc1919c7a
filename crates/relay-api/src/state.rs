//! Shared handler state.

use relay_book::OrderBook;
use relay_validator::OrderValidator;

use crate::types::ExchangeInfo;

#[derive(Clone)]
pub struct ApiState {
    pub book: OrderBook,
    pub validator: OrderValidator,
    pub exchange: ExchangeInfo,
}

impl ApiState {
    pub fn new(book: OrderBook, validator: OrderValidator, exchange: ExchangeInfo) -> Self {
        Self {
            book,
            validator,
            exchange,
        }
    }
}
