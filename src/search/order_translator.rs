//! Order Translator
//!
//! Translates sort entries to the engine's `field:direction` sort syntax.

use super::query_builder::OrderEntry;

pub struct OrderTranslator;

impl OrderTranslator {
    /// One `field:direction` string per entry, in input order.
    pub fn translate(order: &[OrderEntry]) -> Vec<String> {
        order
            .iter()
            .map(|entry| format!("{}:{}", entry.field, entry.direction.as_str()))
            .collect()
    }
}
