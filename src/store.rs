// Pass results: arrival-ordered records plus sorted/filtered views.
use crate::discount::Discount;
use crate::model::{StoreError, TitlePriceRecord, VendorPriceSnapshot};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortStrategy {
    SavedOrder,
    CurrentPriceAscending,
    DiscountPercentDescending,
}

/// Append-ordered collection of the pass results. Views never disturb the
/// stored arrival order, so any sort or filter can be re-derived later.
#[derive(Debug, Default)]
pub struct ResultStore {
    arrival_order: Vec<String>,
    records: HashMap<String, TitlePriceRecord>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Titles are unique upstream; a duplicate append is a caller bug.
    pub fn append(&mut self, record: TitlePriceRecord) -> Result<(), StoreError> {
        if self.records.contains_key(&record.name) {
            return Err(StoreError::DuplicateTitle(record.name));
        }
        self.arrival_order.push(record.name.clone());
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    pub fn clear(&mut self) {
        self.arrival_order.clear();
        self.records.clear();
    }

    pub fn len(&self) -> usize {
        self.arrival_order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrival_order.is_empty()
    }

    /// Records in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &TitlePriceRecord> {
        self.arrival_order.iter().map(|name| &self.records[name])
    }

    /// Records reordered by the given strategy. Sorts are stable: equal
    /// keys keep their arrival order.
    pub fn sorted_view(&self, strategy: SortStrategy) -> Vec<&TitlePriceRecord> {
        let mut view: Vec<&TitlePriceRecord> = self.iter().collect();
        match strategy {
            SortStrategy::SavedOrder => {}
            SortStrategy::CurrentPriceAscending => {
                // Titles with no positive price sort last.
                view.sort_by(|a, b| {
                    lowest_current_price(a).total_cmp(&lowest_current_price(b))
                });
            }
            SortStrategy::DiscountPercentDescending => {
                // Undiscounted titles all land after the discounted ones.
                view.sort_by_key(|r| std::cmp::Reverse(best_discount_percent(r)));
            }
        }
        view
    }

    /// The sorted view narrowed to titles with at least one discount.
    /// Derived from the active sort order, not from arrival order.
    pub fn filtered_view(&self, strategy: SortStrategy) -> Vec<&TitlePriceRecord> {
        let mut view = self.sorted_view(strategy);
        view.retain(|r| has_any_discount(r));
        view
    }
}

fn usable(snapshot: &VendorPriceSnapshot) -> bool {
    snapshot.error.is_none()
}

/// Lowest positive current price across vendors; `+inf` when no vendor
/// reported one.
pub fn lowest_current_price(record: &TitlePriceRecord) -> f64 {
    record
        .vendors
        .values()
        .filter(|s| usable(s) && s.current_price > 0.0)
        .map(|s| s.current_price)
        .fold(f64::INFINITY, f64::min)
}

/// Best discount percentage across vendors; -1 when nothing is discounted,
/// so undiscounted titles sort after every real discount.
pub fn best_discount_percent(record: &TitlePriceRecord) -> i64 {
    record
        .vendors
        .values()
        .filter(|s| usable(s))
        .filter_map(|s| Discount::compute(s.current_price, s.base_price))
        .map(|d| d.percent)
        .max()
        .unwrap_or(-1)
}

pub fn has_any_discount(record: &TitlePriceRecord) -> bool {
    record
        .vendors
        .values()
        .filter(|s| usable(s))
        .any(|s| Discount::compute(s.current_price, s.base_price).is_some())
}
