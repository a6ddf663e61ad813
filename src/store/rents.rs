use std::sync::Arc;

use serde_json::json;

use crate::api::ApiClient;
use crate::error::{Error, Result};
use crate::schemas::{NoticeKind, Rent, SettlementInput};
use crate::services::balance::{self, RentPaymentStatus};
use crate::services::{search, settlements};

/// Aggregate totals for the fetched period, recomputed after every fetch
/// or settlement splice.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct RentTotals {
    pub paid_count: u32,
    pub partially_paid_count: u32,
    pub not_paid_count: u32,
    pub total_to_collect: f64,
    pub total_collected: f64,
}

#[derive(Debug, Clone, Default)]
pub struct RentFilter {
    /// Folded free-text needle.
    text: String,
    status: Option<RentPaymentStatus>,
}

/// Mirror of one billing period's rent records.
#[derive(Debug)]
pub struct RentStore {
    client: Arc<ApiClient>,
    period: Option<(i32, u32)>,
    items: Vec<Rent>,
    totals: RentTotals,
    filter: RentFilter,
    selected_id: Option<String>,
}

/// Period key for one `(year, month)`, e.g. `202608`.
pub fn term_of(year: i32, month: u32) -> String {
    format!("{year:04}{month:02}")
}

impl RentStore {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self {
            client,
            period: None,
            items: Vec::new(),
            totals: RentTotals::default(),
            filter: RentFilter::default(),
            selected_id: None,
        }
    }

    pub fn period(&self) -> Option<(i32, u32)> {
        self.period
    }

    pub fn items(&self) -> &[Rent] {
        &self.items
    }

    pub fn totals(&self) -> RentTotals {
        self.totals
    }

    /// Fetch (or re-fetch) the rent records of one billing period and make
    /// the cache consistent with its own payment arrays.
    pub async fn fetch(&mut self, year: i32, month: u32) -> Result<&[Rent]> {
        if !(1..=12).contains(&month) {
            return Err(Error::Validation(format!("invalid month {month}")));
        }
        let mut rents: Vec<Rent> = self
            .client
            .get_json(&format!("/rents/{year}/{month}"))
            .await?;
        for rent in &mut rents {
            balance::refresh_derived_fields(rent);
        }
        tracing::debug!(year, month, count = rents.len(), "Fetched rents");

        self.period = Some((year, month));
        self.items = rents;
        self.recompute_totals();
        if let Some(selected) = self.selected_id.clone() {
            if !self.items.iter().any(|rent| rent.id == selected) {
                self.selected_id = None;
            }
        }
        Ok(&self.items)
    }

    pub fn set_filter(&mut self, text: &str, status: Option<RentPaymentStatus>) {
        self.filter = RentFilter {
            text: search::fold(text),
            status,
        };
    }

    /// Records passing the current facet + text filter, in fetch order.
    pub fn filtered(&self) -> Vec<&Rent> {
        self.items
            .iter()
            .filter(|rent| match self.filter.status {
                Some(facet) => balance::payment_status(rent) == facet,
                None => true,
            })
            .filter(|rent| search::rent_matches(rent, &self.filter.text))
            .collect()
    }

    pub fn select(&mut self, rent_id: &str) -> Option<&Rent> {
        let found = self.items.iter().find(|rent| rent.id == rent_id)?;
        self.selected_id = Some(found.id.clone());
        Some(found)
    }

    pub fn selected(&self) -> Option<&Rent> {
        let id = self.selected_id.as_deref()?;
        self.items.iter().find(|rent| rent.id == id)
    }

    /// Apply a settlement to one rent term.
    ///
    /// The form is validated and normalized client-side, patched to the
    /// server, and the returned record is spliced back into the cache
    /// (write-through); nothing is kept locally if the server rejects it.
    pub async fn pay(&mut self, rent_id: &str, input: &SettlementInput) -> Result<&Rent> {
        let payload = settlements::normalize_settlement(input)?;
        let mut rent: Rent = self
            .client
            .patch_json(&format!("/rents/payment/{rent_id}"), &payload)
            .await?;
        balance::refresh_derived_fields(&mut rent);
        tracing::info!(
            rent_id,
            new_balance = rent.new_balance,
            "Settlement recorded"
        );
        Ok(self.splice(rent))
    }

    /// Ask the server to email a notice for the given tenants over the
    /// fetched period, then re-fetch so `email_status` reflects the sends.
    pub async fn send_notice(&mut self, kind: NoticeKind, tenant_ids: &[String]) -> Result<()> {
        let (year, month) = self
            .period
            .ok_or_else(|| Error::Validation("no period fetched".to_string()))?;
        if tenant_ids.is_empty() {
            return Err(Error::Validation("no tenant selected".to_string()));
        }
        let payload = json!({
            "document": kind.as_str(),
            "tenantIds": tenant_ids,
            "term": term_of(year, month),
        });
        let _: serde_json::Value = self.client.post_json("/emails", &payload).await?;
        tracing::info!(kind = kind.as_str(), count = tenant_ids.len(), "Notices sent");
        self.fetch(year, month).await.map(|_| ())
    }

    fn splice(&mut self, rent: Rent) -> &Rent {
        let index = match self.items.iter().position(|item| item.id == rent.id) {
            Some(index) => {
                self.items[index] = rent;
                index
            }
            None => {
                self.items.push(rent);
                self.items.len() - 1
            }
        };
        // Totals depend on every record, so a single splice still means a
        // full recompute; collections are one page of tenants at most.
        self.recompute_totals();
        &self.items[index]
    }

    fn recompute_totals(&mut self) {
        let mut totals = RentTotals::default();
        for rent in &self.items {
            match balance::payment_status(rent) {
                RentPaymentStatus::Paid => totals.paid_count += 1,
                RentPaymentStatus::PartiallyPaid => totals.partially_paid_count += 1,
                RentPaymentStatus::NotPaid => totals.not_paid_count += 1,
            }
            totals.total_collected += balance::payments_total(rent);
            let due = balance::new_balance(rent);
            if due > 0.0 {
                totals.total_to_collect += due;
            }
        }
        self.totals = totals;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::schemas::{OccupantRef, Payment, PaymentType};

    fn store_with(rents: Vec<Rent>) -> RentStore {
        let client = Arc::new(ApiClient::new(ClientConfig::default()).unwrap());
        let mut store = RentStore::new(client);
        store.period = Some((2026, 8));
        store.items = rents;
        store.recompute_totals();
        store
    }

    fn rent(id: &str, name: &str, total: f64, paid: f64) -> Rent {
        let payments = if paid > 0.0 {
            vec![Payment {
                amount: paid,
                date: None,
                payment_type: PaymentType::Cash,
                reference: None,
            }]
        } else {
            Vec::new()
        };
        let mut rent = Rent {
            id: id.to_string(),
            term: term_of(2026, 8),
            occupant: OccupantRef {
                id: format!("t-{id}"),
                name: name.to_string(),
                ..Default::default()
            },
            total_amount: total,
            payments,
            ..Default::default()
        };
        balance::refresh_derived_fields(&mut rent);
        rent
    }

    #[test]
    fn term_key_is_zero_padded() {
        assert_eq!(term_of(2026, 8), "202608");
        assert_eq!(term_of(999, 12), "099912");
    }

    #[test]
    fn totals_count_each_status_once() {
        let store = store_with(vec![
            rent("1", "John Smith", 1000.0, 1000.0),
            rent("2", "Jane Doe", 800.0, 400.0),
            rent("3", "ACME", 1200.0, 0.0),
        ]);
        let totals = store.totals();
        assert_eq!(totals.paid_count, 1);
        assert_eq!(totals.partially_paid_count, 1);
        assert_eq!(totals.not_paid_count, 1);
        assert_eq!(totals.total_collected, 1400.0);
        assert_eq!(totals.total_to_collect, 400.0 + 1200.0);
    }

    #[test]
    fn empty_filter_is_identity_in_order() {
        let store = store_with(vec![
            rent("1", "Zoe", 100.0, 0.0),
            rent("2", "Anna", 100.0, 0.0),
        ]);
        let filtered = store.filtered();
        let ids: Vec<&str> = filtered.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let mut store = store_with(vec![
            rent("1", "John Smith", 1000.0, 400.0),
            rent("2", "Jane Doe", 800.0, 800.0),
            rent("3", "Johan Berg", 500.0, 0.0),
        ]);
        store.set_filter("jo-hn", None);
        let once: Vec<String> = store.filtered().iter().map(|r| r.id.clone()).collect();
        store.set_filter("jo-hn", None);
        let twice: Vec<String> = store.filtered().iter().map(|r| r.id.clone()).collect();
        assert_eq!(once, twice);
        assert_eq!(once, vec!["1"]);
    }

    #[test]
    fn status_facet_applies_before_text() {
        let mut store = store_with(vec![
            rent("1", "John Smith", 1000.0, 400.0),
            rent("2", "John Ford", 800.0, 800.0),
        ]);
        store.set_filter("john", Some(RentPaymentStatus::Paid));
        let ids: Vec<&str> = store.filtered().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2"]);
    }

    #[test]
    fn splice_replaces_in_place_and_recomputes() {
        let mut store = store_with(vec![
            rent("1", "John Smith", 1000.0, 0.0),
            rent("2", "Jane Doe", 800.0, 0.0),
        ]);
        assert_eq!(store.totals().not_paid_count, 2);

        store.splice(rent("1", "John Smith", 1000.0, 1000.0));
        let ids: Vec<&str> = store.items().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["1", "2"]);
        assert_eq!(store.totals().paid_count, 1);
        assert_eq!(store.totals().not_paid_count, 1);
    }

    #[test]
    fn selection_follows_ids() {
        let mut store = store_with(vec![rent("1", "John", 100.0, 0.0)]);
        assert!(store.select("missing").is_none());
        assert!(store.selected().is_none());
        assert!(store.select("1").is_some());
        assert_eq!(store.selected().unwrap().id, "1");
    }
}
