use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::Error;

pub fn validate_input<T: Validate>(input: &T) -> Result<(), Error> {
    input
        .validate()
        .map_err(|errors| Error::Validation(format!("{errors}")))
}

fn default_currency_eur() -> String {
    "EUR".to_string()
}
fn default_en_locale() -> String {
    "en".to_string()
}

/// How a settlement was paid. `Levy` is a direct-debit style collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentType {
    Cash,
    Cheque,
    Transfer,
    Levy,
}

impl Default for PaymentType {
    fn default() -> Self {
        Self::Cash
    }
}

/// A recorded payment against one rent term. `date` is the wire
/// `DD/MM/YYYY` string the server stores verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub reference: Option<String>,
}

/// Automated reminder kinds, in lifecycle order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NoticeKind {
    FirstNotice,
    SecondNotice,
    LastNotice,
    Receipt,
}

impl NoticeKind {
    pub const ALL: [NoticeKind; 4] = [
        NoticeKind::FirstNotice,
        NoticeKind::SecondNotice,
        NoticeKind::LastNotice,
        NoticeKind::Receipt,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::FirstNotice => "first_notice",
            Self::SecondNotice => "second_notice",
            Self::LastNotice => "last_notice",
            Self::Receipt => "receipt",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoticeDelivery {
    pub sent_date: DateTime<Utc>,
}

/// Per-rent record of which notices the server has emailed so far.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    #[serde(default)]
    pub status: HashMap<NoticeKind, bool>,
    #[serde(default)]
    pub last: HashMap<NoticeKind, NoticeDelivery>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OccupantRef {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub has_contacts_to_notify: bool,
}

/// One tenant's rent record for one billing period. Created by server-side
/// billing generation; the client only ever patches it through a settlement.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Rent {
    #[serde(rename = "_id", default)]
    pub id: String,
    /// Period key, `YYYYMM`.
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub occupant: OccupantRef,
    #[serde(default)]
    pub payments: Vec<Payment>,
    #[serde(default)]
    pub extracharge: f64,
    #[serde(default)]
    pub promo: f64,
    /// Previous period carry-over (debt or credit).
    #[serde(default)]
    pub balance: f64,
    /// Remaining amount due after payments. Server-sent, recomputed
    /// client-side after every settlement splice.
    #[serde(default)]
    pub new_balance: f64,
    /// Server-computed grand total for the period (base rent + extracharge
    /// − promo + carry-over).
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub email_status: Option<EmailStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tenant {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub reference: Option<String>,
    #[serde(default)]
    pub is_company: bool,
    /// Legal representative, only meaningful for companies.
    #[serde(default)]
    pub manager: Option<String>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub begin_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub termination_date: Option<String>,
    #[serde(default)]
    pub lease_id: Option<String>,
    #[serde(default)]
    pub properties: Vec<serde_json::Value>,
}

impl Tenant {
    /// A lease is "terminated" once an end or termination date has passed
    /// server-side; the server flags it through `status`-less date fields,
    /// so the client derives it.
    pub fn lease_ended(&self, today: NaiveDate) -> bool {
        let ended = |raw: &Option<String>| {
            raw.as_deref()
                .and_then(|value| NaiveDate::parse_from_str(value, "%d/%m/%Y").ok())
                .map(|date| date < today)
                .unwrap_or(false)
        };
        ended(&self.termination_date) || ended(&self.end_date)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub address: Option<serde_json::Value>,
    #[serde(default)]
    pub price: f64,
    /// Current occupant's display name when the property is rented.
    #[serde(default)]
    pub occupant_label: Option<String>,
    #[serde(default)]
    pub available: bool,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lease {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub number_of_terms: Option<i32>,
    #[serde(default)]
    pub time_range: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub system: bool,
}

/// A realm: one landlord organization the signed-in user belongs to.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Organization {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_en_locale")]
    pub locale: String,
    #[serde(default = "default_currency_eur")]
    pub currency: String,
    #[serde(default)]
    pub is_company: bool,
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub members: Vec<serde_json::Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub template_type: Option<String>,
    /// Rich-text document tree; opaque to the client.
    #[serde(default)]
    pub contents: serde_json::Value,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub linked_resource_ids: Vec<String>,
}

/// One merge field the contract editor can insert into a template,
/// e.g. marker `tenant.name`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateField {
    #[serde(default)]
    pub marker: String,
    #[serde(default)]
    pub label: Option<String>,
    #[serde(rename = "type", default)]
    pub field_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    #[serde(default)]
    pub tenant_count: u32,
    #[serde(default)]
    pub property_count: u32,
    #[serde(default)]
    pub started_lease_count: u32,
    #[serde(default)]
    pub occupancy_rate: f64,
    #[serde(default)]
    pub total_yearly_revenues: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardData {
    #[serde(default)]
    pub overview: DashboardOverview,
    #[serde(default)]
    pub top_unpaid: Vec<serde_json::Value>,
    #[serde(default)]
    pub revenues: Vec<serde_json::Value>,
}

/// One editable payment row of the settlement form, before normalization.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = validate_payment_row))]
pub struct PaymentRow {
    #[serde(default)]
    pub amount: f64,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(rename = "type", default)]
    pub payment_type: PaymentType,
    #[serde(default)]
    pub reference: Option<String>,
}

fn validate_payment_row(row: &PaymentRow) -> Result<(), ValidationError> {
    if row.payment_type != PaymentType::Cash
        && row.amount > 0.0
        && row
            .reference
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .is_empty()
    {
        return Err(ValidationError::new("reference_required"));
    }
    Ok(())
}

/// The whole settlement form for one rent term.
#[derive(Debug, Clone, Default, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SettlementInput {
    #[validate(nested)]
    #[serde(default)]
    pub payments: Vec<PaymentRow>,
    #[serde(default)]
    pub extracharge: f64,
    #[serde(default)]
    pub note_extracharge: Option<String>,
    #[serde(default)]
    pub promo: f64,
    #[serde(default)]
    pub note_promo: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cash_payment_needs_no_reference() {
        let row = PaymentRow {
            amount: 100.0,
            date: None,
            payment_type: PaymentType::Cash,
            reference: None,
        };
        assert!(validate_input(&row).is_ok());
    }

    #[test]
    fn non_cash_payment_requires_reference() {
        let row = PaymentRow {
            amount: 100.0,
            date: None,
            payment_type: PaymentType::Cheque,
            reference: Some("  ".to_string()),
        };
        assert!(matches!(
            validate_input(&row),
            Err(crate::error::Error::Validation(_))
        ));

        let row = PaymentRow {
            reference: Some("CHQ-4412".to_string()),
            ..row
        };
        assert!(validate_input(&row).is_ok());
    }

    #[test]
    fn settlement_validates_rows_transitively() {
        let input = SettlementInput {
            payments: vec![PaymentRow {
                amount: 50.0,
                date: None,
                payment_type: PaymentType::Transfer,
                reference: None,
            }],
            ..Default::default()
        };
        assert!(validate_input(&input).is_err());
    }

    #[test]
    fn rent_deserializes_with_missing_email_status() {
        let rent: Rent = serde_json::from_value(serde_json::json!({
            "_id": "r1",
            "term": "202608",
            "totalAmount": 1000.0,
            "payments": [{"amount": 400.0, "type": "cash"}]
        }))
        .unwrap();
        assert!(rent.email_status.is_none());
        assert_eq!(rent.payments.len(), 1);
        assert_eq!(rent.total_amount, 1000.0);
    }

    #[test]
    fn lease_end_detection_uses_wire_date_format() {
        let tenant = Tenant {
            end_date: Some("01/07/2026".to_string()),
            ..Default::default()
        };
        let today = NaiveDate::from_ymd_opt(2026, 8, 25).unwrap();
        assert!(tenant.lease_ended(today));

        let current = Tenant {
            end_date: Some("31/12/2026".to_string()),
            ..Default::default()
        };
        assert!(!current.lease_ended(today));
    }
}
