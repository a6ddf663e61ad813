use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::schemas::{validate_input, Payment, PaymentRow, PaymentType, SettlementInput};

const WIRE_DATE_FORMAT: &str = "%d/%m/%Y";

/// Turn a settlement form into the partial-update payload for
/// `PATCH /rents/payment/{id}`.
///
/// Rows with a non-positive amount are dropped, dates are serialized as
/// `DD/MM/YYYY`, and `reference` is stripped from cash rows. Extra charge,
/// promo and description only travel when they carry something.
pub fn normalize_settlement(input: &SettlementInput) -> Result<Value> {
    validate_input(input)?;

    let payments: Vec<Value> = input
        .payments
        .iter()
        .filter(|row| row.amount > 0.0)
        .map(|row| {
            let mut payment = Map::new();
            payment.insert("amount".to_string(), Value::from(row.amount));
            if let Some(date) = row.date {
                payment.insert(
                    "date".to_string(),
                    Value::String(date.format(WIRE_DATE_FORMAT).to_string()),
                );
            }
            payment.insert(
                "type".to_string(),
                serde_json::to_value(row.payment_type).unwrap_or(Value::Null),
            );
            if row.payment_type != PaymentType::Cash {
                if let Some(reference) = row.reference.as_deref().map(str::trim) {
                    if !reference.is_empty() {
                        payment.insert(
                            "reference".to_string(),
                            Value::String(reference.to_string()),
                        );
                    }
                }
            }
            Value::Object(payment)
        })
        .collect();

    let mut payload = Map::new();
    payload.insert("payments".to_string(), Value::Array(payments));

    if input.extracharge > 0.0 {
        payload.insert("extracharge".to_string(), Value::from(input.extracharge));
        if let Some(note) = non_empty(&input.note_extracharge) {
            payload.insert("noteextracharge".to_string(), Value::String(note));
        }
    }
    if input.promo > 0.0 {
        payload.insert("promo".to_string(), Value::from(input.promo));
        if let Some(note) = non_empty(&input.note_promo) {
            payload.insert("notepromo".to_string(), Value::String(note));
        }
    }
    if let Some(description) = non_empty(&input.description) {
        payload.insert("description".to_string(), Value::String(description));
    }

    Ok(Value::Object(payload))
}

pub fn parse_wire_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), WIRE_DATE_FORMAT)
        .map_err(|_| Error::Validation(format!("invalid date '{raw}', expected DD/MM/YYYY")))
}

/// Prefill settlement form rows from a rent's recorded payments, parsing
/// the wire dates back into calendar dates. A malformed stored date is a
/// server-side corruption worth surfacing, not skipping.
pub fn payment_rows_from(payments: &[Payment]) -> Result<Vec<PaymentRow>> {
    payments
        .iter()
        .map(|payment| {
            let date = payment
                .date
                .as_deref()
                .map(parse_wire_date)
                .transpose()?;
            Ok(PaymentRow {
                amount: payment.amount,
                date,
                payment_type: payment.payment_type,
                reference: payment.reference.clone(),
            })
        })
        .collect()
}

fn non_empty(raw: &Option<String>) -> Option<String> {
    raw.as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schemas::PaymentRow;

    fn row(amount: f64, payment_type: PaymentType, reference: Option<&str>) -> PaymentRow {
        PaymentRow {
            amount,
            date: NaiveDate::from_ymd_opt(2026, 8, 25),
            payment_type,
            reference: reference.map(ToOwned::to_owned),
        }
    }

    #[test]
    fn drops_empty_rows_and_formats_dates() {
        let input = SettlementInput {
            payments: vec![
                row(400.0, PaymentType::Cash, None),
                row(0.0, PaymentType::Cash, None),
                row(-10.0, PaymentType::Cash, None),
            ],
            ..Default::default()
        };
        let payload = normalize_settlement(&input).unwrap();
        let payments = payload["payments"].as_array().unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0]["amount"], 400.0);
        assert_eq!(payments[0]["date"], "25/08/2026");
        assert_eq!(payments[0]["type"], "cash");
    }

    #[test]
    fn cash_rows_never_carry_a_reference() {
        let input = SettlementInput {
            payments: vec![row(100.0, PaymentType::Cash, Some("ignored"))],
            ..Default::default()
        };
        let payload = normalize_settlement(&input).unwrap();
        assert!(payload["payments"][0].get("reference").is_none());
    }

    #[test]
    fn non_cash_row_keeps_reference_or_fails() {
        let ok = SettlementInput {
            payments: vec![row(100.0, PaymentType::Transfer, Some("VIR-2026-113"))],
            ..Default::default()
        };
        let payload = normalize_settlement(&ok).unwrap();
        assert_eq!(payload["payments"][0]["reference"], "VIR-2026-113");

        let missing = SettlementInput {
            payments: vec![row(100.0, PaymentType::Transfer, None)],
            ..Default::default()
        };
        assert!(matches!(
            normalize_settlement(&missing),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn charges_and_notes_only_travel_when_set() {
        let bare = normalize_settlement(&SettlementInput::default()).unwrap();
        assert!(bare.get("extracharge").is_none());
        assert!(bare.get("promo").is_none());
        assert!(bare.get("description").is_none());

        let input = SettlementInput {
            extracharge: 35.0,
            note_extracharge: Some("Broken window".to_string()),
            promo: 20.0,
            note_promo: Some(" ".to_string()),
            description: Some("August settlement".to_string()),
            ..Default::default()
        };
        let payload = normalize_settlement(&input).unwrap();
        assert_eq!(payload["extracharge"], 35.0);
        assert_eq!(payload["noteextracharge"], "Broken window");
        assert_eq!(payload["promo"], 20.0);
        assert!(payload.get("notepromo").is_none());
        assert_eq!(payload["description"], "August settlement");
    }

    #[test]
    fn parses_wire_dates() {
        assert_eq!(
            parse_wire_date("25/08/2026").unwrap(),
            NaiveDate::from_ymd_opt(2026, 8, 25).unwrap()
        );
        assert!(parse_wire_date("2026-08-25").is_err());
    }

    #[test]
    fn prefills_form_rows_from_recorded_payments() {
        let payments = vec![
            Payment {
                amount: 400.0,
                date: Some("25/08/2026".to_string()),
                payment_type: PaymentType::Transfer,
                reference: Some("VIR-2026-113".to_string()),
            },
            Payment {
                amount: 50.0,
                date: None,
                payment_type: PaymentType::Cash,
                reference: None,
            },
        ];
        let rows = payment_rows_from(&payments).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2026, 8, 25));
        assert_eq!(rows[0].reference.as_deref(), Some("VIR-2026-113"));
        assert!(rows[1].date.is_none());

        let corrupt = vec![Payment {
            amount: 10.0,
            date: Some("2026-08-25".to_string()),
            payment_type: PaymentType::Cash,
            reference: None,
        }];
        assert!(matches!(
            payment_rows_from(&corrupt),
            Err(Error::Validation(_))
        ));
    }
}
