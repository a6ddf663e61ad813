use crate::schemas::Rent;

/// Where one rent term stands against its grand total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RentPaymentStatus {
    Paid,
    PartiallyPaid,
    NotPaid,
}

impl RentPaymentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paid => "paid",
            Self::PartiallyPaid => "partially_paid",
            Self::NotPaid => "not_paid",
        }
    }
}

/// Sum of recorded payments. Rows with a non-positive amount are form
/// leftovers and never count.
pub fn payments_total(rent: &Rent) -> f64 {
    rent.payments
        .iter()
        .filter(|payment| payment.amount > 0.0)
        .map(|payment| payment.amount)
        .sum()
}

/// Remaining amount due for the term: grand total minus counted payments.
/// Positive means still owed; zero or negative means settled (or in credit).
pub fn new_balance(rent: &Rent) -> f64 {
    rent.total_amount - payments_total(rent)
}

/// A term counts as paid when nothing remains due, or when the server has
/// explicitly marked it paid (e.g. written off).
pub fn rent_paid(rent: &Rent) -> bool {
    new_balance(rent) <= 0.0 || rent.status.as_deref() == Some("paid")
}

pub fn payment_status(rent: &Rent) -> RentPaymentStatus {
    if rent_paid(rent) {
        return RentPaymentStatus::Paid;
    }
    if payments_total(rent) > 0.0 {
        return RentPaymentStatus::PartiallyPaid;
    }
    RentPaymentStatus::NotPaid
}

/// Rewrite the derived fields on a fetched or freshly patched record so the
/// cached copy always agrees with its own payments array.
pub fn refresh_derived_fields(rent: &mut Rent) {
    rent.new_balance = new_balance(rent);
    if rent.status.as_deref() != Some("paid") {
        rent.status = Some(payment_status(rent).as_str().to_string());
    }
}
