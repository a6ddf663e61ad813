use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

use crate::schemas::{Property, Rent, Tenant};

/// Fold text for matching: decompose, drop accents, drop whitespace,
/// periods and hyphens, lowercase. Idempotent.
pub fn fold(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| !c.is_whitespace() && *c != '.' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn contains_folded(haystack: &str, folded_needle: &str) -> bool {
    fold(haystack).contains(folded_needle)
}

/// Free-text match over a tenant: name, manager (companies only), then each
/// contact's name/email/phone. Empty needle matches everything.
pub fn tenant_matches(tenant: &Tenant, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    if contains_folded(&tenant.name, folded_needle) {
        return true;
    }
    if tenant.is_company {
        if let Some(manager) = tenant.manager.as_deref() {
            if contains_folded(manager, folded_needle) {
                return true;
            }
        }
    }
    tenant.contacts.iter().any(|contact| {
        contains_folded(&contact.name, folded_needle)
            || contains_folded(&contact.email, folded_needle)
            || contains_folded(&contact.phone, folded_needle)
    })
}

pub fn property_matches(property: &Property, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    contains_folded(&property.name, folded_needle)
        || property
            .occupant_label
            .as_deref()
            .map(|label| contains_folded(label, folded_needle))
            .unwrap_or(false)
}

/// Rents are searched through their occupant reference.
pub fn rent_matches(rent: &Rent, folded_needle: &str) -> bool {
    if folded_needle.is_empty() {
        return true;
    }
    contains_folded(&rent.occupant.name, folded_needle)
        || rent
            .occupant
            .reference
            .as_deref()
            .map(|reference| contains_folded(reference, folded_needle))
            .unwrap_or(false)
}
