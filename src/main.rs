use std::sync::Arc;

use chrono::{Datelike, Utc};
use tracing_subscriber::EnvFilter;

use rentfolio_client::services::{balance, notices};
use rentfolio_client::{ApiClient, ClientConfig, Store};

/// Diagnostic client: sign in with env credentials, fetch the current
/// period's rents and log a collection summary.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let _ = dotenvy::dotenv();
    init_tracing();

    let config = ClientConfig::from_env();
    let (Some(email), Some(password)) = (
        config.landlord_email.clone(),
        config.landlord_password.clone(),
    ) else {
        tracing::error!("RENTFOLIO_EMAIL and RENTFOLIO_PASSWORD must be set");
        std::process::exit(2);
    };

    tracing::info!(
        base_url = %config.base_url,
        api_prefix = %config.api_prefix,
        locale = %config.locale,
        "Rentfolio client starting"
    );

    let client = Arc::new(ApiClient::new(config)?);
    let mut store = Store::new(client.clone());

    if let Err(error) = client.sign_in(&email, &password).await {
        tracing::error!(%error, "Sign-in failed: {}", error.user_message());
        std::process::exit(1);
    }

    let realm_count = store.organizations.fetch().await?.len();
    match store.organizations.selected() {
        Some(realm) => tracing::info!(realm = %realm.name, "Using realm"),
        None => tracing::warn!(count = realm_count, "No realm selected"),
    }

    let today = Utc::now().date_naive();
    store.rents.fetch(today.year(), today.month()).await?;
    let totals = store.rents.totals();
    tracing::info!(
        year = today.year(),
        month = today.month(),
        rents = store.rents.items().len(),
        paid = totals.paid_count,
        partially_paid = totals.partially_paid_count,
        not_paid = totals.not_paid_count,
        to_collect = totals.total_to_collect,
        collected = totals.total_collected,
        "Period summary"
    );

    let english = client.config().english_locale();
    for rent in store.rents.items().iter().filter(|rent| !balance::rent_paid(rent)) {
        for state in notices::notice_states(rent.email_status.as_ref(), english) {
            if let Some(sent_on) = state.sent_on {
                tracing::info!(
                    tenant = %rent.occupant.name,
                    notice = state.kind.as_str(),
                    %sent_on,
                    "Unpaid rent notice"
                );
            }
        }
    }

    client.sign_out().await?;
    Ok(())
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}
