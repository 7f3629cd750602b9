//! Retrieval of calendar feeds over HTTP.

use anyhow::{Context, Error};
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use tracing::info;
use url::Url;

use crate::{
    aggregate::Report,
    report::{default_cutoff, report_from_str, DEFAULT_DAYS},
};

/// Download the raw iCalendar text at `url`.
///
/// Transport errors and non-2xx responses are returned as errors; there are
/// no retries.
pub async fn fetch_calendar(client: &Client, url: &Url) -> Result<String, Error> {
    info!(%url, "fetching calendar");

    let response = client
        .get(url.clone())
        .send()
        .await
        .with_context(|| format!("fetching {}", url))?
        .error_for_status()
        .with_context(|| format!("fetching {}", url))?;

    let text = response
        .text()
        .await
        .with_context(|| format!("reading body of {}", url))?;

    info!(%url, bytes = text.len(), "fetched calendar");

    Ok(text)
}

/// Fetch the calendar at `url` and report on the last week of it, counting
/// back from `now`.
pub async fn time_tracking(client: &Client, url: &Url, now: &DateTime<Tz>) -> Result<Report, Error> {
    let cutoff = default_cutoff(now, DEFAULT_DAYS)?;
    let text = fetch_calendar(client, url).await?;

    report_from_str(&cutoff, &text)
}
