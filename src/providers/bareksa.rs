use crate::core::nav::{DATE_FORMAT, RawNav};
use crate::core::{PriceSeries, PriceSeriesSource, SeriesRequest, ValuationError};
use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, error};

#[derive(Debug, Deserialize)]
struct BareksaResponse {
    status: bool,
    data: BareksaData,
}

#[derive(Debug, Deserialize)]
struct BareksaData {
    datas: Vec<BareksaFund>,
}

#[derive(Debug, Deserialize)]
struct BareksaFund {
    pname: String,
    nav: Vec<BareksaNav>,
}

#[derive(Debug, Deserialize)]
struct BareksaNav {
    date: String,
    value: String,
}

/// NAV history from the Bareksa product endpoint.
///
/// Every fetch is a single request bounded by the client timeout. Nothing is
/// retried or cached.
pub struct BareksaProvider {
    base_url: String,
    timeout: Duration,
    client: reqwest::Client,
}

impl BareksaProvider {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("navgrow/1.0")
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(BareksaProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            client,
        })
    }

    fn series_url(&self, request: &SeriesRequest) -> String {
        format!(
            "{}/ajax/mutualfund/nav/product1/?id={}&cperiod={}&startdate={}&enddate={}",
            self.base_url,
            request.pid,
            request.period,
            request.start.format(DATE_FORMAT),
            request.end.format(DATE_FORMAT),
        )
    }

    fn transport_error(&self, err: reqwest::Error) -> ValuationError {
        if err.is_timeout() {
            ValuationError::SourceTimeout(format!(
                "no response within {}s: {err}",
                self.timeout.as_secs_f64()
            ))
        } else {
            ValuationError::SourceUnavailable(err.to_string())
        }
    }
}

#[async_trait]
impl PriceSeriesSource for BareksaProvider {
    async fn fetch_series(&self, request: &SeriesRequest) -> Result<PriceSeries, ValuationError> {
        request.validate()?;

        let url = self.series_url(request);
        debug!("Requesting NAV series from {}", url);

        let response = self
            .client
            .get(&url)
            .header("X-Requested-With", "XMLHttpRequest")
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ValuationError::SourceUnavailable(format!(
                "HTTP {status} for fund {}",
                request.pid
            )));
        }

        let response_text = response
            .text()
            .await
            .map_err(|e| self.transport_error(e))?;

        if response_text.trim().is_empty() {
            return Err(ValuationError::MalformedResponse(format!(
                "empty response for fund {}",
                request.pid
            )));
        }

        let parsed: BareksaResponse = match serde_json::from_str(&response_text) {
            Ok(parsed) => parsed,
            Err(e) => {
                error!(
                    error = ?e,
                    response = %response_text,
                    "Failed to parse NAV response"
                );
                return Err(ValuationError::MalformedResponse(format!(
                    "{e} for fund {}. Response: '{response_text}'",
                    request.pid
                )));
            }
        };

        if !parsed.status {
            return Err(ValuationError::SourceUnavailable(format!(
                "source reported an unsuccessful status for fund {}",
                request.pid
            )));
        }

        let Some(fund) = parsed
            .data
            .datas
            .into_iter()
            .next()
            .filter(|fund| !fund.nav.is_empty())
        else {
            return Err(ValuationError::NoDataInRange {
                start: request.start,
                end: request.end,
            });
        };

        debug!(
            "Fetched {} NAV rows for {} ({})",
            fund.nav.len(),
            fund.pname,
            request.pid
        );

        Ok(PriceSeries {
            product_name: fund.pname,
            points: fund
                .nav
                .into_iter()
                .map(|nav| RawNav {
                    date: nav.date,
                    value: nav.value,
                })
                .collect(),
        })
    }
}
