// src/edgar/resolver.rs
use crate::edgar::backoff::Sleeper;
use crate::edgar::client::SecClient;
use crate::edgar::models::{Cik, TickerRow};
use crate::utils::error::EdgarError;
use serde::Deserialize;

/// How the operator identified the company.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompanyTarget {
    Ticker(String),
    Cik(String),
}

/// Maps tickers to CIKs through the registry's mapping document.
#[derive(Debug)]
pub struct IdentifierResolver<'a, S> {
    client: &'a SecClient<S>,
    mapping_url: &'a str,
}

impl<'a, S: Sleeper> IdentifierResolver<'a, S> {
    pub fn new(client: &'a SecClient<S>, mapping_url: &'a str) -> Self {
        Self { client, mapping_url }
    }

    pub async fn resolve(&self, target: &CompanyTarget) -> Result<Cik, EdgarError> {
        match target {
            CompanyTarget::Ticker(ticker) => self.resolve_from_ticker(ticker).await,
            CompanyTarget::Cik(raw) => resolve_from_identifier(raw),
        }
    }

    /// Gets the CIK (Central Index Key) for a ticker symbol
    pub async fn resolve_from_ticker(&self, ticker: &str) -> Result<Cik, EdgarError> {
        let ticker = ticker.trim().to_uppercase();
        let mapping = self.client.fetch_json(self.mapping_url, None).await?;
        let cik = find_ticker(&mapping, &ticker)?;
        tracing::info!(ticker = %ticker, cik = %cik, "Resolved ticker");
        Ok(cik)
    }
}

/// Exact, case-insensitive scan of the mapping document in document order.
/// No partial matches; the first matching row wins.
pub fn find_ticker(mapping: &serde_json::Value, ticker: &str) -> Result<Cik, EdgarError> {
    let rows = mapping
        .as_object()
        .ok_or_else(|| EdgarError::Parse("ticker mapping is not a JSON object".to_string()))?;

    let wanted = ticker.trim().to_uppercase();
    for (key, raw) in rows {
        let row = TickerRow::deserialize(raw)
            .map_err(|e| EdgarError::Parse(format!("ticker mapping row {} has unexpected shape: {}", key, e)))?;
        if row.ticker.to_uppercase() != wanted {
            continue;
        }
        return row
            .cik_str
            .as_u64()
            .map(Cik::new)
            .ok_or_else(|| EdgarError::Parse(format!("Invalid CIK format for ticker {}: {:?}", wanted, row.cik_str)));
    }

    Err(EdgarError::TickerNotFound(wanted))
}

/// Normalises an operator-supplied CIK: whitespace and leading zeros are dropped
/// and the number is re-padded to 10 digits.
pub fn resolve_from_identifier(raw: &str) -> Result<Cik, EdgarError> {
    raw.trim()
        .parse::<u64>()
        .map(Cik::new)
        .map_err(|source| EdgarError::InvalidIdentifier { raw: raw.to_string(), source })
}
