// src/edgar/models.rs
use crate::utils::error::EdgarError;
use serde::Deserialize;
use std::fmt;

/// Central Index Key. Stored as a number, rendered zero-padded to 10 digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cik(u64);

impl Cik {
    pub fn new(value: u64) -> Self {
        Self(value)
    }

    /// The raw number, as used in archive paths.
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn padded(&self) -> String {
        format!("{:010}", self.0)
    }
}

impl fmt::Display for Cik {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:010}", self.0)
    }
}

/// The registry is inconsistent about whether numeric ids are JSON numbers or strings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    Text(String),
}

impl NumberOrString {
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// One row of the ticker mapping document
/// (https://www.sec.gov/files/company_tickers.json).
#[derive(Debug, Clone, Deserialize)]
pub struct TickerRow {
    #[serde(default)]
    pub ticker: String,
    pub cik_str: NumberOrString,
}

/// The subset of the company submissions index we rely on.
/// Example: https://data.sec.gov/submissions/CIK0000320193.json
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanySubmission {
    #[serde(default)]
    pub cik: Option<NumberOrString>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub filings: Option<Filings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct Filings {
    #[serde(default)]
    pub recent: Option<FilingsList>,
}

/// Parallel arrays, one entry per filing, newest first.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilingsList {
    #[serde(default)]
    pub form: Option<Vec<String>>,
    #[serde(default)]
    pub filing_date: Option<Vec<String>>,
    #[serde(default)]
    pub accession_number: Option<Vec<String>>,
    #[serde(default)]
    pub primary_document: Option<Vec<String>>,
}

impl CompanySubmission {
    pub fn cik(&self) -> Result<Cik, EdgarError> {
        let raw = self
            .cik
            .as_ref()
            .ok_or_else(|| EdgarError::MalformedSubmissions("missing cik".to_string()))?;
        raw.as_u64()
            .map(Cik::new)
            .ok_or_else(|| EdgarError::MalformedSubmissions(format!("cik {:?} is not numeric", raw)))
    }

    /// `name`, then `entityName`, then "Unknown"; blank values are skipped.
    pub fn display_name(&self) -> String {
        [self.name.as_deref(), self.entity_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|n| !n.is_empty())
            .unwrap_or("Unknown")
            .to_string()
    }

    /// Zips the recent-filings arrays into records. A missing section yields no records.
    pub fn recent_filings(&self) -> Result<Vec<FilingRecord>, EdgarError> {
        let cik = self.cik()?;
        let company_name = self.display_name();
        let recent = self.filings.as_ref().and_then(|f| f.recent.as_ref());

        let forms = column(recent.map(|r| &r.form));
        let dates = column(recent.map(|r| &r.filing_date));
        let accessions = column(recent.map(|r| &r.accession_number));
        let documents = column(recent.map(|r| &r.primary_document));

        if !(forms.len() == dates.len() && dates.len() == accessions.len() && accessions.len() == documents.len()) {
            return Err(EdgarError::MalformedSubmissions(format!(
                "recent filings arrays have mismatched lengths (form={}, filingDate={}, accessionNumber={}, primaryDocument={})",
                forms.len(),
                dates.len(),
                accessions.len(),
                documents.len()
            )));
        }

        Ok(forms
            .iter()
            .zip(dates)
            .zip(accessions)
            .zip(documents)
            .map(|(((form, date), accession), document)| FilingRecord {
                cik,
                company_name: company_name.clone(),
                form: form.clone(),
                filing_date: date.clone(),
                accession_number: accession.clone(),
                primary_document: document.clone(),
            })
            .collect())
    }
}

fn column(col: Option<&Option<Vec<String>>>) -> &[String] {
    col.and_then(|c| c.as_deref()).unwrap_or(&[])
}

/// One row of a company's filing history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingRecord {
    pub cik: Cik,
    pub company_name: String,
    pub form: String,
    pub filing_date: String,
    pub accession_number: String,
    pub primary_document: String,
}

/// The filing picked for this run, together with the form list used to find it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilingSelection {
    pub filing: FilingRecord,
    pub candidate_forms: Vec<String>,
}
