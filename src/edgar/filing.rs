// src/edgar/filing.rs
use crate::edgar::models::{CompanySubmission, FilingRecord, FilingSelection};
use crate::utils::error::EdgarError;
use serde::Deserialize;

/// Picks the most recent qualifying annual report out of a submissions payload.
#[derive(Debug, Clone)]
pub struct FilingSelector {
    candidate_forms: Vec<String>,
    allow_fallback: bool,
}

impl FilingSelector {
    /// `candidate_forms` is in priority order (e.g. `10-K`, then `10-K/A`).
    /// Without fallback only the first form is ever considered.
    pub fn new(candidate_forms: Vec<String>, allow_fallback: bool) -> Self {
        Self { candidate_forms, allow_fallback }
    }

    pub fn select_latest(&self, payload: &serde_json::Value) -> Result<FilingSelection, EdgarError> {
        let submission = CompanySubmission::deserialize(payload)
            .map_err(|e| EdgarError::MalformedSubmissions(e.to_string()))?;
        let filings = submission.recent_filings()?;
        tracing::debug!("Submissions list {} recent filings", filings.len());

        let filing = self
            .pick(&filings)
            .cloned()
            .ok_or_else(|| EdgarError::NoQualifyingFiling { forms: self.considered_forms().to_vec() })?;

        Ok(FilingSelection {
            filing,
            candidate_forms: self.candidate_forms.clone(),
        })
    }

    fn considered_forms(&self) -> &[String] {
        if self.allow_fallback {
            &self.candidate_forms
        } else {
            &self.candidate_forms[..self.candidate_forms.len().min(1)]
        }
    }

    /// Forms are tried in order; within a form the first row wins since the
    /// registry lists filings newest first.
    fn pick<'a>(&self, filings: &'a [FilingRecord]) -> Option<&'a FilingRecord> {
        self.considered_forms()
            .iter()
            .find_map(|form| filings.iter().find(|f| &f.form == form))
    }
}
