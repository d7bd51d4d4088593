// src/utils/config.rs
use crate::edgar::models::Cik;
use crate::utils::error::AppError;

pub const SUBMISSIONS_URL_TEMPLATE_VAR: &str = "SEC_SUBMISSIONS_URL_TEMPLATE";
pub const FILING_DOC_URL_TEMPLATE_VAR: &str = "SEC_FILING_DOC_URL_TEMPLATE";
pub const FORMS_VAR: &str = "SEC_10K_FORMS";
pub const TICKER_MAPPING_URL_VAR: &str = "SEC_TICKER_MAPPING_URL";

/// Environment-derived settings, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub submissions_url_template: String,
    pub filing_doc_url_template: String,
    /// Qualifying form types in priority order: primary first, fallbacks after.
    pub candidate_forms: Vec<String>,
    pub ticker_mapping_url: String,
}

impl AppConfig {
    /// Loads `.env` (if any) and reads the process environment.
    pub fn from_env() -> Result<Self, AppError> {
        match dotenvy::dotenv() {
            Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
            Err(e) if e.not_found() => tracing::debug!("No .env file found"),
            Err(e) => return Err(AppError::Config(format!("Failed to read .env: {}", e))),
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup. Missing or blank values fail fast.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, AppError> {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| AppError::Config(format!("Missing required environment variable {}", key)))
        };

        let submissions_url_template = required(SUBMISSIONS_URL_TEMPLATE_VAR)?;
        require_placeholders(SUBMISSIONS_URL_TEMPLATE_VAR, &submissions_url_template, &["{cik_10}"])?;

        let filing_doc_url_template = required(FILING_DOC_URL_TEMPLATE_VAR)?;
        require_placeholders(
            FILING_DOC_URL_TEMPLATE_VAR,
            &filing_doc_url_template,
            &["{cik_no_zeros}", "{accession_no_dashes}", "{primary_document}"],
        )?;

        let candidate_forms = parse_form_list(&required(FORMS_VAR)?);
        if candidate_forms.is_empty() {
            return Err(AppError::Config(format!("{} lists no form types", FORMS_VAR)));
        }

        Ok(Self {
            submissions_url_template,
            filing_doc_url_template,
            candidate_forms,
            ticker_mapping_url: required(TICKER_MAPPING_URL_VAR)?,
        })
    }

    pub fn submissions_url(&self, cik: &Cik) -> String {
        self.submissions_url_template.replace("{cik_10}", &cik.padded())
    }

    pub fn filing_doc_url(&self, cik: &Cik, accession_number: &str, primary_document: &str) -> String {
        self.filing_doc_url_template
            .replace("{cik_no_zeros}", &cik.value().to_string())
            .replace("{accession_no_dashes}", &accession_number.replace('-', ""))
            .replace("{primary_document}", primary_document)
    }
}

fn require_placeholders(var: &str, template: &str, placeholders: &[&str]) -> Result<(), AppError> {
    let missing: Vec<&str> = placeholders
        .iter()
        .copied()
        .filter(|p| !template.contains(p))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(AppError::Config(format!("{} is missing placeholder(s) {}", var, missing.join(", "))))
    }
}

/// Splits a comma separated form list, dropping blanks but keeping order.
pub fn parse_form_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .collect()
}
