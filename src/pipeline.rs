// src/pipeline.rs
use crate::converters::{html_to_text, render_pdf};
use crate::edgar::backoff::Sleeper;
use crate::edgar::client::SecClient;
use crate::edgar::filing::FilingSelector;
use crate::edgar::models::FilingSelection;
use crate::edgar::resolver::{CompanyTarget, IdentifierResolver};
use crate::storage::{FilingMetadata, SourceUrls, StorageManager, HTML_FILE, METADATA_FILE, PDF_FILE, TEXT_FILE};
use crate::utils::config::AppConfig;
use crate::utils::AppError;
use std::path::PathBuf;

/// Files written for one filing, before PDF rendering.
#[derive(Debug)]
pub struct ArchivedFiling {
    pub selection: FilingSelection,
    pub out_dir: PathBuf,
    pub html_path: PathBuf,
}

/// Resolve → submissions → select → document → text → disk → PDF.
pub struct Pipeline<'a, S> {
    client: &'a SecClient<S>,
    config: &'a AppConfig,
    selector: FilingSelector,
    storage: StorageManager,
}

impl<'a, S: Sleeper> Pipeline<'a, S> {
    pub fn new(client: &'a SecClient<S>, config: &'a AppConfig, allow_fallback: bool, storage: StorageManager) -> Self {
        let selector = FilingSelector::new(config.candidate_forms.clone(), allow_fallback);
        Self { client, config, selector, storage }
    }

    /// Runs every stage. Returns the output directory.
    pub async fn run(&self, target: &CompanyTarget) -> Result<PathBuf, AppError> {
        let archived = self.archive(target).await?;

        let pdf_path = archived.out_dir.join(PDF_FILE);
        tracing::info!("Writing PDF: {}", pdf_path.display());
        render_pdf(archived.html_path, pdf_path).await?;

        let filing = &archived.selection.filing;
        tracing::info!(
            company = %filing.company_name,
            form = %filing.form,
            accession = %filing.accession_number,
            "Done"
        );
        Ok(archived.out_dir)
    }

    /// Every stage except PDF rendering.
    pub async fn archive(&self, target: &CompanyTarget) -> Result<ArchivedFiling, AppError> {
        tracing::info!("Resolving CIK");
        let resolver = IdentifierResolver::new(self.client, &self.config.ticker_mapping_url);
        let cik = resolver.resolve(target).await?;

        tracing::info!("Fetching submissions json: cik={}", cik);
        let submissions_url = self.config.submissions_url(&cik);
        let submissions = self.client.fetch_json(&submissions_url, None).await?;

        let selection = self.selector.select_latest(&submissions)?;
        let filing = &selection.filing;
        tracing::info!(
            form = %filing.form,
            filing_date = %filing.filing_date,
            accession = %filing.accession_number,
            primary_doc = %filing.primary_document,
            candidates = ?selection.candidate_forms,
            "Picked filing"
        );

        tracing::info!("Fetching filing document");
        let doc_url = self
            .config
            .filing_doc_url(&filing.cik, &filing.accession_number, &filing.primary_document);
        let html = self.client.fetch_text(&doc_url, None).await?;

        tracing::info!("Converting HTML to text");
        let text = html_to_text(&html);

        let out_dir = self.storage.make_output_dir(&filing.cik, &filing.accession_number)?;
        tracing::info!("Writing output: {}", out_dir.display());

        let metadata = FilingMetadata::new(
            filing,
            SourceUrls {
                submissions: submissions_url,
                filing_document: doc_url,
            },
            chrono::Utc::now(),
        );
        let html_path = out_dir.join(HTML_FILE);
        self.storage.write_json(&out_dir.join(METADATA_FILE), &metadata)?;
        self.storage.write_text(&html_path, &html)?;
        self.storage.write_text(&out_dir.join(TEXT_FILE), &text)?;

        Ok(ArchivedFiling { selection, out_dir, html_path })
    }
}
