//! Sanction letter rendering.
//!
//! Letters are rendered from an HTML template and converted to PDF with `wkhtmltopdf` when it is
//! installed. Without the converter, or when conversion fails, the HTML letter is kept instead.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use tera::{Context, Tera};
use tokio::process::Command;
use tracing::{info, warn};

use loanline_agent::messages::format_rupees;
use loanline_core::config::DocumentConfig;
use loanline_core::documents::{
    artifact_file_name, disbursement_date, loan_account_number, sanction_reference,
    validate_sanction_inputs, DocumentEmitter, DocumentError, SanctionArtifact,
};
use loanline_core::domain::customer::CustomerProfile;
use loanline_core::domain::loan::LoanDetails;

const TEMPLATE_NAME: &str = "sanction_letter.html.tera";
const PDF_CONTENT_TYPE: &str = "application/pdf";
const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// Registers the `rupees` filter used by the letter template, e.g. `loan.monthly_emi | rupees`.
pub fn register_template_filters(tera: &mut Tera) {
    tera.register_filter("rupees", tera_rupees_filter);
}

fn tera_rupees_filter(
    value: &tera::Value,
    _args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let amount = match value {
        tera::Value::Number(number) => number.as_f64().unwrap_or(0.0),
        tera::Value::Null => 0.0,
        _ => return Err(tera::Error::msg("rupees filter expects a number")),
    };
    Ok(tera::Value::String(format_rupees(amount)))
}

#[derive(Clone, Debug, Serialize)]
struct LenderContext<'a> {
    name: &'a str,
    support_phone: &'a str,
    support_email: &'a str,
}

/// Writes sanction letters into the configured output directory.
#[derive(Clone, Debug)]
pub struct SanctionLetterEmitter {
    tera: Tera,
    output_dir: PathBuf,
    lender_name: String,
    support_phone: String,
    support_email: String,
    wkhtmltopdf_path: Option<PathBuf>,
}

impl SanctionLetterEmitter {
    /// Loads the embedded template and looks up `wkhtmltopdf` on the `PATH`.
    pub fn new(config: &DocumentConfig) -> Result<Self, DocumentError> {
        let mut tera = Tera::default();
        register_template_filters(&mut tera);
        tera.add_raw_template(
            TEMPLATE_NAME,
            include_str!("../../../templates/sanction_letter.html.tera"),
        )
        .map_err(|error| DocumentError::Render(error.to_string()))?;

        let wkhtmltopdf_path = which::which("wkhtmltopdf").ok();
        match &wkhtmltopdf_path {
            Some(path) => info!(
                event_name = "document.converter_found",
                path = %path.display(),
                "wkhtmltopdf found"
            ),
            None => warn!(
                event_name = "document.converter_missing",
                "wkhtmltopdf not found in PATH - sanction letters will be written as HTML"
            ),
        }

        Ok(Self {
            tera,
            output_dir: config.output_dir.clone(),
            lender_name: config.lender_name.clone(),
            support_phone: config.support_phone.clone(),
            support_email: config.support_email.clone(),
            wkhtmltopdf_path,
        })
    }

    /// Overrides converter discovery. `None` always writes HTML.
    pub fn with_converter(mut self, wkhtmltopdf_path: Option<PathBuf>) -> Self {
        self.wkhtmltopdf_path = wkhtmltopdf_path;
        self
    }

    pub fn renders_pdf(&self) -> bool {
        self.wkhtmltopdf_path.is_some()
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn render_html(
        &self,
        profile: &CustomerProfile,
        loan: &LoanDetails,
        reference_number: &str,
        account_number: &str,
    ) -> Result<String, DocumentError> {
        let today = Utc::now().date_naive();
        let mut context = Context::new();
        context.insert(
            "lender",
            &LenderContext {
                name: &self.lender_name,
                support_phone: &self.support_phone,
                support_email: &self.support_email,
            },
        );
        context.insert("reference_number", reference_number);
        context.insert("loan_account_number", account_number);
        context.insert("sanction_date", &today.format("%d %B %Y").to_string());
        let disbursement = disbursement_date(today).format("%d %B %Y").to_string();
        context.insert("disbursement_date", &disbursement);
        context.insert("customer", profile);
        context.insert("loan", loan);
        context.insert("tenure_years", &(loan.tenure_months / 12));
        context.insert("tenure_remainder", &(loan.tenure_months % 12));

        self.tera
            .render(TEMPLATE_NAME, &context)
            .map_err(|error| DocumentError::Render(error.to_string()))
    }

    async fn convert_html_to_pdf(
        &self,
        html: &str,
        wkhtmltopdf_path: &Path,
        pdf_path: &Path,
    ) -> Result<(), DocumentError> {
        let html_path = pdf_path.with_extension("source.html");
        tokio::fs::write(&html_path, html).await.map_err(io_error)?;

        let output = Command::new(wkhtmltopdf_path)
            .args(["--page-size", "A4", "--encoding", "utf-8", "--quiet"])
            .args(["--margin-top", "10mm", "--margin-bottom", "10mm"])
            .args(["--margin-left", "10mm", "--margin-right", "10mm"])
            .arg(&html_path)
            .arg(pdf_path)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await;
        let _ = tokio::fs::remove_file(&html_path).await;

        let output = output.map_err(|error| DocumentError::Conversion(error.to_string()))?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(pdf_path).await;
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DocumentError::Conversion(stderr.trim().to_owned()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentEmitter for SanctionLetterEmitter {
    async fn generate(
        &self,
        profile: &CustomerProfile,
        loan: &LoanDetails,
    ) -> Result<SanctionArtifact, DocumentError> {
        validate_sanction_inputs(profile, loan)?;

        let now = Utc::now();
        let reference_number = sanction_reference(now);
        let account_number = loan_account_number(now);
        let html = self.render_html(profile, loan, &reference_number, &account_number)?;

        tokio::fs::create_dir_all(&self.output_dir).await.map_err(io_error)?;

        if let Some(wkhtmltopdf) = &self.wkhtmltopdf_path {
            let file_name =
                artifact_file_name(profile, now.date_naive(), &reference_number, "pdf");
            let path = self.output_dir.join(&file_name);
            match self.convert_html_to_pdf(&html, wkhtmltopdf, &path).await {
                Ok(()) => {
                    info!(
                        event_name = "document.pdf_written",
                        file_name = %file_name,
                        reference_number = %reference_number,
                        "sanction letter converted to PDF"
                    );
                    return Ok(SanctionArtifact {
                        file_name,
                        path,
                        content_type: PDF_CONTENT_TYPE.to_owned(),
                        reference_number,
                        loan_account_number: account_number,
                        generated_at: now,
                    });
                }
                Err(error) => {
                    warn!(
                        event_name = "document.pdf_conversion_failed",
                        error = %error,
                        "PDF conversion failed, falling back to HTML"
                    );
                }
            }
        }

        let file_name = artifact_file_name(profile, now.date_naive(), &reference_number, "html");
        let path = self.output_dir.join(&file_name);
        tokio::fs::write(&path, html).await.map_err(io_error)?;
        info!(
            event_name = "document.html_written",
            file_name = %file_name,
            reference_number = %reference_number,
            "sanction letter written as HTML"
        );

        Ok(SanctionArtifact {
            file_name,
            path,
            content_type: HTML_CONTENT_TYPE.to_owned(),
            reference_number,
            loan_account_number: account_number,
            generated_at: now,
        })
    }
}

fn io_error(error: std::io::Error) -> DocumentError {
    DocumentError::Io(error.to_string())
}
