use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use loanline_core::domain::customer::CustomerId;

const LAKH: f64 = 100_000.0;
const CRORE: f64 = 10_000_000.0;
/// Bare figures below this are treated as incidental numbers rather than loan amounts.
const MIN_BARE_AMOUNT: f64 = 10_000.0;

static CUSTOMER_ID_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcust[-_]?(\d{3,})\b").expect("valid customer id pattern"));

static PHONE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:phone|mobile)(?:\s+(?:no\.?|number))?(?:\s+is)?\s*[:\-]?\s*((?:\+?91[\s-]?)?\d[\d\s-]{8,}\d)",
    )
    .expect("valid phone pattern")
});

static SCALED_AMOUNT_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d+(?:\.\d+)?)\s*(lakhs?|lacs?|l|crores?|cr|k|thousand)\b")
        .expect("valid scaled amount pattern")
});

static FIGURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(₹|\brs\.?|\binr)?\s*(\d{1,3}(?:,\d{2,3})+|\d+)(?:\.\d+)?")
        .expect("valid figure pattern")
});

static TENURE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(\d{1,3})\s*(months?|mnths?|mos?|years?|yrs?)\b")
        .expect("valid tenure pattern")
});

/// Loan details and identifiers stated in one user message.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StatedRequirements {
    pub loan_amount: Option<f64>,
    pub tenure_months: Option<u32>,
    pub phone: Option<String>,
    pub customer_id: Option<CustomerId>,
}

impl StatedRequirements {
    pub fn mentions_loan(&self) -> bool {
        self.loan_amount.is_some() || self.tenure_months.is_some()
    }
}

/// Pulls loan requirements out of free text. When a message mentions several candidates for
/// the same field, the last one wins.
#[derive(Clone, Debug, Default)]
pub struct RequirementExtractor;

impl RequirementExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, text: &str) -> StatedRequirements {
        let customer_id = extract_customer_id(text);
        let phone = extract_phone(text);

        // Identifiers carry long digit runs that would otherwise read as amounts.
        let without_ids = blank_matches(&CUSTOMER_ID_PATTERN, text);
        let remaining = blank_matches(&PHONE_PATTERN, &without_ids);

        let (tenure_months, tenure_spans) = extract_tenure(&remaining);
        let loan_amount = extract_amount(&remaining, &tenure_spans);

        StatedRequirements { loan_amount, tenure_months, phone, customer_id }
    }
}

fn extract_customer_id(text: &str) -> Option<CustomerId> {
    CUSTOMER_ID_PATTERN
        .captures_iter(text)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|digits| CustomerId::new(format!("CUST{}", digits.as_str())))
}

fn extract_phone(text: &str) -> Option<String> {
    PHONE_PATTERN
        .captures_iter(text)
        .last()
        .and_then(|captures| captures.get(1))
        .map(|phone| phone.as_str().trim().to_owned())
}

/// Replaces every match with spaces so byte offsets stay aligned with the input.
fn blank_matches(pattern: &Regex, text: &str) -> String {
    pattern.replace_all(text, |captures: &Captures<'_>| " ".repeat(captures[0].len())).into_owned()
}

fn extract_tenure(text: &str) -> (Option<u32>, Vec<(usize, usize)>) {
    let mut tenure = None;
    let mut spans = Vec::new();
    for captures in TENURE_PATTERN.captures_iter(text) {
        let Some(whole) = captures.get(0) else { continue };
        spans.push((whole.start(), whole.end()));
        let Ok(value) = captures[1].parse::<u32>() else { continue };
        let unit = captures[2].to_ascii_lowercase();
        let months = if unit.starts_with('y') { value.saturating_mul(12) } else { value };
        if months > 0 {
            tenure = Some(months);
        }
    }
    (tenure, spans)
}

fn extract_amount(text: &str, tenure_spans: &[(usize, usize)]) -> Option<f64> {
    let mut candidates: Vec<(usize, f64)> = Vec::new();
    let mut scaled_spans = Vec::new();

    for captures in SCALED_AMOUNT_PATTERN.captures_iter(text) {
        let Some(whole) = captures.get(0) else { continue };
        if overlaps(whole.start(), whole.end(), tenure_spans) {
            continue;
        }
        scaled_spans.push((whole.start(), whole.end()));
        let Ok(base) = captures[1].parse::<f64>() else { continue };
        let multiplier = match captures[2].to_ascii_lowercase().as_str() {
            "crore" | "crores" | "cr" => CRORE,
            "k" | "thousand" => 1_000.0,
            _ => LAKH,
        };
        candidates.push((whole.start(), base * multiplier));
    }

    for captures in FIGURE_PATTERN.captures_iter(text) {
        let Some(number) = captures.get(2) else { continue };
        if overlaps(number.start(), number.end(), tenure_spans)
            || overlaps(number.start(), number.end(), &scaled_spans)
        {
            continue;
        }
        let Ok(value) = number.as_str().replace(',', "").parse::<f64>() else { continue };
        let has_currency = captures.get(1).is_some();
        if has_currency || value >= MIN_BARE_AMOUNT {
            candidates.push((number.start(), value));
        }
    }

    candidates
        .into_iter()
        .filter(|(_, value)| value.is_finite() && *value > 0.0)
        .max_by_key(|(position, _)| *position)
        .map(|(_, value)| value)
}

fn overlaps(start: usize, end: usize, spans: &[(usize, usize)]) -> bool {
    spans.iter().any(|(span_start, span_end)| start < *span_end && *span_start < end)
}
