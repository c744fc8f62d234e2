//! Vendor normalization: turn noisy statement descriptions into a stable
//! matching key and a presentable label.

use regex::Regex;

/// Leading processor/network markers that say nothing about the vendor.
/// Stripped repeatedly, so "POS DEBIT ..." loses both tokens.
const NOISE_PREFIXES: &[&str] = &[
    "POS ",
    "DEBIT CARD PURCHASE ",
    "DEBIT CARD ",
    "DEBIT ",
    "CHECK CARD ",
    "CHECKCARD ",
    "CHKCARD ",
    "ACH DEBIT ",
    "ACH CREDIT ",
    "ACH ",
    "WEB PMT ",
    "WEB ",
    "RECURRING PAYMENT ",
    "VISA ",
    "MASTERCARD ",
    "SQ *",
    "SQ* ",
    "SQ*",
    "TST* ",
    "TST*",
    "PAYPAL *",
    "PAYPAL*",
    "PP*",
];

/// Holds the compiled patterns; build once, reuse for the whole batch.
pub struct VendorNormalizer {
    ach_company: Regex,
    ach_company_open: Regex,
    date: Regex,
    phone: Regex,
    digit_run: Regex,
    punctuation: Regex,
}

impl Default for VendorNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl VendorNormalizer {
    pub fn new() -> Self {
        VendorNormalizer {
            // "ORIG CO NAME:ACME CORP ORIG ID:123..." — the structured form.
            ach_company: Regex::new(r"ORIG CO NAME:\s*(.+?)\s+ORIG ID:").expect("static pattern"),
            ach_company_open: Regex::new(r"ORIG CO NAME:\s*(.+)$").expect("static pattern"),
            date: Regex::new(r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b").expect("static pattern"),
            phone: Regex::new(r"\b\d{3}[-. ]?\d{3}[-. ]?\d{4}\b").expect("static pattern"),
            // Reference numbers, card fragments, store numbers.
            digit_run: Regex::new(r"\d{3,}").expect("static pattern"),
            punctuation: Regex::new(r"[^A-Z0-9 ]").expect("static pattern"),
        }
    }

    /// First three meaningful tokens, uppercase — the grouping/matching key.
    pub fn key(&self, raw: &str) -> String {
        self.tokens(raw).join(" ")
    }

    /// Same pipeline, title-cased for display.
    pub fn label(&self, raw: &str) -> String {
        self.tokens(raw)
            .iter()
            .map(|t| title_case(t))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Best-effort vendor name. An explicit ACH company-name field beats any
    /// free-text heuristic, so try that first.
    pub fn vendor_name(&self, raw: &str) -> String {
        let upper = raw.to_uppercase();
        if let Some(company) = self.structured_company(&upper) {
            return self
                .tokens_of_clean(&company)
                .iter()
                .map(|t| title_case(t))
                .collect::<Vec<_>>()
                .join(" ");
        }
        self.label(raw)
    }

    fn structured_company(&self, upper: &str) -> Option<String> {
        self.ach_company
            .captures(upper)
            .or_else(|| self.ach_company_open.captures(upper))
            .map(|c| c[1].trim().to_string())
    }

    fn tokens(&self, raw: &str) -> Vec<String> {
        let upper = raw.to_uppercase();
        // The structured field, when present, is the vendor; everything
        // around it is routing detail.
        let text = self.structured_company(&upper).unwrap_or(upper);
        self.tokens_of_clean(&text)
    }

    fn tokens_of_clean(&self, text: &str) -> Vec<String> {
        let mut s = text.trim().to_string();
        loop {
            let before = s.len();
            for prefix in NOISE_PREFIXES {
                if let Some(rest) = s.strip_prefix(prefix) {
                    s = rest.trim_start().to_string();
                }
            }
            if s.len() == before {
                break;
            }
        }
        let s = self.date.replace_all(&s, " ");
        let s = self.phone.replace_all(&s, " ");
        let s = self.digit_run.replace_all(&s, " ");
        let s = self.punctuation.replace_all(&s, " ");
        s.split_whitespace()
            .filter(|t| t.len() > 1)
            .take(3)
            .map(String::from)
            .collect()
    }
}

fn title_case(token: &str) -> String {
    let lower = token.to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm() -> VendorNormalizer {
        VendorNormalizer::new()
    }

    #[test]
    fn strips_pos_prefix_and_store_number() {
        assert_eq!(norm().key("POS DEBIT STARBUCKS #1234 AUSTIN TX"), "STARBUCKS AUSTIN TX");
    }

    #[test]
    fn strips_square_marker_and_phone() {
        assert_eq!(norm().key("SQ *BLUE BOTTLE COFFEE 415-555-1234 CA"), "BLUE BOTTLE COFFEE");
    }

    #[test]
    fn strips_embedded_dates_and_reference_runs() {
        assert_eq!(norm().key("NETFLIX.COM 06/10 REF 884412"), "NETFLIX COM REF");
    }

    #[test]
    fn key_is_stable_across_noise_variants() {
        let n = norm();
        assert_eq!(
            n.key("CHECKCARD 0610 COMCAST CABLE 8005551212"),
            n.key("COMCAST CABLE 06/12 #99881")
        );
    }

    #[test]
    fn short_tokens_are_dropped() {
        // Single letters and leftover digits carry no vendor signal.
        assert_eq!(norm().key("A 1 ACME SUPPLY CO"), "ACME SUPPLY CO");
    }

    #[test]
    fn label_is_title_cased() {
        assert_eq!(norm().label("POS DEBIT STARBUCKS #1234"), "Starbucks");
        assert_eq!(norm().label("WHOLE FOODS MKT 10283"), "Whole Foods Mkt");
    }

    #[test]
    fn ach_structured_field_wins() {
        let raw = "ORIG CO NAME:BRIGHTWAY REALTY ORIG ID:9000123 DESC:COMMISSION PPD";
        assert_eq!(norm().vendor_name(raw), "Brightway Realty");
        assert_eq!(norm().key(raw), "BRIGHTWAY REALTY");
    }

    #[test]
    fn ach_field_without_orig_id_still_extracts() {
        assert_eq!(norm().vendor_name("ORIG CO NAME:ACME HOLDINGS"), "Acme Holdings");
    }

    #[test]
    fn plain_description_falls_back_to_heuristic() {
        assert_eq!(norm().vendor_name("DEBIT CARD PURCHASE RIDGELINE INSURANCE 4411"), "Ridgeline Insurance");
    }

    #[test]
    fn empty_input_yields_empty_key() {
        assert_eq!(norm().key(""), "");
        assert_eq!(norm().label("   "), "");
    }
}
