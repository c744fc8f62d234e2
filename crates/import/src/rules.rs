//! Keyword-table category classification: an ordered list of
//! (category, patterns) pairs, first match wins, `Miscellaneous` as the
//! floor. The same table serves both the source's own category labels and
//! raw descriptions — hints are just cleaner text.

use serde::Deserialize;
use thiserror::Error;
use tideover_core::{Category, Money};

#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRule {
    pub category: Category,
    /// Uppercase-contains patterns; any hit claims the text.
    pub patterns: Vec<String>,
}

impl CategoryRule {
    fn matches(&self, upper: &str) -> bool {
        self.patterns.iter().any(|p| upper.contains(p.to_uppercase().as_str()))
    }
}

#[derive(Error, Debug)]
pub enum RulesError {
    #[error("failed to parse rules TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Fixed-priority rule list. Order is the contract: earlier entries win.
#[derive(Debug, Clone)]
pub struct CategoryRuleSet {
    rules: Vec<CategoryRule>,
}

impl Default for CategoryRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

fn rule(category: Category, patterns: &[&str]) -> CategoryRule {
    CategoryRule {
        category,
        patterns: patterns.iter().map(|s| s.to_string()).collect(),
    }
}

impl CategoryRuleSet {
    pub fn builtin() -> Self {
        CategoryRuleSet {
            rules: vec![
                rule(Category::Fuel, &["GAS", "FUEL", "SHELL", "CHEVRON", "EXXON", "VALERO", "SUNOCO"]),
                rule(Category::Travel, &["TRAVEL", "AIRLINE", "FLIGHT", "HOTEL", "LODGING", "AIRBNB", "UBER", "LYFT", "RENTAL CAR"]),
                rule(Category::LegalAccounting, &["LEGAL", "ATTORNEY", "LAW OFFICE", "ACCOUNTING", "ACCOUNTANT", "CPA", "BOOKKEEP", "PROFESSIONAL SERVICES", "NOTARY"]),
                rule(Category::OfficeSupplies, &["OFFICE SUPPL", "STAPLES", "OFFICE DEPOT", "SUPPLIES"]),
                rule(Category::Software, &["SOFTWARE", "SAAS", "ADOBE", "MICROSOFT", "GITHUB", "ZOOM", "DROPBOX", "QUICKBOOKS", "CLOUD HOSTING", "DOMAIN"]),
                rule(Category::Repairs, &["REPAIR", "MAINTENANCE", "HVAC", "PLUMBING"]),
                rule(Category::PostageShipping, &["POSTAGE", "SHIPPING", "USPS", "FEDEX", "UPS STORE", "STAMPS"]),
                rule(Category::TaxesLicenses, &["TAX", "IRS", "LICENSE", "REGISTRATION", "DMV", "PERMIT", "FRANCHISE"]),
                rule(Category::Insurance, &["INSURANCE", "GEICO", "STATE FARM", "ALLSTATE", "PROGRESSIVE", "PREMIUM"]),
                rule(Category::Subscriptions, &["SUBSCRIPTION", "MEMBERSHIP", "NETFLIX", "SPOTIFY", "INTERNET", "COMCAST", "SPECTRUM", "VERIZON", "WIRELESS"]),
                rule(Category::Sales, &["COMMISSION", "SALES", "DIRECT DEP", "DEPOSIT", "INVOICE", "PAYROLL"]),
                rule(Category::OwnerContribution, &["OWNER CONTRIBUTION", "OWNER'S CONTRIBUTION", "CAPITAL CONTRIBUTION", "CONTRIBUTION"]),
                rule(Category::OwnerDistribution, &["OWNER DISTRIBUTION", "OWNER'S DISTRIBUTION", "OWNER DRAW", "OWNER'S DRAW", "DISTRIBUTION"]),
                rule(Category::Transfers, &["TRANSFER", "XFER", "ZELLE"]),
                rule(Category::Fees, &["FEE", "SERVICE CHARGE", "OVERDRAFT", "NSF"]),
            ],
        }
    }

    /// Builtin table with user rules evaluated first.
    ///
    /// ```toml
    /// [[rules]]
    /// category = "software"
    /// patterns = ["JETBRAINS", "FASTMAIL"]
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, RulesError> {
        #[derive(Deserialize)]
        struct RuleFile {
            #[serde(default)]
            rules: Vec<CategoryRule>,
        }
        let file: RuleFile = toml::from_str(content)?;
        Ok(Self::with_custom(file.rules))
    }

    /// Builtin table with caller-supplied rules evaluated first.
    pub fn with_custom(custom: Vec<CategoryRule>) -> Self {
        let mut rules = custom;
        rules.extend(Self::builtin().rules);
        CategoryRuleSet { rules }
    }

    fn match_text(&self, text: &str) -> Option<Category> {
        let upper = text.to_uppercase();
        if upper.trim().is_empty() {
            return None;
        }
        self.rules.iter().find(|r| r.matches(&upper)).map(|r| r.category)
    }

    /// Classify one record: hint first, then description, then sign/type
    /// defaults, then the miscellaneous floor.
    pub fn classify(
        &self,
        description: &str,
        category_hint: Option<&str>,
        amount: Money,
        source_type: &str,
    ) -> Category {
        if let Some(category) = category_hint.and_then(|h| self.match_text(h)) {
            return category;
        }
        if let Some(category) = self.match_text(description) {
            return category;
        }
        let ty = source_type.to_uppercase();
        if ty.contains("TRANSFER") || ty.contains("XFER") {
            return Category::Transfers;
        }
        if amount.is_positive() || ty.contains("CREDIT") {
            return Category::Sales;
        }
        Category::Miscellaneous
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rules() -> CategoryRuleSet {
        CategoryRuleSet::builtin()
    }

    fn classify_desc(desc: &str) -> Category {
        rules().classify(desc, None, Money::from_cents(-1000), "ACH_DEBIT")
    }

    #[test]
    fn keyword_hits_by_description() {
        assert_eq!(classify_desc("SHELL OIL 5744"), Category::Fuel);
        assert_eq!(classify_desc("DELTA AIRLINE TICKETS"), Category::Travel);
        assert_eq!(classify_desc("RIDGELINE LAW OFFICE"), Category::LegalAccounting);
        assert_eq!(classify_desc("USPS PO 4411"), Category::PostageShipping);
        assert_eq!(classify_desc("NETFLIX.COM"), Category::Subscriptions);
        assert_eq!(classify_desc("MONTHLY SERVICE CHARGE"), Category::Fees);
    }

    #[test]
    fn hint_outranks_description() {
        // The description alone says software; the issuer's label says travel.
        let c = rules().classify("ADOBE SYSTEMS", Some("Travel"), Money::from_cents(-2000), "Sale");
        assert_eq!(c, Category::Travel);
    }

    #[test]
    fn unmatched_hint_falls_back_to_description() {
        let c = rules().classify("ADOBE SYSTEMS", Some("Whatever Else"), Money::from_cents(-2000), "Sale");
        assert_eq!(c, Category::Software);
    }

    #[test]
    fn first_match_wins_in_table_order() {
        // "GAS" (Fuel) sits above "FEE" (Fees) in the table.
        assert_eq!(classify_desc("GAS STATION FEE"), Category::Fuel);
    }

    #[test]
    fn transfer_type_label_default() {
        let c = rules().classify("ONLINE PMT 4411", None, Money::from_cents(-5000), "ACCT_XFER");
        assert_eq!(c, Category::Transfers);
        let c = rules().classify("ONLINE PMT 4411", None, Money::from_cents(5000), "TRANSFER IN");
        assert_eq!(c, Category::Transfers);
    }

    #[test]
    fn positive_or_credit_default_is_sales() {
        let c = rules().classify("BRIGHTWAY RLTY 9923", None, Money::from_cents(250_000), "ACH_CREDIT");
        assert_eq!(c, Category::Sales);
        let c = rules().classify("MISC REFUND", None, Money::from_cents(1), "MISC");
        assert_eq!(c, Category::Sales);
    }

    #[test]
    fn unmatched_expense_is_miscellaneous() {
        assert_eq!(classify_desc("UNKNOWN VENDOR 9912"), Category::Miscellaneous);
    }

    #[test]
    fn custom_toml_rules_evaluate_first() {
        let set = CategoryRuleSet::from_toml(
            "[[rules]]\ncategory = \"repairs\"\npatterns = [\"SHELL\"]\n",
        )
        .unwrap();
        // Builtin would say Fuel; the user rule claims it first.
        let c = set.classify("SHELL GARAGE DOOR CO", None, Money::from_cents(-1000), "Sale");
        assert_eq!(c, Category::Repairs);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(CategoryRuleSet::from_toml("rules = \"nope\"").is_err());
    }

    #[test]
    fn empty_toml_is_just_builtin() {
        let set = CategoryRuleSet::from_toml("").unwrap();
        assert_eq!(
            set.classify("SHELL OIL", None, Money::from_cents(-100), "Sale"),
            Category::Fuel
        );
    }
}
