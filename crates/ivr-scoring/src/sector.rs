use radar_core::{FundamentalsRecord, SectorKind};

const FINANCIAL_KEYWORDS: [&str; 5] = [
    "financial",
    "bank",
    "insurance",
    "capital markets",
    "diversified financial",
];

/// Classify by sector/industry text. Both empty means `Standard`.
pub fn classify(sector: &str, industry: &str) -> SectorKind {
    let s = sector.to_lowercase();
    let i = industry.to_lowercase();
    let hit = FINANCIAL_KEYWORDS
        .iter()
        .any(|k| s.contains(k) || i.contains(k));
    if hit {
        SectorKind::Financial
    } else {
        SectorKind::Standard
    }
}

pub fn classify_record(record: &FundamentalsRecord) -> SectorKind {
    classify(&record.sector, &record.industry)
}

pub fn is_financial(record: &FundamentalsRecord) -> bool {
    classify_record(record).is_financial()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(sector: &str, industry: &str) -> FundamentalsRecord {
        FundamentalsRecord {
            sector: sector.to_string(),
            industry: industry.to_string(),
            ..FundamentalsRecord::missing("TEST")
        }
    }

    #[test]
    fn test_banks_are_financial() {
        assert!(is_financial(&record("Financial Services", "Banks - Regional")));
        assert!(is_financial(&record("", "Banks")));
        assert!(is_financial(&record("Banks", "")));
    }

    #[test]
    fn test_insurance_and_capital_markets() {
        assert!(is_financial(&record("", "Insurance - Life")));
        assert!(is_financial(&record("", "Capital Markets")));
        assert!(is_financial(&record("DIVERSIFIED FINANCIALS", "")));
    }

    #[test]
    fn test_non_financial() {
        assert!(!is_financial(&record("Technology", "Consumer Electronics")));
        assert!(!is_financial(&record("Energy", "Oil & Gas Integrated")));
    }

    #[test]
    fn test_empty_fields_are_standard() {
        assert_eq!(classify("", ""), SectorKind::Standard);
        assert!(!is_financial(&FundamentalsRecord::missing("X")));
    }
}
