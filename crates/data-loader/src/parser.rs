//! Parser for the advertisement data files.
//!
//! All files are `::`-delimited, one record per line:
//! - content.dat: contentId::marketplaceId::renderableContent
//! - targeting_groups.dat: targetingGroupId::contentId::clickThroughRate::predicates
//! - customers.dat: customerId::prime::segments
//!
//! Blank lines and lines starting with `#` are skipped.

use crate::error::{DataLoadError, Result};
use crate::types::*;
use std::collections::HashSet;
use std::io::ErrorKind;
use std::path::Path;

pub const CONTENT_FILE: &str = "content.dat";
pub const TARGETING_GROUPS_FILE: &str = "targeting_groups.dat";
pub const CUSTOMERS_FILE: &str = "customers.dat";

fn read_to_string(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => DataLoadError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => DataLoadError::IoError(e),
    })
}

/// Yields (line number, record) for every non-blank, non-comment line
fn records(input: &str) -> impl Iterator<Item = (usize, &str)> {
    input
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
}

fn next_field<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    file: &str,
    line: usize,
    name: &str,
) -> Result<&'a str> {
    parts.next().ok_or_else(|| DataLoadError::ParseError {
        file: file.to_string(),
        line,
        reason: format!("Missing {}", name),
    })
}

/// Parse the content.dat file
pub fn parse_content(path: &Path) -> Result<Vec<AdvertisementContent>> {
    parse_content_str(&read_to_string(path)?)
}

pub fn parse_content_str(input: &str) -> Result<Vec<AdvertisementContent>> {
    let mut content = Vec::new();

    for (line_no, line) in records(input) {
        // The payload may itself contain "::"
        let mut parts = line.splitn(3, "::");

        let content_id = next_field(&mut parts, CONTENT_FILE, line_no, "contentId")?.trim();
        let marketplace_id =
            next_field(&mut parts, CONTENT_FILE, line_no, "marketplaceId")?.trim();
        let renderable = next_field(&mut parts, CONTENT_FILE, line_no, "renderableContent")?;

        if marketplace_id.is_empty() {
            return Err(DataLoadError::ParseError {
                file: CONTENT_FILE.to_string(),
                line: line_no,
                reason: "Empty marketplaceId".to_string(),
            });
        }

        content.push(AdvertisementContent {
            content_id: (!content_id.is_empty()).then(|| content_id.to_string()),
            marketplace_id: marketplace_id.to_string(),
            renderable_content: renderable.to_string(),
        });
    }

    Ok(content)
}

/// Parse the targeting_groups.dat file
pub fn parse_targeting_groups(path: &Path) -> Result<Vec<TargetingGroup>> {
    parse_targeting_groups_str(&read_to_string(path)?)
}

pub fn parse_targeting_groups_str(input: &str) -> Result<Vec<TargetingGroup>> {
    let mut groups = Vec::new();

    for (line_no, line) in records(input) {
        let mut parts = line.splitn(4, "::");

        let group_id =
            next_field(&mut parts, TARGETING_GROUPS_FILE, line_no, "targetingGroupId")?.trim();
        let content_id =
            next_field(&mut parts, TARGETING_GROUPS_FILE, line_no, "contentId")?.trim();
        let ctr = next_field(&mut parts, TARGETING_GROUPS_FILE, line_no, "clickThroughRate")?;
        // Trailing predicates field is optional
        let predicates = parts.next().unwrap_or("");

        if content_id.is_empty() {
            return Err(DataLoadError::ParseError {
                file: TARGETING_GROUPS_FILE.to_string(),
                line: line_no,
                reason: "Empty contentId".to_string(),
            });
        }

        groups.push(TargetingGroup {
            targeting_group_id: group_id.to_string(),
            content_id: content_id.to_string(),
            click_through_rate: parse_click_through_rate(ctr.trim())?,
            predicates: parse_predicates(predicates)?,
        });
    }

    Ok(groups)
}

/// Parse the customers.dat file
pub fn parse_customers(path: &Path) -> Result<Vec<CustomerProfile>> {
    parse_customers_str(&read_to_string(path)?)
}

pub fn parse_customers_str(input: &str) -> Result<Vec<CustomerProfile>> {
    let mut customers = Vec::new();

    for (line_no, line) in records(input) {
        let mut parts = line.split("::");

        let customer_id = next_field(&mut parts, CUSTOMERS_FILE, line_no, "customerId")?.trim();
        let prime = next_field(&mut parts, CUSTOMERS_FILE, line_no, "prime")?.trim();
        let segments = parts.next().unwrap_or("");

        let prime_member = match prime {
            "Y" => true,
            "N" => false,
            _ => {
                return Err(DataLoadError::InvalidValue {
                    field: "prime".to_string(),
                    value: prime.to_string(),
                });
            }
        };

        customers.push(CustomerProfile {
            customer_id: customer_id.to_string(),
            prime_member,
            segments: segments
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect::<HashSet<_>>(),
        });
    }

    Ok(customers)
}

/// Click-through rates must be finite and non-negative
fn parse_click_through_rate(s: &str) -> Result<f64> {
    let invalid = || DataLoadError::InvalidValue {
        field: "clickThroughRate".to_string(),
        value: s.to_string(),
    };
    let ctr: f64 = s.parse().map_err(|_| invalid())?;
    if !ctr.is_finite() || ctr < 0.0 {
        return Err(invalid());
    }
    Ok(ctr)
}

/// Parse `;`-separated predicates
///
/// Example: "recognized;!segment=outdoors;marketplace=US|CA"
pub fn parse_predicates(s: &str) -> Result<Vec<TargetingPredicate>> {
    s.split(';')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(parse_predicate)
        .collect()
}

fn parse_predicate(s: &str) -> Result<TargetingPredicate> {
    let (inverted, body) = match s.strip_prefix('!') {
        Some(rest) => (true, rest.trim()),
        None => (false, s),
    };

    let invalid = || DataLoadError::InvalidValue {
        field: "predicate".to_string(),
        value: s.to_string(),
    };

    let kind = match body.split_once('=') {
        None => match body {
            "recognized" => PredicateKind::Recognized,
            "prime" => PredicateKind::Prime,
            _ => return Err(invalid()),
        },
        Some(("segment", name)) if !name.trim().is_empty() => {
            PredicateKind::Segment(name.trim().to_string())
        }
        Some(("marketplace", ids)) => {
            let ids: Vec<MarketplaceId> = ids
                .split('|')
                .map(str::trim)
                .filter(|id| !id.is_empty())
                .map(str::to_string)
                .collect();
            if ids.is_empty() {
                return Err(invalid());
            }
            PredicateKind::Marketplace(ids)
        }
        Some(_) => return Err(invalid()),
    };

    Ok(TargetingPredicate { kind, inverted })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_content_with_missing_id() {
        let input = "\
# contentId::marketplaceId::renderableContent
A::US::<div>Buy A</div>

::US::orphan
";
        let content = parse_content_str(input).unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0].content_id.as_deref(), Some("A"));
        assert_eq!(content[0].renderable_content, "<div>Buy A</div>");
        assert_eq!(content[1].content_id, None);
    }

    #[test]
    fn test_parse_content_keeps_delimiters_in_payload() {
        let content = parse_content_str("A::US::a::b").unwrap();
        assert_eq!(content[0].renderable_content, "a::b");
    }

    #[test]
    fn test_parse_content_requires_marketplace() {
        let err = parse_content_str("A::::payload").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_targeting_groups() {
        let input = "\
g1::A::0.5::recognized;!segment=outdoors
g2::A::0.25
g3::B::1.0::marketplace=US|CA
";
        let groups = parse_targeting_groups_str(input).unwrap();
        assert_eq!(groups.len(), 3);

        assert_eq!(groups[0].click_through_rate, 0.5);
        assert_eq!(
            groups[0].predicates,
            vec![
                TargetingPredicate::new(PredicateKind::Recognized),
                TargetingPredicate::inverted(PredicateKind::Segment("outdoors".to_string())),
            ]
        );
        assert!(groups[1].predicates.is_empty());
        assert_eq!(
            groups[2].predicates[0].kind,
            PredicateKind::Marketplace(vec!["US".to_string(), "CA".to_string()])
        );
    }

    #[test]
    fn test_parse_targeting_groups_rejects_bad_ctr() {
        for ctr in ["-0.1", "NaN", "inf", "abc"] {
            let line = format!("g1::A::{}::", ctr);
            let err = parse_targeting_groups_str(&line).unwrap_err();
            assert!(
                matches!(err, DataLoadError::InvalidValue { ref field, .. } if field == "clickThroughRate"),
                "ctr {} should be rejected",
                ctr
            );
        }
    }

    #[test]
    fn test_parse_targeting_groups_missing_field() {
        let err = parse_targeting_groups_str("g1::A").unwrap_err();
        assert!(matches!(err, DataLoadError::ParseError { line: 1, .. }));
    }

    #[test]
    fn test_parse_unknown_predicate() {
        assert!(parse_predicates("recognized;age=30").is_err());
        assert!(parse_predicates("segment=").is_err());
        assert!(parse_predicates("marketplace=|").is_err());
    }

    #[test]
    fn test_parse_customers() {
        let input = "c1::Y::outdoors, books\nc2::N::";
        let customers = parse_customers_str(input).unwrap();
        assert_eq!(customers.len(), 2);
        assert!(customers[0].prime_member);
        assert!(customers[0].segments.contains("books"));
        assert!(!customers[1].prime_member);
        assert!(customers[1].segments.is_empty());

        assert!(parse_customers_str("c3::maybe::").is_err());
    }
}
