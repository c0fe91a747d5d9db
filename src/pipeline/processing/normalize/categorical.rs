//! Free-text categorical cleanup: job titles, countries and regions.

use crate::constants::{REGION_ERROR_PLACEHOLDER, UNKNOWN};
use crate::domain::Region;

/// A job-title bucket: the title matches when it contains any of `needles`
struct TitleRule {
    needles: &'static [&'static str],
    label: &'static str,
}

/// Ordered title rules; the first match wins. Several rules can match the
/// same title, so the order is part of the behaviour: patent practitioners
/// first, then IP leadership ahead of the functional buckets ("IP Director,
/// Licensing" is a director, not a licensing manager).
const TITLE_RULES: &[TitleRule] = &[
    TitleRule {
        needles: &["patent attorney", "patent counsel"],
        label: "Patent Attorney/Counsel",
    },
    TitleRule {
        needles: &["patent agent"],
        label: "Patent Agent",
    },
    TitleRule {
        needles: &["chief ip", "chief intellectual property"],
        label: "Chief IP Officer",
    },
    TitleRule {
        needles: &[
            "ip director",
            "director of ip",
            "director, ip",
            "director of intellectual property",
            "intellectual property director",
        ],
        label: "IP Director",
    },
    TitleRule {
        needles: &["head of ip", "head of intellectual property"],
        label: "Head of IP",
    },
    TitleRule {
        needles: &["patent engineer"],
        label: "Patent Engineer",
    },
    TitleRule {
        needles: &["patent analyst", "patent search"],
        label: "Patent Analyst",
    },
    TitleRule {
        needles: &["paralegal"],
        label: "IP Paralegal",
    },
    TitleRule {
        needles: &["trademark"],
        label: "Trademark Specialist",
    },
    TitleRule {
        needles: &["ip manager", "patent manager", "intellectual property manager"],
        label: "IP Manager",
    },
    TitleRule {
        needles: &[
            "ip counsel",
            "ip attorney",
            "intellectual property counsel",
            "intellectual property attorney",
        ],
        label: "IP Counsel",
    },
    TitleRule {
        needles: &["licensing"],
        label: "Licensing Manager",
    },
    TitleRule {
        needles: &["technology transfer", "tech transfer"],
        label: "Technology Transfer",
    },
    TitleRule {
        needles: &["ip specialist", "ip administrator", "ip coordinator"],
        label: "IP Specialist",
    },
];

/// Collapse a raw job title into its canonical bucket.
///
/// Missing, blank and sentinel titles stay missing. Titles no rule
/// recognises come back with each word capitalised.
pub fn normalize_job_title(raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    let cleaned = raw.trim().to_lowercase();
    if cleaned.is_empty() || raw.trim() == UNKNOWN {
        return None;
    }

    TITLE_RULES
        .iter()
        .find(|rule| rule.needles.iter().any(|needle| cleaned.contains(needle)))
        .map(|rule| rule.label.to_string())
        .or_else(|| Some(title_case(&cleaned)))
}

/// Capitalise the first letter of every run of letters, lower-case the rest
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut previous_is_letter = false;
    for c in value.chars() {
        if c.is_alphabetic() {
            if previous_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            out.push(c);
            previous_is_letter = false;
        }
    }
    out
}

/// Country is the last comma-separated segment of a free-text location
pub fn extract_country(location: Option<&str>) -> Option<String> {
    let location = location?;
    let country = match location.rsplit_once(',') {
        Some((_, last)) => last.trim(),
        None => location,
    };
    if country.trim().is_empty() || country == UNKNOWN {
        None
    } else {
        Some(country.to_string())
    }
}

/// Map a raw region onto the fixed region set.
///
/// Missing values, the enrichment error placeholder and anything outside
/// the allowed set all land on [`Region::DEFAULT`].
pub fn normalize_region(raw: Option<&str>) -> Region {
    match raw.map(str::trim) {
        None | Some("") | Some(REGION_ERROR_PLACEHOLDER) | Some(UNKNOWN) => Region::DEFAULT,
        Some(value) => Region::from_code(value).unwrap_or(Region::DEFAULT),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_patent_attorney_variants() {
        assert_eq!(
            normalize_job_title(Some("  Senior Patent Attorney ")).as_deref(),
            Some("Patent Attorney/Counsel")
        );
        assert_eq!(
            normalize_job_title(Some("Patent Counsel, EMEA")).as_deref(),
            Some("Patent Attorney/Counsel")
        );
        assert_eq!(
            normalize_job_title(Some("Registered Patent Agent")).as_deref(),
            Some("Patent Agent")
        );
    }

    #[test]
    fn test_ip_director_is_not_shadowed() {
        assert_eq!(
            normalize_job_title(Some("IP Director, Licensing")).as_deref(),
            Some("IP Director")
        );
        assert_eq!(
            normalize_job_title(Some("Head of IP & IP Manager")).as_deref(),
            Some("Head of IP")
        );
        assert_eq!(
            normalize_job_title(Some("Director of Intellectual Property")).as_deref(),
            Some("IP Director")
        );
    }

    #[test]
    fn test_first_matching_rule_wins() {
        // contains both "patent attorney" and "ip manager"
        assert_eq!(
            normalize_job_title(Some("IP Manager / Patent Attorney")).as_deref(),
            Some("Patent Attorney/Counsel")
        );
        assert_eq!(
            normalize_job_title(Some("IP Director & Patent Attorney")).as_deref(),
            Some("Patent Attorney/Counsel")
        );
        assert_eq!(
            normalize_job_title(Some("Chief IP Counsel")).as_deref(),
            Some("Chief IP Officer")
        );
    }

    #[test]
    fn test_unmatched_titles_are_capitalised() {
        assert_eq!(
            normalize_job_title(Some("legal OPERATIONS lead")).as_deref(),
            Some("Legal Operations Lead")
        );
        assert_eq!(title_case("r&d liaison"), "R&D Liaison");
    }

    #[test]
    fn test_missing_titles_stay_missing() {
        assert_eq!(normalize_job_title(None), None);
        assert_eq!(normalize_job_title(Some("   ")), None);
        assert_eq!(normalize_job_title(Some("Unknown")), None);
    }

    #[test]
    fn test_country_from_location() {
        assert_eq!(
            extract_country(Some("Munich, Bavaria, Germany")).as_deref(),
            Some("Germany")
        );
        assert_eq!(extract_country(Some("France")).as_deref(), Some("France"));
        assert_eq!(extract_country(Some("Paris, ")), None);
        assert_eq!(extract_country(None), None);
    }

    #[test]
    fn test_region_defaults() {
        assert_eq!(normalize_region(None), Region::NorthAmerica);
        assert_eq!(normalize_region(Some("")), Region::NorthAmerica);
        assert_eq!(
            normalize_region(Some("Error processing request")),
            Region::NorthAmerica
        );
        assert_eq!(normalize_region(Some("APAC")), Region::NorthAmerica);
        assert_eq!(normalize_region(Some(" EU")), Region::Europe);
    }
}
