//! Term arithmetic. Parse "<Season> <Year>" labels, map them to calendar ranges,
//! and cycle Fall -> Winter -> Summer -> Fall.

use super::DomainError;
use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

static TERM_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*([A-Za-z/]+)\s+(\d{4})(?:\s*-\s*(\d{4}))?\s*$").expect("valid term pattern")
});

/// Season of a term. Declaration order is chronological order inside a year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Season {
    Winter,
    Summer,
    Fall,
    /// Two-term span starting in the Fall of `year` and ending in April of `year + 1`.
    FallWinter,
}

impl Season {
    fn parse(token: &str) -> Option<Self> {
        match token.to_ascii_lowercase().as_str() {
            "winter" => Some(Self::Winter),
            "summer" => Some(Self::Summer),
            "fall" => Some(Self::Fall),
            "fall/winter" => Some(Self::FallWinter),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Winter => "Winter",
            Self::Summer => "Summer",
            Self::Fall => "Fall",
            Self::FallWinter => "Fall/Winter",
        }
    }
}

/// A parsed academic term. Ordered chronologically by (year, season).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Term {
    pub year: i32,
    pub season: Season,
}

/// Inclusive calendar range of a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TermRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TermRange {
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

impl Term {
    pub fn new(season: Season, year: i32) -> Self {
        Self { year, season }
    }

    pub fn range(&self) -> Result<TermRange, DomainError> {
        let y = self.year;
        let (start, end) = match self.season {
            Season::Winter => (date(y, 1, 1)?, date(y, 5, 4)?),
            Season::Summer => (date(y, 5, 5)?, date(y, 8, 31)?),
            Season::Fall => (date(y, 9, 1)?, date(y, 12, 31)?),
            Season::FallWinter => (date(y, 9, 1)?, date(y + 1, 4, 30)?),
        };
        Ok(TermRange { start, end })
    }

    /// Next term in the Fall -> Winter -> Summer -> Fall cycle.
    /// A Fall/Winter span is followed by the Summer of its second year.
    pub fn next(&self) -> Self {
        match self.season {
            Season::Fall => Self::new(Season::Winter, self.year + 1),
            Season::Winter => Self::new(Season::Summer, self.year),
            Season::Summer => Self::new(Season::Fall, self.year),
            Season::FallWinter => Self::new(Season::Summer, self.year + 1),
        }
    }

    /// Advance `steps` terms forward.
    pub fn advance(&self, steps: usize) -> Self {
        (0..steps).fold(*self, |t, _| t.next())
    }

    /// The regular term whose range contains `today`.
    pub fn current(today: NaiveDate) -> Self {
        let season = match (today.month(), today.day()) {
            (1..=4, _) | (5, 1..=4) => Season::Winter,
            (5..=8, _) => Season::Summer,
            _ => Season::Fall,
        };
        Self::new(season, today.year())
    }
}

fn date(year: i32, month: u32, day: u32) -> Result<NaiveDate, DomainError> {
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or_else(|| DomainError::InvalidTerm(format!("year {} out of range", year)))
}

impl FromStr for Term {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let caps = TERM_PATTERN
            .captures(s)
            .ok_or_else(|| DomainError::InvalidTerm(s.to_string()))?;
        let season = Season::parse(&caps[1])
            .ok_or_else(|| DomainError::InvalidTerm(format!("unknown season in '{}'", s)))?;
        let year: i32 = caps[2]
            .parse()
            .map_err(|_| DomainError::InvalidTerm(s.to_string()))?;

        match (season, caps.get(3)) {
            (Season::FallWinter, Some(second)) => {
                let second: i32 = second
                    .as_str()
                    .parse()
                    .map_err(|_| DomainError::InvalidTerm(s.to_string()))?;
                if second != year + 1 {
                    return Err(DomainError::InvalidTerm(format!(
                        "'{}' must span consecutive years",
                        s
                    )));
                }
            }
            (Season::FallWinter, None) => {}
            (_, Some(_)) => {
                return Err(DomainError::InvalidTerm(format!(
                    "only Fall/Winter terms span two years: '{}'",
                    s
                )));
            }
            (_, None) => {}
        }

        Ok(Self::new(season, year))
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.season {
            Season::FallWinter => write!(f, "Fall/Winter {}-{}", self.year, self.year + 1),
            s => write!(f, "{} {}", s.label(), self.year),
        }
    }
}

/// Calendar range of a term label.
pub fn term_range(term: &str) -> Result<TermRange, DomainError> {
    term.parse::<Term>()?.range()
}

/// True iff `today` falls inside the term's range, endpoints included.
/// Absent or unparseable terms are never in progress.
pub fn is_term_in_progress(term: Option<&str>, today: NaiveDate) -> bool {
    let Some(term) = term else {
        return false;
    };
    match term_range(term) {
        Ok(range) => range.contains(today),
        Err(e) => {
            tracing::debug!(term, error = %e, "term not in progress: unparseable");
            false
        }
    }
}

/// Inclusive list of terms from `first` to `last`, cycling Fall -> Winter -> Summer.
pub fn generate_terms(first: &str, last: &str) -> Result<Vec<String>, DomainError> {
    let start: Term = first.parse()?;
    let end: Term = last.parse()?;
    if start.season == Season::FallWinter || end.season == Season::FallWinter {
        return Err(DomainError::Validation(
            "Fall/Winter spans cannot be used as generation bounds".into(),
        ));
    }
    if end < start {
        return Err(DomainError::Validation(format!(
            "last term '{}' is before first term '{}'",
            last, first
        )));
    }

    let mut terms = Vec::new();
    let mut current = start;
    loop {
        terms.push(current.to_string());
        if current == end {
            break;
        }
        current = current.next();
    }
    Ok(terms)
}

/// Chronological sort key for a term label; unparseable labels sort last.
pub fn sort_key(term: &str) -> (bool, Option<Term>) {
    match term.parse::<Term>() {
        Ok(t) => (false, Some(t)),
        Err(_) => (true, None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_generate_terms_fall_to_summer() {
        let terms = generate_terms("Fall 2023", "Summer 2024").unwrap();
        assert_eq!(terms, vec!["Fall 2023", "Winter 2024", "Summer 2024"]);
    }

    #[test]
    fn test_generate_terms_multi_year() {
        let terms = generate_terms("Winter 2024", "Winter 2025").unwrap();
        assert_eq!(
            terms,
            vec!["Winter 2024", "Summer 2024", "Fall 2024", "Winter 2025"]
        );
    }

    #[test]
    fn test_generate_terms_single() {
        assert_eq!(
            generate_terms("fall 2024", "FALL 2024").unwrap(),
            vec!["Fall 2024"]
        );
    }

    #[test]
    fn test_generate_terms_reversed_fails() {
        let err = generate_terms("Summer 2024", "Fall 2023").unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_term_range_seasons() {
        let w = term_range("Winter 2024").unwrap();
        assert_eq!((w.start, w.end), (day(2024, 1, 1), day(2024, 5, 4)));
        let s = term_range("summer 2024").unwrap();
        assert_eq!((s.start, s.end), (day(2024, 5, 5), day(2024, 8, 31)));
        let f = term_range("FALL 2024").unwrap();
        assert_eq!((f.start, f.end), (day(2024, 9, 1), day(2024, 12, 31)));
        let fw = term_range("Fall/Winter 2024-2025").unwrap();
        assert_eq!((fw.start, fw.end), (day(2024, 9, 1), day(2025, 4, 30)));
    }

    #[test]
    fn test_term_range_end_not_before_start() {
        for label in ["Winter 2023", "Summer 2023", "Fall 2023", "Fall/Winter 2023-2024"] {
            let r = term_range(label).unwrap();
            assert!(r.end >= r.start, "{}", label);
            assert!(is_term_in_progress(Some(label), r.start));
        }
    }

    #[test]
    fn test_invalid_season() {
        let err = term_range("Spring 2024").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTerm(_)));
        assert!(term_range("Fall/Winter 2024-2026").is_err());
        assert!(term_range("Fall 2024-2025").is_err());
        assert!(term_range("").is_err());
    }

    #[test]
    fn test_is_term_in_progress_endpoints() {
        assert!(is_term_in_progress(Some("Winter 2024"), day(2024, 1, 1)));
        assert!(is_term_in_progress(Some("Winter 2024"), day(2024, 5, 4)));
        assert!(!is_term_in_progress(Some("Winter 2024"), day(2024, 5, 5)));
        assert!(!is_term_in_progress(None, day(2024, 3, 1)));
        assert!(!is_term_in_progress(Some("Someday 2024"), day(2024, 3, 1)));
    }

    #[test]
    fn test_current_term_matches_range() {
        for d in [day(2026, 1, 1), day(2026, 5, 4), day(2026, 5, 5), day(2026, 8, 31), day(2026, 9, 1)] {
            let t = Term::current(d);
            assert!(t.range().unwrap().contains(d), "{}", d);
        }
    }

    #[test]
    fn test_ordering_and_display() {
        let f: Term = "Fall 2023".parse().unwrap();
        let w: Term = "Winter 2024".parse().unwrap();
        let fw: Term = "fall/winter 2023-2024".parse().unwrap();
        assert!(f < w);
        assert!(f < fw);
        assert_eq!(fw.to_string(), "Fall/Winter 2023-2024");
        assert_eq!(fw.next().to_string(), "Summer 2024");
        assert_eq!(f.advance(3).to_string(), "Fall 2024");
    }
}
