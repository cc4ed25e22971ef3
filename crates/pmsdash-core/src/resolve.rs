//! Availability column resolution.
//!
//! Roster sheets carry one availability column per reporting date, and the
//! header formats drift between files: real spreadsheet dates, `31-05-2025`,
//! `31.05.2025`, `1/5/2025`, or a label with a date embedded in it. The
//! resolver picks the column for the current reporting month by running an
//! ordered list of rules, first match wins:
//!
//! | Order | Rule                | Matches |
//! |-------|---------------------|---------|
//! | 1     | `DateMonth`         | first date header in the reporting month |
//! | 2     | `TextMonthFragment` | first text header whose month fragment is the zero-padded month |
//! | 3     | `TextMonthParsed`   | first text header whose month fragment parses to the month |
//! | 4     | `LastDateLike`      | last header that looks like a date at all |
//! | 5     | `FallbackLabel`     | first date-like header containing the fixed fallback label |
//!
//! When no rule matches, resolution fails with `ResolveError::Ambiguous` and
//! the caller picks a column with [`ColumnResolver::select_manual`].

use crate::{ColumnHeader, ReportingPeriod, ResolveError};
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;
use tracing::{debug, info, warn};

/// Label matched by the last-resort rule when nothing else applies
pub const DEFAULT_FALLBACK_LABEL: &str = "31-05-2025";

/// Day, month and year separated by any single non-digit character
fn date_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?:^|\D)(\d{1,2})\D(\d{1,2})\D(\d{4})(?:\D|$)").expect("date pattern is valid")
    })
}

fn text_date_captures(header: &ColumnHeader) -> Option<Captures<'_>> {
    header.as_text().and_then(|t| date_pattern().captures(t))
}

/// Which rule selected the availability column
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ResolutionRule {
    DateMonth,
    TextMonthFragment,
    TextMonthParsed,
    LastDateLike,
    FallbackLabel,
    /// Chosen explicitly by index
    Manual,
}

impl ResolutionRule {
    /// Rules that only guess; the chosen column may not belong to the period
    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::LastDateLike | Self::FallbackLabel)
    }
}

impl fmt::Display for ResolutionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DateMonth => "date header in reporting month",
            Self::TextMonthFragment => "text header with month fragment",
            Self::TextMonthParsed => "text header with parsed month",
            Self::LastDateLike => "last date-like header",
            Self::FallbackLabel => "fallback label",
            Self::Manual => "manual selection",
        };
        f.write_str(s)
    }
}

/// The column chosen as the availability source
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Resolution {
    /// 0-based column index
    pub index: usize,
    pub header: ColumnHeader,
    pub rule: ResolutionRule,
}

type RuleFn = fn(&ColumnResolver, &[ColumnHeader], ReportingPeriod) -> Option<usize>;

const RULES: [(ResolutionRule, RuleFn); 5] = [
    (ResolutionRule::DateMonth, ColumnResolver::match_date_month),
    (ResolutionRule::TextMonthFragment, ColumnResolver::match_text_fragment),
    (ResolutionRule::TextMonthParsed, ColumnResolver::match_text_parsed),
    (ResolutionRule::LastDateLike, ColumnResolver::match_last_date_like),
    (ResolutionRule::FallbackLabel, ColumnResolver::match_fallback_label),
];

/// Locates the availability column among roster headers
#[derive(Clone, Debug)]
pub struct ColumnResolver {
    /// Substring searched for by the last-resort rule
    pub fallback_label: Option<String>,
}

impl Default for ColumnResolver {
    fn default() -> Self {
        Self {
            fallback_label: Some(DEFAULT_FALLBACK_LABEL.into()),
        }
    }
}

impl ColumnResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the label searched for by the last-resort rule
    pub fn fallback_label(mut self, label: impl Into<String>) -> Self {
        self.fallback_label = Some(label.into());
        self
    }

    /// Disable the last-resort label rule
    pub fn no_fallback_label(mut self) -> Self {
        self.fallback_label = None;
        self
    }

    /// Pick the availability column for `period`.
    pub fn resolve(
        &self,
        headers: &[ColumnHeader],
        period: ReportingPeriod,
    ) -> Result<Resolution, ResolveError> {
        debug!(
            date_like = ?Self::date_like_columns(headers)
                .iter()
                .map(|i| headers[*i].label())
                .collect::<Vec<_>>(),
            "resolving availability column for {period}"
        );

        for (rule, matcher) in RULES {
            let Some(index) = matcher(self, headers, period) else {
                debug!(%rule, "no match");
                continue;
            };
            let header = headers[index].clone();
            if rule.is_fallback() {
                warn!(%rule, index, header = %header, "no column for {period}, using fallback");
            } else {
                info!(%rule, index, header = %header, "resolved availability column");
            }
            return Ok(Resolution { index, header, rule });
        }

        Err(ResolveError::Ambiguous {
            headers: headers.iter().map(ColumnHeader::label).collect(),
        })
    }

    /// Choose a column by explicit 0-based index
    pub fn select_manual(headers: &[ColumnHeader], index: usize) -> Result<Resolution, ResolveError> {
        let header = headers.get(index).ok_or(ResolveError::IndexOutOfRange {
            index,
            len: headers.len(),
        })?;
        info!(index, header = %header, "using manually selected column");
        Ok(Resolution {
            index,
            header: header.clone(),
            rule: ResolutionRule::Manual,
        })
    }

    /// True for date headers and text headers containing a loose date
    pub fn is_date_like(header: &ColumnHeader) -> bool {
        match header {
            ColumnHeader::Date(_) => true,
            ColumnHeader::Text(t) => date_pattern().is_match(t),
        }
    }

    /// Indices of every date-like header, in input order
    pub fn date_like_columns(headers: &[ColumnHeader]) -> Vec<usize> {
        headers
            .iter()
            .enumerate()
            .filter(|(_, h)| Self::is_date_like(h))
            .map(|(i, _)| i)
            .collect()
    }

    fn match_date_month(&self, headers: &[ColumnHeader], period: ReportingPeriod) -> Option<usize> {
        use chrono::Datelike;
        headers
            .iter()
            .position(|h| h.as_date().is_some_and(|d| d.month() == period.month))
    }

    fn match_text_fragment(&self, headers: &[ColumnHeader], period: ReportingPeriod) -> Option<usize> {
        let wanted = format!("{:02}", period.month);
        headers.iter().position(|h| {
            text_date_captures(h).is_some_and(|caps| caps.get(2).is_some_and(|m| m.as_str() == wanted))
        })
    }

    fn match_text_parsed(&self, headers: &[ColumnHeader], period: ReportingPeriod) -> Option<usize> {
        headers.iter().position(|h| {
            text_date_captures(h)
                .and_then(|caps| caps.get(2).and_then(|m| m.as_str().parse::<u32>().ok()))
                == Some(period.month)
        })
    }

    fn match_last_date_like(&self, headers: &[ColumnHeader], _period: ReportingPeriod) -> Option<usize> {
        headers.iter().rposition(Self::is_date_like)
    }

    fn match_fallback_label(&self, headers: &[ColumnHeader], _period: ReportingPeriod) -> Option<usize> {
        let label = self.fallback_label.as_deref()?;
        headers
            .iter()
            .position(|h| Self::is_date_like(h) && h.label().contains(label))
    }
}
