//! Aggregate statistics over an availability report.
//!
//! Feeds the dashboard charts and the `summary` command.

use crate::{AvailabilityBucket, AvailabilityReport, ReportRow};
use serde::Serialize;
use std::collections::HashMap;

/// Headcount and mean availability for one group (role, region or bucket)
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupStat {
    pub label: String,
    pub headcount: usize,
    pub mean_availability: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportSummary {
    pub period: String,
    pub source_column: String,
    pub headcount: usize,
    pub mean_availability: f64,
    /// One entry per bucket, lowest range first, empty buckets included
    pub by_bucket: Vec<GroupStat>,
    /// Sorted by headcount, largest first
    pub by_role: Vec<GroupStat>,
    /// Sorted by headcount, largest first
    pub by_region: Vec<GroupStat>,
}

impl ReportSummary {
    pub fn from_report(report: &AvailabilityReport) -> Self {
        let by_bucket = AvailabilityBucket::ALL
            .iter()
            .map(|bucket| {
                let rows: Vec<&ReportRow> = report
                    .rows
                    .iter()
                    .filter(|r| r.availability_bucket == *bucket)
                    .collect();
                GroupStat {
                    label: bucket.label().to_string(),
                    headcount: rows.len(),
                    mean_availability: mean(rows.iter().map(|r| r.availability_percent)),
                }
            })
            .collect();

        Self {
            period: report.period.to_string(),
            source_column: report.source.header.label(),
            headcount: report.rows.len(),
            mean_availability: mean(report.rows.iter().map(|r| r.availability_percent)),
            by_bucket,
            by_role: group_by(&report.rows, |r| r.role.as_str()),
            by_region: group_by(&report.rows, |r| r.region.as_str()),
        }
    }

    /// Headcount in `bucket`
    pub fn bucket_headcount(&self, bucket: AvailabilityBucket) -> usize {
        self.by_bucket
            .iter()
            .find(|g| g.label == bucket.label())
            .map_or(0, |g| g.headcount)
    }

    /// Percentage of associates in `bucket`, 0 for an empty report
    pub fn bucket_share(&self, bucket: AvailabilityBucket) -> f64 {
        if self.headcount == 0 {
            return 0.0;
        }
        self.bucket_headcount(bucket) as f64 * 100.0 / self.headcount as f64
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

fn group_by<'a>(rows: &'a [ReportRow], key: impl Fn(&'a ReportRow) -> &'a str) -> Vec<GroupStat> {
    let mut groups: HashMap<&str, (usize, f64)> = HashMap::new();
    for row in rows {
        let e = groups.entry(key(row)).or_insert((0, 0.0));
        e.0 += 1;
        e.1 += row.availability_percent;
    }
    let mut stats: Vec<GroupStat> = groups
        .into_iter()
        .map(|(label, (headcount, total))| GroupStat {
            label: if label.is_empty() { "(blank)".into() } else { label.to_string() },
            headcount,
            mean_availability: total / headcount as f64,
        })
        .collect();
    stats.sort_by(|a, b| b.headcount.cmp(&a.headcount).then_with(|| a.label.cmp(&b.label)));
    stats
}
