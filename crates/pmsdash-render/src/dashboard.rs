//! HTML availability dashboard renderer
//!
//! Generates a standalone HTML page from an availability report:
//! - KPI cards (headcount, mean availability, bucket shares)
//! - SVG bar charts for the bucket distribution, roles and regions
//! - The associate table, filterable by bucket and searchable by name
//!
//! The page has no external assets and can be opened straight from disk.

use pmsdash_core::{
    AvailabilityBucket, AvailabilityReport, GroupStat, RenderError, Renderer, ReportSummary,
};
use svg::node::element::{Group, Rectangle, Text};
use svg::Document;

/// Default output file name
pub const DEFAULT_DASHBOARD_FILE: &str = "pms_dashboard.html";

/// Color theme for the dashboard
#[derive(Clone, Debug)]
pub struct DashboardTheme {
    pub background: String,
    pub surface: String,
    pub text: String,
    pub muted: String,
    pub accent: String,
    /// Bar colors per bucket, lowest range first
    pub bucket_colors: [String; 4],
}

impl Default for DashboardTheme {
    fn default() -> Self {
        Self::light()
    }
}

impl DashboardTheme {
    pub fn light() -> Self {
        Self {
            background: "#f4f6fa".into(),
            surface: "#ffffff".into(),
            text: "#2c3e50".into(),
            muted: "#7f8c8d".into(),
            accent: "#4472c4".into(),
            bucket_colors: [
                "#e74c3c".into(),
                "#f39c12".into(),
                "#3498db".into(),
                "#27ae60".into(),
            ],
        }
    }

    pub fn dark() -> Self {
        Self {
            background: "#1a1a2e".into(),
            surface: "#23233a".into(),
            text: "#eaeaea".into(),
            muted: "#9a9ab0".into(),
            accent: "#6c8ef5".into(),
            bucket_colors: [
                "#ff6b6b".into(),
                "#feca57".into(),
                "#54a0ff".into(),
                "#1dd1a1".into(),
            ],
        }
    }

    fn bucket_color(&self, bucket: AvailabilityBucket) -> &str {
        let idx = AvailabilityBucket::ALL
            .iter()
            .position(|b| *b == bucket)
            .unwrap_or(0);
        &self.bucket_colors[idx]
    }
}

/// HTML dashboard renderer configuration
#[derive(Clone, Debug)]
pub struct HtmlDashboardRenderer {
    /// Page title; defaults to "PMS Availability – <Month Year>"
    pub title: Option<String>,
    pub theme: DashboardTheme,
    /// Width of each chart in pixels
    pub chart_width: u32,
    /// Height of one bar in pixels
    pub bar_height: u32,
    /// Width reserved for bar labels
    pub label_width: u32,
    /// Groups beyond this many are folded into "Other"
    pub max_groups: usize,
    /// Include the filter/search script
    pub interactive: bool,
}

impl Default for HtmlDashboardRenderer {
    fn default() -> Self {
        Self {
            title: None,
            theme: DashboardTheme::light(),
            chart_width: 460,
            bar_height: 22,
            label_width: 130,
            max_groups: 10,
            interactive: true,
        }
    }
}

impl HtmlDashboardRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn dark_theme(mut self) -> Self {
        self.theme = DashboardTheme::dark();
        self
    }

    /// Render without the filter/search script
    pub fn static_page(mut self) -> Self {
        self.interactive = false;
        self
    }

    pub fn max_groups(mut self, max: usize) -> Self {
        self.max_groups = max.max(1);
        self
    }

    fn page_title(&self, summary: &ReportSummary) -> String {
        self.title
            .clone()
            .unwrap_or_else(|| format!("PMS Availability – {}", summary.period))
    }

    /// Keep the largest groups and fold the rest into one "Other" bar
    fn fold_groups(&self, groups: &[GroupStat]) -> Vec<GroupStat> {
        if groups.len() <= self.max_groups {
            return groups.to_vec();
        }
        let keep = self.max_groups.saturating_sub(1);
        let rest = &groups[keep..];
        let headcount: usize = rest.iter().map(|g| g.headcount).sum();
        let total: f64 = rest
            .iter()
            .map(|g| g.mean_availability * g.headcount as f64)
            .sum();
        let mut folded = groups[..keep].to_vec();
        folded.push(GroupStat {
            label: format!("Other ({})", rest.len()),
            headcount,
            mean_availability: if headcount == 0 { 0.0 } else { total / headcount as f64 },
        });
        folded
    }

    /// Horizontal bar chart, one bar per group
    fn bar_chart(&self, groups: &[GroupStat], colors: &[&str]) -> Result<String, RenderError> {
        let padding = 8u32;
        let gap = 6u32;
        let value_width = 48u32;
        let height = padding * 2 + groups.len().max(1) as u32 * (self.bar_height + gap);
        let bar_space = self
            .chart_width
            .saturating_sub(self.label_width + value_width + padding * 2)
            .max(1) as f64;
        let max = groups.iter().map(|g| g.headcount).max().unwrap_or(0).max(1) as f64;

        let mut document = Document::new()
            .set("width", self.chart_width)
            .set("height", height)
            .set("viewBox", (0, 0, self.chart_width, height))
            .set("class", "chart");

        for (i, group) in groups.iter().enumerate() {
            let y = padding + i as u32 * (self.bar_height + gap);
            let width = group.headcount as f64 / max * bar_space;
            let color = colors.get(i % colors.len().max(1)).copied().unwrap_or(self.theme.accent.as_str());

            let mut g = Group::new().set("class", "bar");
            g = g.add(
                Text::new(truncate(&group.label, 18))
                    .set("x", padding)
                    .set("y", y + self.bar_height / 2 + 4)
                    .set("font-size", 12)
                    .set("fill", self.theme.text.as_str()),
            );
            g = g.add(
                Rectangle::new()
                    .set("x", padding + self.label_width)
                    .set("y", y)
                    .set("width", width)
                    .set("height", self.bar_height)
                    .set("rx", 3)
                    .set("fill", color),
            );
            g = g.add(
                Text::new(format!("{}", group.headcount))
                    .set("x", f64::from(padding + self.label_width) + width + 6.0)
                    .set("y", y + self.bar_height / 2 + 4)
                    .set("font-size", 12)
                    .set("font-weight", "bold")
                    .set("fill", self.theme.muted.as_str()),
            );
            document = document.add(g);
        }

        let mut output = Vec::new();
        svg::write(&mut output, &document)
            .map_err(|e| RenderError::Format(format!("Failed to write SVG: {}", e)))?;
        String::from_utf8(output).map_err(|e| RenderError::Format(format!("Invalid UTF-8: {}", e)))
    }

    fn kpi_cards(&self, summary: &ReportSummary) -> String {
        let cards = [
            ("Associates", summary.headcount.to_string()),
            ("Mean availability", format!("{:.1}%", summary.mean_availability)),
            (
                "76–100% available",
                format!("{:.0}%", summary.bucket_share(AvailabilityBucket::From76To100)),
            ),
            (
                "0–25% available",
                format!("{:.0}%", summary.bucket_share(AvailabilityBucket::UpTo25)),
            ),
        ];
        cards
            .iter()
            .map(|(label, value)| {
                format!(
                    r#"            <div class="kpi"><div class="kpi-value">{}</div><div class="kpi-label">{}</div></div>"#,
                    html_escape(value),
                    html_escape(label)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn table_rows(&self, report: &AvailabilityReport) -> String {
        let mut out = String::new();
        for row in &report.rows {
            out.push_str(&format!(
                r#"                <tr data-bucket="{bucket}"><td>{role}</td><td>{region}</td><td><span class="pill" style="background:{color}">{bucket}</span></td><td>{id}</td><td>{name}</td><td class="num">{pct}</td></tr>
"#,
                bucket = row.availability_bucket.label(),
                color = self.theme.bucket_color(row.availability_bucket),
                role = html_escape(row.role.as_str()),
                region = html_escape(&row.region),
                id = html_escape(&row.associate_id.to_string()),
                name = html_escape(&row.associate_name),
                pct = format_percent(row.availability_percent),
            ));
        }
        out
    }

    fn filter_buttons(&self, summary: &ReportSummary) -> String {
        let mut out = String::from(r#"<button class="filter active" data-filter="all">All</button>"#);
        for bucket in AvailabilityBucket::ALL {
            out.push_str(&format!(
                r#"<button class="filter" data-filter="{label}">{label} ({count})</button>"#,
                label = bucket.label(),
                count = summary.bucket_headcount(bucket),
            ));
        }
        out
    }

    fn generate_css(&self) -> String {
        let t = &self.theme;
        format!(
            r#"        :root {{
            --bg: {bg};
            --surface: {surface};
            --text: {text};
            --muted: {muted};
            --accent: {accent};
        }}
        * {{ margin: 0; padding: 0; box-sizing: border-box; }}
        body {{
            font-family: system-ui, -apple-system, sans-serif;
            background: var(--bg);
            color: var(--text);
            padding: 24px;
        }}
        header {{ margin-bottom: 20px; }}
        header h1 {{ font-size: 1.6rem; font-weight: 600; }}
        header p {{ color: var(--muted); margin-top: 4px; font-size: 0.9rem; }}
        .kpis {{ display: flex; gap: 16px; flex-wrap: wrap; margin-bottom: 24px; }}
        .kpi {{
            background: var(--surface);
            border-top: 4px solid var(--accent);
            border-radius: 6px;
            padding: 16px 20px;
            min-width: 180px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.08);
        }}
        .kpi-value {{ font-size: 1.8rem; font-weight: 700; }}
        .kpi-label {{ color: var(--muted); font-size: 0.85rem; margin-top: 4px; }}
        .charts {{ display: flex; gap: 16px; flex-wrap: wrap; margin-bottom: 24px; }}
        .card {{
            background: var(--surface);
            border-radius: 6px;
            padding: 16px;
            box-shadow: 0 1px 3px rgba(0,0,0,0.08);
        }}
        .card h2 {{ font-size: 1rem; margin-bottom: 8px; }}
        .controls {{ display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 12px; }}
        .filter {{
            padding: 6px 12px;
            border: 1px solid var(--accent);
            background: transparent;
            color: var(--text);
            border-radius: 4px;
            cursor: pointer;
        }}
        .filter.active {{ background: var(--accent); color: #fff; }}
        #search {{ padding: 6px 10px; border: 1px solid var(--muted); border-radius: 4px; min-width: 220px; }}
        table {{ width: 100%; border-collapse: collapse; font-size: 0.9rem; }}
        th {{ background: var(--accent); color: #fff; text-align: center; padding: 8px; }}
        td {{ padding: 6px 8px; border-bottom: 1px solid rgba(127,127,127,0.2); }}
        td.num {{ text-align: right; font-variant-numeric: tabular-nums; }}
        .pill {{ color: #fff; padding: 2px 8px; border-radius: 10px; font-size: 0.8rem; white-space: nowrap; }}"#,
            bg = t.background,
            surface = t.surface,
            text = t.text,
            muted = t.muted,
            accent = t.accent,
        )
    }

    fn generate_js(&self) -> String {
        r#"        const rows = Array.from(document.querySelectorAll('#associates tbody tr'));
        const search = document.getElementById('search');
        let activeBucket = 'all';

        function applyFilters() {
            const term = search.value.trim().toLowerCase();
            rows.forEach(row => {
                const bucketOk = activeBucket === 'all' || row.dataset.bucket === activeBucket;
                const textOk = term === '' || row.textContent.toLowerCase().includes(term);
                row.style.display = bucketOk && textOk ? '' : 'none';
            });
        }

        document.querySelectorAll('.filter').forEach(button => {
            button.addEventListener('click', () => {
                document.querySelectorAll('.filter').forEach(b => b.classList.remove('active'));
                button.classList.add('active');
                activeBucket = button.dataset.filter;
                applyFilters();
            });
        });
        search.addEventListener('input', applyFilters);"#
            .to_string()
    }

    fn generate_html(&self, report: &AvailabilityReport) -> Result<String, RenderError> {
        let summary = ReportSummary::from_report(report);
        let title = self.page_title(&summary);

        let bucket_colors: Vec<&str> = AvailabilityBucket::ALL
            .iter()
            .map(|b| self.theme.bucket_color(*b))
            .collect();
        let accent = [self.theme.accent.as_str()];

        let bucket_chart = self.bar_chart(&summary.by_bucket, &bucket_colors)?;
        let role_chart = self.bar_chart(&self.fold_groups(&summary.by_role), &accent)?;
        let region_chart = self.bar_chart(&self.fold_groups(&summary.by_region), &accent)?;

        let (controls, js) = if self.interactive {
            (
                format!(
                    r#"            <div class="controls">{}<input id="search" type="search" placeholder="Search associates…"></div>"#,
                    self.filter_buttons(&summary)
                ),
                format!("    <script>\n{}\n    </script>\n", self.generate_js()),
            )
        } else {
            (String::new(), String::new())
        };

        Ok(format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <header>
        <h1>{title}</h1>
        <p>Source column: {source} ({rule}) · {read} rows read, {excluded} excluded by status</p>
    </header>
    <section class="kpis">
{kpis}
    </section>
    <section class="charts">
        <div class="card"><h2>Availability buckets</h2>
{bucket_chart}
        </div>
        <div class="card"><h2>Associates by role</h2>
{role_chart}
        </div>
        <div class="card"><h2>Associates by region</h2>
{region_chart}
        </div>
    </section>
    <section class="card">
{controls}
        <table id="associates">
            <thead>
                <tr><th>Current Role</th><th>Region</th><th>Avail Bucket</th><th>Associate ID</th><th>Associate Name</th><th>Current Availability</th></tr>
            </thead>
            <tbody>
{rows}            </tbody>
        </table>
    </section>
{js}</body>
</html>"#,
            title = html_escape(&title),
            css = self.generate_css(),
            source = html_escape(&summary.source_column),
            rule = report.source.rule,
            read = report.rows_read,
            excluded = report.rows_excluded,
            kpis = self.kpi_cards(&summary),
            bucket_chart = bucket_chart,
            role_chart = role_chart,
            region_chart = region_chart,
            controls = controls,
            rows = self.table_rows(report),
            js = js,
        ))
    }
}

impl Renderer for HtmlDashboardRenderer {
    type Output = String;

    fn render(&self, report: &AvailabilityReport) -> Result<String, RenderError> {
        if report.is_empty() {
            return Err(RenderError::InvalidData("No associates to render".into()));
        }
        self.generate_html(report)
    }
}

/// HTML-escape a string
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Truncate a string with ellipsis
fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        format!(
            "{}…",
            s.chars().take(max.saturating_sub(1)).collect::<String>()
        )
    }
}

/// `80` for whole percentages, `37.5` otherwise
fn format_percent(p: f64) -> String {
    if p.fract() == 0.0 {
        format!("{p:.0}")
    } else {
        format!("{p:.1}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pmsdash_core::{
        bucket_of, AssociateId, ColumnHeader, ReportRow, ReportingPeriod, Resolution, ResolutionRule, Role,
    };

    fn create_test_report(rows: &[(&str, &str, &str, f64)]) -> AvailabilityReport {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(i, (role, region, name, pct))| ReportRow {
                role: Role::Other((*role).into()),
                region: (*region).into(),
                availability_bucket: bucket_of(*pct),
                associate_id: AssociateId::from(2000 + i as u32),
                associate_name: (*name).into(),
                availability_percent: *pct,
            })
            .collect::<Vec<_>>();
        AvailabilityReport {
            period: ReportingPeriod::new(2025, 5).unwrap(),
            source: Resolution {
                index: 5,
                header: ColumnHeader::text("31-05-2025"),
                rule: ResolutionRule::TextMonthFragment,
            },
            rows_read: rows.len() + 1,
            rows_excluded: 1,
            rows,
        }
    }

    fn sample() -> AvailabilityReport {
        create_test_report(&[
            ("PM", "EMEA", "Ada", 90.0),
            ("PGM", "APAC", "Grace <Admin>", 37.5),
            ("PM", "EMEA", "Linus", 10.0),
        ])
    }

    #[test]
    fn dashboard_produces_valid_html() {
        let html = HtmlDashboardRenderer::new().render(&sample()).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("</html>"));
        assert!(html.contains("PMS Availability – May 2025"));
        assert!(html.contains("31-05-2025"));
        assert!(html.contains("<svg"));
    }

    #[test]
    fn dashboard_escapes_names() {
        let html = HtmlDashboardRenderer::new().render(&sample()).unwrap();
        assert!(html.contains("Grace &lt;Admin&gt;"));
        assert!(!html.contains("Grace <Admin>"));
    }

    #[test]
    fn dashboard_rows_carry_bucket_for_filtering() {
        let html = HtmlDashboardRenderer::new().render(&sample()).unwrap();
        assert!(html.contains(r#"<tr data-bucket="76–100%">"#));
        assert!(html.contains(r#"data-filter="0–25%">0–25% (1)"#));
        assert!(html.contains("<td class=\"num\">37.5</td>"));
    }

    #[test]
    fn static_page_has_no_script() {
        let html = HtmlDashboardRenderer::new().static_page().render(&sample()).unwrap();
        assert!(!html.contains("<script>"));
        assert!(!html.contains("id=\"search\""));
    }

    #[test]
    fn custom_title_and_dark_theme() {
        let renderer = HtmlDashboardRenderer::new().title("Team A").dark_theme();
        let html = renderer.render(&sample()).unwrap();
        assert!(html.contains("<title>Team A</title>"));
        assert!(html.contains("#1a1a2e"));
    }

    #[test]
    fn empty_report_fails() {
        let result = HtmlDashboardRenderer::new().render(&create_test_report(&[]));
        assert!(matches!(result, Err(RenderError::InvalidData(_))));
    }

    #[test]
    fn fold_groups_keeps_largest() {
        let groups: Vec<GroupStat> = (0..5)
            .map(|i| GroupStat {
                label: format!("R{i}"),
                headcount: 5 - i,
                mean_availability: 50.0,
            })
            .collect();
        let folded = HtmlDashboardRenderer::new().max_groups(3).fold_groups(&groups);
        assert_eq!(folded.len(), 3);
        assert_eq!(folded[2].label, "Other (3)");
        assert_eq!(folded[2].headcount, 3 + 2 + 1);
        assert_eq!(folded[2].mean_availability, 50.0);
    }

    #[test]
    fn bar_chart_has_one_bar_per_group() {
        let summary = ReportSummary::from_report(&sample());
        let svg = HtmlDashboardRenderer::new()
            .bar_chart(&summary.by_bucket, &["#000"])
            .unwrap();
        assert_eq!(svg.matches("<rect").count(), 4);
    }

    #[test]
    fn html_escape_works() {
        assert_eq!(html_escape("<script>"), "&lt;script&gt;");
        assert_eq!(html_escape("a & b"), "a &amp; b");
    }

    #[test]
    fn truncate_works() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a very long role name", 8), "a very …");
    }

    #[test]
    fn percent_formatting() {
        assert_eq!(format_percent(80.0), "80");
        assert_eq!(format_percent(37.5), "37.5");
    }
}
