use crate::age::AccountAge;
use crate::aggregator::ProfileReport;
use crate::compare::{merged_activity, radar_metrics};
use crate::stats::StatsSummary;
use chrono::NaiveDate;
use std::f32::consts::PI;

const WIDTH: f32 = 900.0;
const PADDING: f32 = 20.0;
const LINE_HEIGHT: f32 = 20.0;
const SECTION_GAP: f32 = 30.0;
const MIN_ROW_CHARS: usize = 60;
const MAX_TEXT_CHARS: usize = 56;
const MAX_DESCRIPTION_CHARS: usize = 96;

const CARD_HEIGHT: f32 = 60.0;
const CARD_GAP: f32 = 12.0;

const LANGUAGE_LIMIT: usize = 8;
const LABEL_WIDTH: f32 = 150.0;
const BAR_HEIGHT: f32 = 16.0;
const ROW_HEIGHT: f32 = 24.0;

const ACTIVITY_HEIGHT: f32 = 140.0;
const COMPARE_ACTIVITY_HEIGHT: f32 = 120.0;

const RADAR_SIZE: f32 = 520.0;
const RADAR_RADIUS: f32 = 160.0;

const NO_BIO: &str = "No bio, mysterious coder";

/// Series colours, reused in order.
pub const PALETTE: [&str; 8] = [
    "#8884d8", "#82ca9d", "#ffc658", "#ff7c7c", "#8dd1e1", "#d084d0", "#ffb347", "#87ceeb",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Theme {
    Dark,
    Light,
}

pub struct ThemeColors {
    pub bg: &'static str,
    pub panel: &'static str,
    pub text: &'static str,
    pub key: &'static str,
    pub value: &'static str,
    pub cc: &'static str,
    pub grid: &'static str,
}

impl Theme {
    pub fn colors(self) -> ThemeColors {
        match self {
            Theme::Dark => ThemeColors {
                bg: "#161b22",
                panel: "#21262d",
                text: "#c9d1d9",
                key: "#ffa657",
                value: "#a5d6ff",
                cc: "#616e7f",
                grid: "#30363d",
            },
            Theme::Light => ThemeColors {
                bg: "#ffffff",
                panel: "#f6f8fa",
                text: "#24292f",
                key: "#d73a49",
                value: "#0366d6",
                cc: "#6a737d",
                grid: "#d0d7de",
            },
        }
    }

    /// Used in output file names.
    pub fn name(self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(3)).collect();
    out.push_str("...");
    out
}

/// A `key: ....... value` line padded with dots to a common width.
struct StatRow {
    key: String,
    dots: String,
    value: String,
}

impl StatRow {
    fn new(key: &str, value: &str, align_width: usize) -> Self {
        let key = format!("{key}: ");
        let used = key.chars().count() + value.chars().count();
        let dots = match align_width.saturating_sub(used) {
            0 => String::new(),
            1 => " ".to_string(),
            n => format!("{} ", ".".repeat(n - 1)),
        };

        Self {
            key,
            dots,
            value: value.to_string(),
        }
    }
}

fn header_line(label: &str, align_width: usize) -> String {
    let base = format!("{label} ");
    let dashes = align_width.saturating_sub(base.chars().count()) + 2;
    format!("{base}{}", "-".repeat(dashes))
}

fn section_title(title: &str, y: f32) -> String {
    format!(
        "<text x=\"{PADDING}\" y=\"{y}\" class=\"key\" font-weight=\"bold\">{}</text>\n",
        escape_xml(title)
    )
}

fn no_data(y: f32) -> String {
    format!("<text x=\"{PADDING}\" y=\"{y}\" class=\"cc\">No data</text>\n")
}

// Each block takes its top edge and returns (markup, height).

fn profile_block(report: &ProfileReport, today: NaiveDate, top: f32) -> (String, f32) {
    let p = &report.profile;
    let age = AccountAge::between(p.created_at.date_naive(), today);
    let bio = p
        .bio
        .as_deref()
        .filter(|b| !b.trim().is_empty())
        .unwrap_or(NO_BIO);

    let rows: Vec<(&str, String)> = vec![
        ("Name", p.name.clone().unwrap_or_else(|| "-".to_string())),
        ("Bio", truncate(bio, MAX_TEXT_CHARS)),
        ("Followers", p.followers.to_string()),
        ("Following", p.following.to_string()),
        ("Public Repos", p.public_repos.to_string()),
        ("Joined", p.created_at.format("%Y-%m-%d").to_string()),
        ("Member for", age.to_string()),
    ];

    let align_width = rows
        .iter()
        .map(|(k, v)| k.len() + 2 + v.chars().count())
        .max()
        .unwrap_or(0)
        .max(MIN_ROW_CHARS);

    let mut y = top + LINE_HEIGHT;
    let mut out = format!(
        "<text x=\"{PADDING}\" y=\"{y}\" class=\"text\">{}</text>\n",
        escape_xml(&header_line(&format!("@{}", p.login), align_width))
    );

    for (key, value) in &rows {
        y += LINE_HEIGHT;
        let row = StatRow::new(key, value, align_width);
        out.push_str(&format!(
            r#"<text x="{PADDING}" y="{y}"><tspan class="cc">. </tspan><tspan class="key">{}</tspan><tspan class="cc">{}</tspan><tspan class="value">{}</tspan></text>
"#,
            escape_xml(&row.key),
            escape_xml(&row.dots),
            escape_xml(&row.value)
        ));
    }

    (out, y - top)
}

fn stat_cards(stats: &StatsSummary, top: f32) -> (String, f32) {
    let cards = [
        ("Repos", stats.total_repos as u64),
        ("Stars", stats.total_stars),
        ("Forks", stats.total_forks),
        ("Watchers", stats.total_watchers),
    ];
    let n = cards.len() as f32;
    let card_width = (WIDTH - 2.0 * PADDING - CARD_GAP * (n - 1.0)) / n;

    let mut out = String::new();
    for (i, (title, value)) in cards.iter().enumerate() {
        let x = PADDING + i as f32 * (card_width + CARD_GAP);
        out.push_str(&format!(
            r#"<rect x="{x}" y="{top}" width="{card_width}" height="{CARD_HEIGHT}" rx="6" class="panel"/>
<text x="{tx}" y="{ty}" class="cc">{title}</text>
<text x="{tx}" y="{vy}" class="value" font-size="20px">{value}</text>
"#,
            tx = x + 10.0,
            ty = top + 22.0,
            vy = top + 48.0,
        ));
    }

    (out, CARD_HEIGHT)
}

fn language_bars(stats: &StatsSummary, top: f32) -> (String, f32) {
    let mut out = section_title("Languages", top + LINE_HEIGHT);
    let langs = stats.languages_by_count(LANGUAGE_LIMIT);
    if langs.is_empty() {
        out.push_str(&no_data(top + LINE_HEIGHT * 2.5));
        return (out, LINE_HEIGHT * 3.0);
    }

    let first_row = top + LINE_HEIGHT * 1.75;
    let max = langs.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f32;
    let bar_max = WIDTH - 2.0 * PADDING - LABEL_WIDTH - 140.0;

    for (i, (name, count)) in langs.iter().enumerate() {
        let y = first_row + i as f32 * ROW_HEIGHT;
        let width = (*count as f32 / max * bar_max).max(2.0);
        let bar_x = PADDING + LABEL_WIDTH;
        out.push_str(&format!(
            r#"<text x="{PADDING}" y="{ly}" class="text">{label}</text>
<rect x="{bar_x}" y="{y}" width="{width:.1}" height="{BAR_HEIGHT}" rx="3" fill="{colour}"/>
<text x="{vx:.1}" y="{ly}" class="cc">{count} ({share:.1}%)</text>
"#,
            ly = y + BAR_HEIGHT - 3.0,
            label = escape_xml(&truncate(name, 16)),
            colour = PALETTE[i % PALETTE.len()],
            vx = bar_x + width + 8.0,
            share = stats.language_share(name),
        ));
    }

    (out, LINE_HEIGHT * 1.75 + langs.len() as f32 * ROW_HEIGHT)
}

fn activity_chart(stats: &StatsSummary, top: f32) -> (String, f32) {
    let mut out = section_title("Activity", top + LINE_HEIGHT);
    let years = stats.activity_by_year();
    if years.is_empty() {
        out.push_str(&no_data(top + LINE_HEIGHT * 2.5));
        return (out, LINE_HEIGHT * 3.0);
    }

    let base = top + LINE_HEIGHT * 2.0 + ACTIVITY_HEIGHT;
    let max = years.iter().map(|(_, c)| *c).max().unwrap_or(1).max(1) as f32;
    let slot = (WIDTH - 2.0 * PADDING) / years.len() as f32;
    let bar_width = slot * 0.6;

    out.push_str(&format!(
        "<line x1=\"{PADDING}\" y1=\"{base}\" x2=\"{x2}\" y2=\"{base}\" class=\"grid\"/>\n",
        x2 = WIDTH - PADDING
    ));

    let mut points = Vec::with_capacity(years.len());
    for (i, (year, count)) in years.iter().enumerate() {
        let height = *count as f32 / max * ACTIVITY_HEIGHT;
        let x = PADDING + i as f32 * slot + slot * 0.2;
        let mid = x + bar_width / 2.0;
        let bar_top = base - height;
        out.push_str(&format!(
            r#"<rect x="{x:.1}" y="{bar_top:.1}" width="{bar_width:.1}" height="{height:.1}" fill="{fill}"/>
<text x="{mid:.1}" y="{cy:.1}" class="value" text-anchor="middle">{count}</text>
<text x="{mid:.1}" y="{yy:.1}" class="cc" text-anchor="middle">{year}</text>
"#,
            fill = PALETTE[0],
            cy = bar_top - 4.0,
            yy = base + 16.0,
        ));
        points.push(format!("{mid:.1},{bar_top:.1}"));
    }

    out.push_str(&format!(
        "<polyline points=\"{}\" fill=\"none\" stroke=\"{}\" stroke-width=\"2\"/>\n",
        points.join(" "),
        PALETTE[1]
    ));

    (out, LINE_HEIGHT * 2.0 + ACTIVITY_HEIGHT + 24.0)
}

fn top_repo_list(stats: &StatsSummary, top: f32) -> (String, f32) {
    let mut out = section_title("Top Repositories", top + LINE_HEIGHT);
    if stats.top_repos.is_empty() {
        out.push_str(&no_data(top + LINE_HEIGHT * 2.5));
        return (out, LINE_HEIGHT * 3.0);
    }

    let mut y = top + LINE_HEIGHT;
    for repo in &stats.top_repos {
        y += LINE_HEIGHT;
        out.push_str(&format!(
            r#"<text y="{y}"><tspan x="{PADDING}" class="value">{name}</tspan><tspan x="{lx}" class="cc">{lang}</tspan><tspan x="{sx}" class="text">★ {stars}</tspan><tspan x="{fx}" class="text">forks {forks}</tspan></text>
"#,
            name = escape_xml(&truncate(&repo.name, 40)),
            lang = escape_xml(repo.language.as_deref().unwrap_or("-")),
            stars = repo.stargazers_count,
            forks = repo.forks_count,
            lx = PADDING + 420.0,
            sx = PADDING + 600.0,
            fx = PADDING + 720.0,
        ));

        if let Some(desc) = repo.description.as_deref().filter(|d| !d.trim().is_empty()) {
            y += LINE_HEIGHT * 0.85;
            out.push_str(&format!(
                "<text x=\"{PADDING}\" y=\"{y}\" class=\"cc\" font-size=\"12px\">{}</text>\n",
                escape_xml(&truncate(desc.trim(), MAX_DESCRIPTION_CHARS))
            ));
        }
    }

    (out, y - top)
}

/// One line per user over the union of both users' creation years.
fn activity_comparison(
    a: &ProfileReport,
    b: &ProfileReport,
    top: f32,
    width: f32,
) -> (String, f32) {
    let mut out = section_title("Activity Comparison", top + LINE_HEIGHT);
    let years = merged_activity(a, b);
    if years.is_empty() {
        out.push_str(&no_data(top + LINE_HEIGHT * 2.5));
        return (out, LINE_HEIGHT * 3.0);
    }

    let base = top + LINE_HEIGHT * 2.0 + COMPARE_ACTIVITY_HEIGHT;
    let max = years
        .iter()
        .map(|(_, ca, cb)| (*ca).max(*cb))
        .max()
        .unwrap_or(1)
        .max(1) as f32;
    let inner = width - 2.0 * PADDING;
    let x_at = |i: usize| {
        if years.len() == 1 {
            width / 2.0
        } else {
            PADDING + i as f32 * inner / (years.len() - 1) as f32
        }
    };
    let y_at = |count: u32| base - count as f32 / max * COMPARE_ACTIVITY_HEIGHT;

    out.push_str(&format!(
        "<line x1=\"{PADDING}\" y1=\"{base}\" x2=\"{x2}\" y2=\"{base}\" class=\"grid\"/>\n",
        x2 = width - PADDING
    ));

    for (i, (year, _, _)) in years.iter().enumerate() {
        out.push_str(&format!(
            "<text x=\"{x:.1}\" y=\"{y:.1}\" class=\"cc\" text-anchor=\"middle\">{year}</text>\n",
            x = x_at(i),
            y = base + 16.0,
        ));
    }

    let series: [(Vec<u32>, &str); 2] = [
        (years.iter().map(|(_, ca, _)| *ca).collect(), PALETTE[0]),
        (years.iter().map(|(_, _, cb)| *cb).collect(), PALETTE[1]),
    ];
    for (counts, colour) in &series {
        let points: Vec<String> = counts
            .iter()
            .enumerate()
            .map(|(i, c)| format!("{:.1},{:.1}", x_at(i), y_at(*c)))
            .collect();
        out.push_str(&format!(
            "<polyline points=\"{}\" fill=\"none\" stroke=\"{colour}\" stroke-width=\"2\"/>\n",
            points.join(" ")
        ));
        for (i, c) in counts.iter().enumerate() {
            out.push_str(&format!(
                "<circle cx=\"{:.1}\" cy=\"{:.1}\" r=\"3\" fill=\"{colour}\"/>\n",
                x_at(i),
                y_at(*c)
            ));
        }
    }

    (out, LINE_HEIGHT * 2.0 + COMPARE_ACTIVITY_HEIGHT + 24.0)
}

fn wrap_svg(width: f32, height: f32, theme: Theme, body: &str) -> String {
    let colors = theme.colors();

    format!(
        r#"<?xml version='1.0' encoding='UTF-8'?>
<svg xmlns="http://www.w3.org/2000/svg"
     width="{width}px" height="{height}px"
     font-family="ConsolasFallback,Consolas,monospace"
     font-size="14px">

<style>
.text  {{ fill: {text}; }}
.key   {{ fill: {key}; }}
.value {{ fill: {value}; }}
.cc    {{ fill: {cc}; }}
.panel {{ fill: {panel}; }}
.grid  {{ stroke: {grid}; fill: none; }}
</style>

<rect width="{width}px" height="{height}px" fill="{bg}" rx="15"/>

{body}
</svg>
"#,
        text = colors.text,
        key = colors.key,
        value = colors.value,
        cc = colors.cc,
        panel = colors.panel,
        grid = colors.grid,
        bg = colors.bg,
    )
}

/// Full dashboard for one user: profile card, totals, languages, activity and top repositories.
pub fn render_profile(report: &ProfileReport, today: NaiveDate, theme: Theme) -> String {
    let mut body = String::new();
    let mut y = PADDING;

    let (markup, height) = profile_block(report, today, y);
    body.push_str(&markup);
    y += height + SECTION_GAP;

    let (markup, height) = stat_cards(&report.stats, y);
    body.push_str(&markup);
    y += height + SECTION_GAP;

    let (markup, height) = language_bars(&report.stats, y);
    body.push_str(&markup);
    y += height + SECTION_GAP;

    let (markup, height) = activity_chart(&report.stats, y);
    body.push_str(&markup);
    y += height + SECTION_GAP;

    let (markup, height) = top_repo_list(&report.stats, y);
    body.push_str(&markup);
    y += height + PADDING;

    wrap_svg(WIDTH, y, theme, &body)
}

/// Two-user view: a radar of the headline numbers, one translucent polygon
/// each, above a yearly activity line chart.
pub fn render_comparison(a: &ProfileReport, b: &ProfileReport, theme: Theme) -> String {
    let metrics = radar_metrics(a, b);
    let n = metrics.len();
    let cx = RADAR_SIZE / 2.0;
    let cy = RADAR_SIZE / 2.0 + 20.0;

    let angle = |i: usize| -PI / 2.0 + i as f32 * 2.0 * PI / n as f32;
    let point = |i: usize, pct: f32| {
        let r = RADAR_RADIUS * pct / 100.0;
        (cx + r * angle(i).cos(), cy + r * angle(i).sin())
    };
    let polygon = |values: &[f32]| {
        values
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let (x, y) = point(i, *v);
                format!("{x:.1},{y:.1}")
            })
            .collect::<Vec<_>>()
            .join(" ")
    };

    let mut body = String::new();

    for level in [25.0, 50.0, 75.0, 100.0] {
        body.push_str(&format!(
            "<polygon points=\"{}\" class=\"grid\"/>\n",
            polygon(vec![level; n].as_slice())
        ));
    }

    for (i, metric) in metrics.iter().enumerate() {
        let (x, y) = point(i, 100.0);
        body.push_str(&format!(
            "<line x1=\"{cx}\" y1=\"{cy}\" x2=\"{x:.1}\" y2=\"{y:.1}\" class=\"grid\"/>\n"
        ));

        let (lx, ly) = point(i, 120.0);
        let cos = angle(i).cos();
        let anchor = if cos.abs() < 0.1 {
            "middle"
        } else if cos > 0.0 {
            "start"
        } else {
            "end"
        };
        body.push_str(&format!(
            r#"<text x="{lx:.1}" y="{ly:.1}" class="text" text-anchor="{anchor}">{subject}</text>
<text x="{lx:.1}" y="{sy:.1}" class="cc" text-anchor="{anchor}">{raw_a} / {raw_b}</text>
"#,
            subject = metric.subject,
            sy = ly + 16.0,
            raw_a = metric.raw_a,
            raw_b = metric.raw_b,
        ));
    }

    let series = [
        (
            &a.profile.login,
            metrics.iter().map(|m| m.scaled_a as f32).collect::<Vec<_>>(),
            PALETTE[0],
        ),
        (
            &b.profile.login,
            metrics.iter().map(|m| m.scaled_b as f32).collect::<Vec<_>>(),
            PALETTE[1],
        ),
    ];

    for (i, (login, values, colour)) in series.iter().enumerate() {
        body.push_str(&format!(
            "<polygon points=\"{}\" fill=\"{colour}\" fill-opacity=\"0.5\" stroke=\"{colour}\" stroke-width=\"2\"/>\n",
            polygon(values.as_slice())
        ));

        let ly = PADDING + i as f32 * LINE_HEIGHT;
        body.push_str(&format!(
            r#"<rect x="{PADDING}" y="{ry}" width="12" height="12" fill="{colour}"/>
<text x="{tx}" y="{ty}" class="text">@{login}</text>
"#,
            ry = ly,
            tx = PADDING + 18.0,
            ty = ly + 11.0,
            login = escape_xml(login),
        ));
    }

    let (markup, height) = activity_comparison(a, b, RADAR_SIZE + 40.0, RADAR_SIZE);
    body.push_str(&markup);

    wrap_svg(RADAR_SIZE, RADAR_SIZE + 40.0 + height + PADDING, theme, &body)
}
