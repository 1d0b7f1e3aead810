// Small inline SVG charts fed with pre-aggregated series.

use maud::{html, Markup};

const WIDTH: f64 = 300.0;
const HEIGHT: f64 = 200.0;
const PAD: f64 = 24.0;
const PRIMARY: &str = "#2563eb";
const SUCCESS: &str = "#16a34a";
const MUTED: &str = "#e2e8f0";

fn max_count(series: &[(String, usize)]) -> f64 {
    series.iter().map(|(_, n)| *n).max().unwrap_or(0).max(1) as f64
}

fn empty_chart() -> Markup {
    html! {
        p class="muted" style="text-align: center; padding: 64px 0;" { "Aucune donnée" }
    }
}

/// One bar per entry, in the order given.
pub fn bar_chart(series: &[(String, usize)]) -> Markup {
    if series.is_empty() {
        return empty_chart();
    }
    let max = max_count(series);
    let plot_h = HEIGHT - 2.0 * PAD;
    let slot = (WIDTH - 2.0 * PAD) / series.len() as f64;
    let bar_w = slot * 0.7;

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) width="100%" height="200" role="img" {
            line x1=(PAD) y1=(HEIGHT - PAD) x2=(WIDTH - PAD) y2=(HEIGHT - PAD) stroke=(MUTED) {}
            @for (i, (label, count)) in series.iter().enumerate() {
                @let h = plot_h * (*count as f64) / max;
                @let x = PAD + slot * i as f64 + (slot - bar_w) / 2.0;
                rect x=(format!("{x:.1}")) y=(format!("{:.1}", HEIGHT - PAD - h))
                    width=(format!("{bar_w:.1}")) height=(format!("{h:.1}")) fill=(PRIMARY) {
                    title { (label) ": " (count) }
                }
                text x=(format!("{:.1}", x + bar_w / 2.0)) y=(HEIGHT - 8.0)
                    font-size="9" text-anchor="middle" { (label) }
            }
        }
    }
}

/// Points joined left to right, in the order given.
pub fn line_chart(series: &[(String, usize)]) -> Markup {
    if series.is_empty() {
        return empty_chart();
    }
    let max = max_count(series);
    let plot_h = HEIGHT - 2.0 * PAD;
    let step = if series.len() > 1 {
        (WIDTH - 2.0 * PAD) / (series.len() - 1) as f64
    } else {
        0.0
    };
    let points: Vec<(f64, f64)> = series
        .iter()
        .enumerate()
        .map(|(i, (_, n))| {
            (
                PAD + step * i as f64,
                HEIGHT - PAD - plot_h * (*n as f64) / max,
            )
        })
        .collect();
    let polyline = points
        .iter()
        .map(|(x, y)| format!("{x:.1},{y:.1}"))
        .collect::<Vec<_>>()
        .join(" ");

    html! {
        svg viewBox=(format!("0 0 {WIDTH} {HEIGHT}")) width="100%" height="200" role="img" {
            line x1=(PAD) y1=(HEIGHT - PAD) x2=(WIDTH - PAD) y2=(HEIGHT - PAD) stroke=(MUTED) {}
            polyline points=(polyline) fill="none" stroke=(PRIMARY) stroke-width="2" {}
            @for ((label, count), (x, y)) in series.iter().zip(&points) {
                circle cx=(format!("{x:.1}")) cy=(format!("{y:.1}")) r="3" fill=(PRIMARY) {
                    title { (label) ": " (count) }
                }
                text x=(format!("{x:.1}")) y=(HEIGHT - 8.0) font-size="9" text-anchor="middle" { (label) }
            }
        }
    }
}

/// Whole percent, rounded half away from zero.
pub fn percent(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (part as f64 * 100.0 / total as f64).round() as u32
}

/// Two-slice donut: hot vs everything else.
pub fn hot_cold_chart(hot: usize, other: usize) -> Markup {
    let total = hot + other;
    if total == 0 {
        return empty_chart();
    }
    let hot_pct = hot as f64 * 100.0 / total as f64;

    html! {
        svg viewBox="0 0 42 42" width="100%" height="160" role="img" {
            // r = 100 / (2 * pi): the circumference is 100, so dash lengths are percentages.
            circle cx="21" cy="21" r="15.915" fill="none" stroke=(MUTED) stroke-width="6" {}
            circle cx="21" cy="21" r="15.915" fill="none" stroke=(SUCCESS) stroke-width="6"
                stroke-dasharray=(format!("{hot_pct:.2} {:.2}", 100.0 - hot_pct))
                stroke-dashoffset="25" {}
        }
        p style="text-align: center; font-size: 0.85rem; margin: 4px 0 0;" {
            span style=(format!("color: {SUCCESS};")) { "Chauds: " (percent(hot, total)) "%" }
            " · "
            span class="muted" { "Autres: " (percent(other, total)) "%" }
        }
    }
}
