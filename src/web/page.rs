//! Server-rendered dashboard page.

use crate::charts::{
    format_currency, format_thousands, hex, ChartKind, ChartRenderer, RenderError, DANGER, DARK,
    INFO, LIGHT, MUTED, PRIMARY, SUCCESS, WARNING,
};
use crate::config::DashboardSettings;
use crate::dashboard::DashboardSnapshot;
use crate::data::{InventoryStatus, Selection, StockSeverity};
use crate::stats::KpiSummary;
use crate::web::query::{query_string, DashboardTab, DATE_FORMAT};
use chrono::NaiveDate;

pub fn render_page(
    snapshot: &DashboardSnapshot,
    tab: DashboardTab,
    tick: u64,
    settings: &DashboardSettings,
) -> Result<String, RenderError> {
    let chart_svg = match snapshot.chart(tab.chart()) {
        Some(chart) => {
            ChartRenderer::render_svg(chart, settings.chart_width, settings.chart_height)?
        }
        None => String::new(),
    };
    let gauge_svg = match snapshot.chart(ChartKind::StockHealth) {
        Some(chart) => ChartRenderer::render_svg(chart, 520, settings.chart_height)?,
        None => String::new(),
    };

    let current = query_string(&snapshot.filter, tab, tick);
    let next = query_string(&snapshot.filter, tab, tick.saturating_add(1));
    let title = html_escape(&snapshot.title);

    let mut html = String::with_capacity(64 * 1024);
    html.push_str(&format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta http-equiv="refresh" content="{refresh};url=/?{next}">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
"#,
        refresh = settings.refresh_interval_secs,
        next = html_escape(&next),
        style = stylesheet(),
    ));

    html.push_str(&format!(
        r#"<header>
<div><h1>{title}</h1><p class="clock">Last Updated: {clock}</p></div>
<div class="actions"><a class="button" href="/?{next}">Refresh Data</a> <a class="button secondary" href="/api/export?{current}">Export Report</a></div>
</header>
"#,
        clock = snapshot.generated_at.format("%Y-%m-%d %H:%M:%S"),
        next = html_escape(&next),
        current = html_escape(&current),
    ));

    html.push_str(&filter_form(snapshot, tab, tick));
    html.push_str(&kpi_cards(&snapshot.kpis));

    html.push_str("<section class=\"panel\">\n<nav class=\"tabs\">");
    for candidate in DashboardTab::ALL {
        let class = if candidate == tab { "tab active" } else { "tab" };
        html.push_str(&format!(
            r#"<a class="{class}" href="/?{href}">{label}</a>"#,
            href = html_escape(&query_string(&snapshot.filter, candidate, tick)),
            label = candidate.label(),
        ));
    }
    html.push_str(&format!(
        "</nav>\n<div id=\"{id}\" class=\"chart\">{chart_svg}</div>\n</section>\n",
        id = tab.id(),
    ));

    html.push_str(&inventory_section(&snapshot.inventory, &gauge_svg));
    html.push_str("</body>\n</html>\n");
    Ok(html)
}

fn filter_form(snapshot: &DashboardSnapshot, tab: DashboardTab, tick: u64) -> String {
    let options = &snapshot.options;
    let date = |d: Option<NaiveDate>| {
        d.map(|d| d.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    };

    format!(
        r#"<form class="filters" method="get" action="/">
<label>Start date <input type="date" name="start" value="{start}" min="{min}" max="{max}"></label>
<label>End date <input type="date" name="end" value="{end}" min="{min}" max="{max}"></label>
<label>Region <select name="region">{regions}</select></label>
<label>Category <select name="category">{categories}</select></label>
<input type="hidden" name="tab" value="{tab}">
<input type="hidden" name="tick" value="{tick}">
<button type="submit">Apply</button>
</form>
"#,
        start = date(snapshot.filter.start),
        end = date(snapshot.filter.end),
        min = date(options.min_date),
        max = date(options.max_date),
        regions = select_options("All Regions", &options.regions, &snapshot.filter.region),
        categories = select_options(
            "All Categories",
            &options.categories,
            &snapshot.filter.category
        ),
        tab = tab.id(),
    )
}

fn select_options(all_label: &str, values: &[String], selected: &Selection) -> String {
    let mut out = format!(
        r#"<option value="all"{}>{}</option>"#,
        if selected.is_all() { " selected" } else { "" },
        all_label
    );
    for value in values {
        let is_selected = matches!(selected, Selection::Only(v) if v == value);
        out.push_str(&format!(
            r#"<option value="{v}"{s}>{v}</option>"#,
            v = html_escape(value),
            s = if is_selected { " selected" } else { "" },
        ));
    }
    out
}

fn kpi_cards(kpis: &KpiSummary) -> String {
    let growth = match kpis.growth_pct {
        Some(pct) => format!("{pct:+.1}% vs previous period"),
        None => "No previous period".to_string(),
    };
    let per_order = match kpis.avg_units_per_order {
        Some(avg) => format!("Avg: {avg:.1} per order"),
        None => "No data".to_string(),
    };

    format!(
        r#"<section class="kpis">
<div class="card" style="border-color:{success}"><h3 style="color:{success}">{sales}</h3><p>Total Sales</p><p class="note">{growth}</p></div>
<div class="card" style="border-color:{primary}"><h3 style="color:{primary}">{units}</h3><p>Units Sold</p><p class="note">{per_order}</p></div>
<div class="card" style="border-color:{warning}"><h3 style="color:{warning}">{aov}</h3><p>Avg Order Value</p><p class="note">{orders} total orders</p></div>
</section>
"#,
        success = hex(SUCCESS),
        primary = hex(PRIMARY),
        warning = hex(WARNING),
        sales = format_currency(kpis.total_sales),
        units = format_thousands(kpis.total_units as f64),
        aov = format_currency(kpis.avg_order_value),
        orders = kpis.order_count,
    )
}

fn inventory_section(status: &InventoryStatus, gauge_svg: &str) -> String {
    let alerts = if status.all_well_stocked() {
        format!(
            r#"<p class="ok" style="color:{}">All products are well stocked!</p>"#,
            hex(SUCCESS)
        )
    } else {
        let mut rows = String::new();
        for item in &status.low_stock {
            let color = match item.severity {
                StockSeverity::Critical => DANGER,
                StockSeverity::Low => WARNING,
            };
            rows.push_str(&format!(
                r#"<tr><td>{product}</td><td class="num">{stock}</td><td class="num">{reorder}</td><td><span class="badge" style="background:{color}">{label}</span></td></tr>"#,
                product = html_escape(&item.product),
                stock = item.stock,
                reorder = item.reorder_level,
                color = hex(color),
                label = item.severity.label(),
            ));
        }
        format!(
            "<table><thead><tr><th>Product</th><th>Current Stock</th><th>Reorder Level</th><th>Status</th></tr></thead><tbody>{rows}</tbody></table>"
        )
    };

    format!(
        r#"<section class="inventory">
<div class="panel half"><h3>Real-Time Stock Monitor</h3>{gauge_svg}</div>
<div class="panel half"><h3>Live Low Stock Alerts</h3>{alerts}</div>
</section>
"#
    )
}

fn stylesheet() -> String {
    format!(
        "body{{font-family:sans-serif;background:{light};color:{dark};margin:0;padding:20px}}\
header{{display:flex;justify-content:space-between;align-items:center;background:{dark};color:#fff;padding:20px;border-radius:10px;margin-bottom:20px}}\
header h1{{margin:0}}.clock{{margin:4px 0 0;color:{light}}}\
.button{{background:{primary};color:#fff;padding:10px 16px;border-radius:6px;text-decoration:none}}\
.button.secondary{{background:{info}}}\
.filters{{display:flex;gap:16px;flex-wrap:wrap;align-items:end;background:#fff;padding:16px;border-radius:10px;margin-bottom:20px}}\
.filters label{{display:flex;flex-direction:column;font-weight:bold;gap:6px}}\
.kpis{{display:flex;gap:20px;margin-bottom:20px}}\
.card{{flex:1;background:#fff;border-left:5px solid;border-radius:10px;padding:20px}}\
.card h3{{font-size:2rem;margin:0}}.card p{{margin:4px 0;color:{muted}}}.note{{font-size:.9rem}}\
.panel{{background:#fff;border-radius:10px;padding:20px;margin-bottom:20px}}\
.tabs{{display:flex;gap:8px;margin-bottom:12px}}\
.tab{{padding:8px 14px;border-radius:6px;text-decoration:none;color:{dark};background:{light}}}\
.tab.active{{background:{primary};color:#fff}}\
.inventory{{display:flex;gap:20px}}.half{{flex:1}}\
table{{width:100%;border-collapse:collapse}}th{{background:{dark};color:#fff;padding:10px;text-align:left}}\
td{{padding:10px;border-bottom:1px solid {light}}}.num{{font-weight:bold}}\
.badge{{color:#fff;padding:3px 8px;border-radius:4px;font-size:.8rem}}.ok{{font-size:1.2rem}}",
        light = hex(LIGHT),
        dark = hex(DARK),
        primary = hex(PRIMARY),
        info = hex(INFO),
        muted = hex(MUTED),
    )
}

pub fn html_escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::data::{fixture_dataset, SalesFilter};

    fn page(filter: SalesFilter, tab: DashboardTab) -> String {
        let settings = Settings::default();
        let snapshot = DashboardSnapshot::build(&fixture_dataset(), &settings, filter, 4).unwrap();
        render_page(&snapshot, tab, 4, &settings.dashboard).unwrap()
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(
            html_escape(r#"<b>"Tom & Jerry's"</b>"#),
            "&lt;b&gt;&quot;Tom &amp; Jerry&#39;s&quot;&lt;/b&gt;"
        );
    }

    #[test]
    fn page_shows_kpis_alerts_and_active_tab() {
        let html = page(SalesFilter::default(), DashboardTab::Trends);

        assert!(html.contains("$785"));
        assert!(html.contains("Units Sold"));
        assert!(html.contains("7 total orders"));
        assert!(html.contains(r#"class="tab active""#));
        assert!(html.contains(r#"id="trends-tab""#));
        assert!(html.contains("Sales Trend Over Time"));
        assert!(html.contains("CRITICAL"));
        assert!(html.contains("tick=5"));
        assert!(html.contains(r#"<option value="North">North</option>"#));
    }

    #[test]
    fn selected_region_is_marked() {
        let filter = SalesFilter {
            region: Selection::Only("South".into()),
            ..SalesFilter::default()
        };
        let html = page(filter, DashboardTab::Sales);
        assert!(html.contains(r#"<option value="South" selected>South</option>"#));
        assert!(html.contains("$270"));
    }
}
