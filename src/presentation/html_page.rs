// HTML page rendering for the dashboard
use crate::domain::dashboard::{ChartData, Dashboard, StationTab};
use crate::presentation::svg_chart::render_chart_svg;
use minijinja::value::{Value, ViaDeserialize};
use minijinja::{Environment, context};

// The .html name turns on HTML auto-escaping
const PAGE_NAME: &str = "dashboard.html";
static PAGE_TEMPLATE: &str = include_str!("./dashboard.html");

/// Element id suffix for a tab. The index keeps ids unique when slugs collide or come out empty.
fn tab_key(index: usize, tab: &StationTab) -> String {
    let slug = tab.station.slug();
    if slug.is_empty() { index.to_string() } else { format!("{}-{}", index, slug) }
}

fn chart_markup(chart: &ChartData) -> Value {
    match render_chart_svg(chart) {
        Ok(svg) => Value::from_safe_string(svg),
        Err(e) => {
            tracing::warn!("Could not draw chart: {:#}", e);
            Value::from("Chart unavailable.")
        }
    }
}

pub fn render_dashboard_page(dashboard: &Dashboard) -> Result<String, minijinja::Error> {
    let mut env = Environment::new();
    env.add_template(PAGE_NAME, PAGE_TEMPLATE)?;
    env.add_function("chart_svg", |chart: ViaDeserialize<ChartData>| chart_markup(&chart.0));

    let tab_keys: Vec<String> = dashboard
        .tabs
        .iter()
        .enumerate()
        .map(|(i, tab)| tab_key(i, tab))
        .collect();

    env.get_template(PAGE_NAME)?.render(context! {
        dashboard => dashboard,
        last_modified => dashboard.last_modified.caption(),
        tab_keys => tab_keys,
    })
}
