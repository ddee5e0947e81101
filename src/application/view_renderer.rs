// View renderer - turns loaded tables into per-station chart panels
use crate::domain::dashboard::{ChartData, Panel, PanelContent, SeriesData, StationTab};
use crate::domain::palette::CategoryPalette;
use crate::domain::range_table::{LoadedRanges, RangeTable};
use crate::domain::station::{Granularity, RangeNameTemplate, Station};
use std::collections::HashMap;

/// One tab per station, one panel per granularity, in the order given.
/// A range that is absent or has no rows becomes a `NoData` panel.
pub fn render_stations(
    tables: &LoadedRanges,
    stations: &[Station],
    granularities: &[Granularity],
    palette: &CategoryPalette,
    template: &RangeNameTemplate,
    show_value_markers: bool,
) -> Vec<StationTab> {
    stations
        .iter()
        .map(|station| {
            let panels = granularities
                .iter()
                .map(|granularity| {
                    let range_name = template.compose(station, granularity);
                    let content = match tables.table(&range_name) {
                        Some(table) if !table.is_empty() => {
                            PanelContent::Chart(build_chart(table, palette, show_value_markers))
                        }
                        _ => {
                            tracing::debug!(range = %range_name, "no data for range");
                            PanelContent::NoData
                        }
                    };

                    Panel {
                        title: format!("{} {} analysis", station.id, granularity.label),
                        range_name,
                        content,
                    }
                })
                .collect();

            StationTab {
                station: station.clone(),
                panels,
            }
        })
        .collect()
}

/// Categorical x axis in table order, one series per category in first-appearance order
pub fn build_chart(table: &RangeTable, palette: &CategoryPalette, show_markers: bool) -> ChartData {
    let mut x_labels: Vec<String> = Vec::new();
    let mut x_index: HashMap<&str, usize> = HashMap::new();
    let mut series: Vec<SeriesData> = Vec::new();
    let mut series_index: HashMap<&str, usize> = HashMap::new();

    for row in &table.rows {
        let x = *x_index.entry(row.timestamp.as_str()).or_insert_with(|| {
            x_labels.push(row.timestamp.clone());
            x_labels.len() - 1
        });

        let s = *series_index.entry(row.category.as_str()).or_insert_with(|| {
            series.push(SeriesData {
                category: row.category.clone(),
                color: palette.color_for(&row.category).to_string(),
                points: Vec::new(),
            });
            series.len() - 1
        });

        series[s].points.push((x, row.value));
    }

    ChartData {
        x_labels,
        series,
        show_markers,
    }
}
