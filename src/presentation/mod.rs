// Presentation layer - HTTP handlers, HTML page and SVG charts
pub mod app_state;
pub mod handlers;
pub mod html_page;
pub mod svg_chart;
