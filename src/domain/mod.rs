// Domain layer - Stations, range tables and the dashboard view model
pub mod dashboard;
pub mod palette;
pub mod range_table;
pub mod station;
