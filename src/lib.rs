//! Salesboard - Sales & Operations Dashboard
//!
//! Loads sales, product and inventory CSV files once and serves a web dashboard
//! with KPI cards, charts and live low stock alerts.

pub mod charts;
pub mod config;
pub mod dashboard;
pub mod data;
pub mod report;
pub mod stats;
pub mod web;
