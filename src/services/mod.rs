//! Indicator pipeline and chart generation services

pub mod chart_service;
pub mod dataset_service;
pub mod heikin_ashi;
pub mod indicator_service;
pub mod series_math;
pub mod signal_service;
