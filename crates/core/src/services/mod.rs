pub mod series_service;
pub mod valuation_service;
