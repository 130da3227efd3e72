pub mod bar;
pub mod chart;
pub mod plan;
pub mod valuation;
pub mod window;
