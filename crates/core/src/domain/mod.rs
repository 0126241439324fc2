pub mod contract;
pub mod criteria;
pub mod metrics;
pub mod recommendation;
pub mod score;
pub mod valuation;
