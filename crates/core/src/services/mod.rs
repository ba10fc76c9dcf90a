pub mod holdings_service;
pub mod quote_service;
pub mod search_service;
pub mod valuation_service;
