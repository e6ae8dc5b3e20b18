pub mod category_match;
pub mod priority_orderer;
pub mod sort_key;
