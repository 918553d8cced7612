pub mod filter;
pub mod flat_map;
pub mod map;
pub mod take;
