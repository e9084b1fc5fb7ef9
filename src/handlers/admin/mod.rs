pub mod bonus_handler;
pub mod recalculation_handler;
pub mod result_handler;
pub mod rule_handler;
