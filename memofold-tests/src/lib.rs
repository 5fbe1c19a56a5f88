pub mod expr;
pub mod recurrences;
