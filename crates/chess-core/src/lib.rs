pub mod canonical;
pub mod eco;
pub mod opening_match;
pub mod position;
