pub mod accounts;
pub mod favorites;
pub mod openings;
pub mod pool;
pub mod practice;
pub mod visits;
