pub mod analysis;
pub mod auth;
pub mod dashboard;
pub mod favorites;
pub mod health;
pub mod openings;
pub mod practice;
