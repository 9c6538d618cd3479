pub mod auth;
pub mod catalog;
pub mod clients;
pub mod config;
pub mod db;
pub mod error;
pub mod matcher;
pub mod routes;
