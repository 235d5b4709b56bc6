pub mod app_config;
pub mod constants;
pub mod db;
pub mod email;
pub mod flash;
pub mod middleware;
pub mod orm;
pub mod session;
pub mod storage;
pub mod user;
pub mod web;
