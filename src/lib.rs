//! Habit stacks: named, ordered collections of habits plus a catalog of
//! predefined routine templates, served over HTTP.

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod routines;
pub mod stacks;
pub mod store;
