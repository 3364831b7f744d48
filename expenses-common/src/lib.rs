#![cfg(not(doctest))]

#[macro_use]
extern crate diesel;

pub mod ai;
pub mod analytics;
pub mod categories;
pub mod db;
pub mod messages;
pub mod models;
pub mod money;
pub mod schema;
pub mod token;
