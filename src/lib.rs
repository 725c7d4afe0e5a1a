#![doc = "The `todo_list_api` library crate."]
#![doc = ""]
#![doc = "Token issuing and validation, the authentication gates, the user and todo"]
#![doc = "services with their repositories, routing and error handling. The binary"]
#![doc = "(`main.rs`) only reads configuration and starts the server."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod routes;
pub mod services;
pub mod startup;
