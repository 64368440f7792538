//! architect-service: relays architectural design prompts to a text/vision
//! model or an image generation model.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;
