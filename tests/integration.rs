#[path = "integration/mod.rs"]
mod integration;
