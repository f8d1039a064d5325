/// Database configuration and connection management
pub mod database;

/// Compliance settings and roster seed data loaded from config.toml
pub mod settings;
