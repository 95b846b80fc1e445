// Storage key derivation
pub mod hasher;

// Backing key-value store
pub mod kv;

// Identity → secret mapping
pub mod identity;

// Credential checks
pub mod auth;

// Per-user settings blobs
pub mod settings;

// OAuth code exchange
pub mod oauth;

// HTTP API
pub mod api;

// Service configuration
pub mod config;
