//! Domain layer for SkillHive.
//!
//! This crate contains:
//! - Domain models (Account, Demand, Resource, spreadsheet handles)
//! - The OTP auth gate and the header-mapping ingestion engine
//! - Store, notifier and clock abstractions with in-memory implementations
//! - Domain error types

pub mod errors;
pub mod models;
pub mod services;
