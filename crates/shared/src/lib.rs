//! Shared utilities and common types for the SkillHive backend.
//!
//! This crate provides common functionality used across all other crates:
//! - One-time code generation
//! - Session token issuing and validation (HS256 JWT)
//! - Email normalization and domain checks

pub mod crypto;
pub mod jwt;
pub mod validation;
