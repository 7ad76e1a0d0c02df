//! One-time code generation.

use std::collections::VecDeque;
use std::sync::Mutex;

use shared::crypto::{generate_numeric_code, OTP_CODE_LENGTH};

/// Produces the numeric codes handed out by the OTP gate.
pub trait CodeGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Six independently drawn random digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomDigits;

impl CodeGenerator for RandomDigits {
    fn generate(&self) -> String {
        generate_numeric_code(OTP_CODE_LENGTH)
    }
}

/// Hands out a fixed sequence of codes, then falls back to random digits.
#[derive(Debug, Default)]
pub struct SequenceCodes {
    queue: Mutex<VecDeque<String>>,
}

impl SequenceCodes {
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queue: Mutex::new(codes.into_iter().map(Into::into).collect()),
        }
    }
}

impl CodeGenerator for SequenceCodes {
    fn generate(&self) -> String {
        let next = self
            .queue
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.unwrap_or_else(|| RandomDigits.generate())
    }
}
