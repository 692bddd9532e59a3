//! Admin gate: one shared password, locked out after repeated failures.

use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::warn;

use crate::AdminError;

#[derive(Debug)]
pub struct AdminGate {
    password: Option<String>,
    max_attempts: u32,
    lockout: Duration,
    state: Mutex<GateState>,
}

#[derive(Debug, Default)]
struct GateState {
    failures: u32,
    locked_until: Option<Instant>,
}

impl AdminGate {
    pub fn new(password: Option<String>, max_attempts: u32, lockout: Duration) -> Self {
        Self { password: password.filter(|p| !p.is_empty()), max_attempts: max_attempts.max(1), lockout, state: Mutex::default() }
    }

    pub fn verify(&self, attempt: &str) -> Result<(), AdminError> { self.verify_at(attempt, Instant::now()) }

    pub fn verify_at(&self, attempt: &str, now: Instant) -> Result<(), AdminError> {
        let Some(password) = &self.password else { return Err(AdminError::Disabled) };
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(until) = state.locked_until {
            if now < until {
                let remaining = until - now;
                return Err(AdminError::LockedOut { retry_after_secs: remaining.as_secs() + u64::from(remaining.subsec_nanos() > 0) });
            }
            state.locked_until = None;
        }
        if attempt == password {
            state.failures = 0;
            return Ok(());
        }
        state.failures += 1;
        if state.failures >= self.max_attempts {
            warn!(attempts = state.failures, lockout_secs = self.lockout.as_secs(), "admin locked out");
            state.failures = 0;
            state.locked_until = Some(now + self.lockout);
        }
        Err(AdminError::InvalidPassword)
    }
}
