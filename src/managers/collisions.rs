//! Valid-name collision detection
//!
//! Sanitisation is not injective: `My Name` and `My-Name` can both end up
//! close to `My_Name`, and two classes from different packages share a
//! display name. Generators register every identifier they emit here and
//! either reject or suffix the ones that clash.

use crate::engine::name::ResolvedName;
use crate::{Error, Result};
use parking_lot::Mutex;
use std::collections::HashMap;

/// Session-wide map from emitted identifier to the raw name that produced it
#[derive(Debug, Default)]
pub struct CollisionTracker {
    claimed: Mutex<HashMap<String, String>>,
}

impl CollisionTracker {
    /// Create an empty tracker
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim `valid` for `raw`.
    ///
    /// Registering the same pair twice is fine. A different raw name
    /// claiming an identifier that is already taken is a collision.
    pub fn register(&self, raw: &str, valid: &str) -> Result<()> {
        let mut claimed = self.claimed.lock();

        match claimed.get(valid) {
            Some(existing) if existing != raw => {
                tracing::warn!(valid, existing = %existing, incoming = raw, "identifier collision");
                Err(Error::NameCollision {
                    valid: valid.to_string(),
                    existing: existing.clone(),
                    incoming: raw.to_string(),
                })
            }
            Some(_) => Ok(()),
            None => {
                claimed.insert(valid.to_string(), raw.to_string());
                Ok(())
            }
        }
    }

    /// Claim the raw and identifier forms of a resolved name
    pub fn register_name(&self, name: &ResolvedName) -> Result<()> {
        self.register(&name.raw_string(), &name.valid)
    }

    /// Claim `valid` for `raw`, or the first free `valid_N` (N = 1, 2, ...)
    /// if it is taken. Returns the identifier that was claimed.
    pub fn check_or_disambiguate(&self, raw: &str, valid: &str) -> String {
        let mut claimed = self.claimed.lock();

        let mut candidate = valid.to_string();
        let mut suffix = 0usize;

        loop {
            match claimed.get(&candidate) {
                Some(existing) if existing == raw => return candidate,
                Some(_) => {
                    suffix += 1;
                    candidate = format!("{valid}_{suffix}");
                }
                None => {
                    if suffix > 0 {
                        tracing::debug!(raw, valid, disambiguated = %candidate, "suffixed colliding identifier");
                    }
                    claimed.insert(candidate.clone(), raw.to_string());
                    return candidate;
                }
            }
        }
    }

    /// Raw name that claimed `valid`, if any
    pub fn owner(&self, valid: &str) -> Option<String> {
        self.claimed.lock().get(valid).cloned()
    }

    /// Number of claimed identifiers
    pub fn len(&self) -> usize {
        self.claimed.lock().len()
    }

    /// Whether nothing has been claimed
    pub fn is_empty(&self) -> bool {
        self.claimed.lock().is_empty()
    }

    /// Forget every claim
    pub fn clear(&self) {
        self.claimed.lock().clear();
    }
}
