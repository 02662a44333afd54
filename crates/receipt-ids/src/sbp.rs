//! SBP (Faster Payments System) transfer identifiers

use crate::counter::KeyedCounter;
use crate::{IdError, Result};
use chrono::{DateTime, Datelike, SubsecRound, TimeZone, Utc};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref SBP_ID_PATTERN: Regex = Regex::new(concat!(
        r"^(?P<prefix>[A-Z])(?P<year>\d)(?P<doy>\d{3})(?P<hh>\d{2})(?P<mm>\d{2})(?P<ss>\d{2})",
        r"(?P<node>\d{4})(?P<ltr>[A-Z])(?P<seq5>\d{5})(?P<code4>\d{4})(?P<tail7>\d{7})$"
    ))
    .unwrap();
}

/// Fixed parts of an SBP identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SbpParams {
    /// One upper-case letter
    pub prefix: String,
    /// Four-digit processing node
    pub node: String,
    /// One-letter route
    pub route: String,
    /// Four-digit code
    pub code4: String,
    /// Seven-digit tail
    pub tail7: String,
}

impl Default for SbpParams {
    fn default() -> Self {
        Self {
            prefix: "B".to_string(),
            node: "7310".to_string(),
            route: "K".to_string(),
            code4: "2001".to_string(),
            tail7: "1571101".to_string(),
        }
    }
}

/// Generator of 32-character SBP identifiers
///
/// Layout: prefix, last digit of the UTC year, day of year (3), UTC
/// `HHMMSS`, node (4), route (1), sequence (5), code (4), tail (7).
/// The sequence counts transfers sharing the same UTC second, node and
/// route.
#[derive(Debug, Clone, Default)]
pub struct SbpIdGenerator {
    params: SbpParams,
    counter: KeyedCounter<(DateTime<Utc>, String, String)>,
}

impl SbpIdGenerator {
    pub fn new(params: SbpParams) -> Self {
        Self {
            params,
            counter: KeyedCounter::new(),
        }
    }

    pub fn params(&self) -> &SbpParams {
        &self.params
    }

    /// Next identifier for a transfer made at `when`
    pub fn generate<Tz: TimeZone>(&mut self, when: &DateTime<Tz>) -> String {
        let utc = when.with_timezone(&Utc).trunc_subsecs(0);
        let p = &self.params;

        let seq = self
            .counter
            .next((utc, p.node.clone(), p.route.clone()));

        format!(
            "{prefix}{year}{doy:03}{hhmmss}{node}{route}{seq:05}{code4}{tail7}",
            prefix = p.prefix,
            year = utc.year().rem_euclid(10),
            doy = utc.ordinal(),
            hhmmss = utc.format("%H%M%S"),
            node = p.node,
            route = p.route,
            code4 = p.code4,
            tail7 = p.tail7,
        )
    }

    /// Forget all sequences
    pub fn reset(&mut self) {
        self.counter.reset();
    }
}

/// Check the shape of a 32-character SBP identifier
pub fn validate_sbp_id(id: &str) -> Result<()> {
    if SBP_ID_PATTERN.is_match(id) {
        Ok(())
    } else {
        Err(IdError::InvalidSbpId(id.to_string()))
    }
}
