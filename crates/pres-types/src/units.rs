//! Unit systems used when formatting values

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Unit system applied to formatted property values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitSystem {
    Metric,
    Imperial,
    UsCustomary,
    UsSurvey,
}

impl UnitSystem {
    /// Wire name of the unit system.
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitSystem::Metric => "metric",
            UnitSystem::Imperial => "imperial",
            UnitSystem::UsCustomary => "usCustomary",
            UnitSystem::UsSurvey => "usSurvey",
        }
    }
}

impl FromStr for UnitSystem {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "metric" => Ok(UnitSystem::Metric),
            "imperial" | "british-imperial" => Ok(UnitSystem::Imperial),
            "uscustomary" | "us-customary" => Ok(UnitSystem::UsCustomary),
            "ussurvey" | "us-survey" => Ok(UnitSystem::UsSurvey),
            _ => Err(Error::InvalidUnitSystem {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
