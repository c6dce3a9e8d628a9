// src/measure.rs

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// The closed set of measures a caller may ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Measure {
    ViolentCrimeRate,
    Unemployment,
    ChildrenInPoverty,
    DiabeticScreening,
    MammographyScreening,
    PreventableHospitalStays,
    Uninsured,
    SexuallyTransmittedInfections,
    PhysicalInactivity,
    AdultObesity,
    PrematureDeath,
    DailyFineParticulateMatter,
}

impl Measure {
    pub const ALL: [Measure; 12] = [
        Measure::ViolentCrimeRate,
        Measure::Unemployment,
        Measure::ChildrenInPoverty,
        Measure::DiabeticScreening,
        Measure::MammographyScreening,
        Measure::PreventableHospitalStays,
        Measure::Uninsured,
        Measure::SexuallyTransmittedInfections,
        Measure::PhysicalInactivity,
        Measure::AdultObesity,
        Measure::PrematureDeath,
        Measure::DailyFineParticulateMatter,
    ];

    /// Name exactly as it appears in the `Measure_name` column.
    pub fn as_str(self) -> &'static str {
        match self {
            Measure::ViolentCrimeRate => "Violent crime rate",
            Measure::Unemployment => "Unemployment",
            Measure::ChildrenInPoverty => "Children in poverty",
            Measure::DiabeticScreening => "Diabetic screening",
            Measure::MammographyScreening => "Mammography screening",
            Measure::PreventableHospitalStays => "Preventable hospital stays",
            Measure::Uninsured => "Uninsured",
            Measure::SexuallyTransmittedInfections => "Sexually transmitted infections",
            Measure::PhysicalInactivity => "Physical inactivity",
            Measure::AdultObesity => "Adult obesity",
            Measure::PrematureDeath => "Premature Death",
            Measure::DailyFineParticulateMatter => "Daily fine particulate matter",
        }
    }
}

impl fmt::Display for Measure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Measure> for &'static str {
    fn from(m: Measure) -> Self {
        m.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown measure `{0}`")]
pub struct UnknownMeasure(pub String);

impl FromStr for Measure {
    type Err = UnknownMeasure;

    /// Exact, case-sensitive match against the vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Measure::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| UnknownMeasure(s.to_string()))
    }
}

impl TryFrom<String> for Measure {
    type Error = UnknownMeasure;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

static ZIP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{5}$").expect("valid zip regex"));

/// A five-digit postal code. Leading zeros are significant, so it stays text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ZipCode(String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("zip code must be 5 digits, got `{0}`")]
pub struct InvalidZip(pub String);

impl ZipCode {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for ZipCode {
    type Err = InvalidZip;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if ZIP_RE.is_match(s) {
            Ok(Self(s.to_string()))
        } else {
            Err(InvalidZip(s.to_string()))
        }
    }
}

impl fmt::Display for ZipCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn vocabulary_has_twelve_distinct_names() {
        let names: HashSet<&str> = Measure::ALL.iter().map(|m| m.as_str()).collect();
        assert_eq!(names.len(), 12);
        for m in Measure::ALL {
            assert_eq!(m.as_str().parse::<Measure>(), Ok(m));
        }
    }

    #[test]
    fn measure_match_is_exact() {
        assert_eq!("Adult obesity".parse(), Ok(Measure::AdultObesity));
        assert_eq!("Premature Death".parse(), Ok(Measure::PrematureDeath));
        assert!("adult obesity".parse::<Measure>().is_err());
        assert!("Premature death".parse::<Measure>().is_err());
        assert!(" Uninsured".parse::<Measure>().is_err());
        assert!("Nonexistent measure".parse::<Measure>().is_err());
    }

    #[test]
    fn measure_serde_uses_display_names() {
        let m: Measure = serde_json::from_str(r#""Children in poverty""#).unwrap();
        assert_eq!(m, Measure::ChildrenInPoverty);
        assert_eq!(
            serde_json::to_string(&Measure::Uninsured).unwrap(),
            r#""Uninsured""#
        );
        assert!(serde_json::from_str::<Measure>(r#""Obesity""#).is_err());
    }

    #[test]
    fn zip_needs_exactly_five_digits() {
        assert_eq!("02801".parse::<ZipCode>().unwrap().as_str(), "02801");
        for bad in ["", "1234", "123456", "1234a", " 10001", "10001\n", "１２３４５"] {
            assert!(bad.parse::<ZipCode>().is_err(), "accepted {bad:?}");
        }
    }
}
