// Player skill grades and their numeric scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RatingError {
    #[error("unknown rating grade: {0:?}")]
    UnknownGrade(String),
}

/// Ordinal skill grade, best (`A+`) to worst (`D-`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rating {
    APlus,
    A,
    AMinus,
    BPlus,
    B,
    BMinus,
    CPlus,
    C,
    CMinus,
    DPlus,
    D,
    DMinus,
}

impl Rating {
    /// Every grade, best first.
    pub const ALL: [Rating; 12] = [
        Rating::APlus,
        Rating::A,
        Rating::AMinus,
        Rating::BPlus,
        Rating::B,
        Rating::BMinus,
        Rating::CPlus,
        Rating::C,
        Rating::CMinus,
        Rating::DPlus,
        Rating::D,
        Rating::DMinus,
    ];

    /// Canonical wire string (`"A+"`, `"B"`, `"D-"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Rating::APlus => "A+",
            Rating::A => "A",
            Rating::AMinus => "A-",
            Rating::BPlus => "B+",
            Rating::B => "B",
            Rating::BMinus => "B-",
            Rating::CPlus => "C+",
            Rating::C => "C",
            Rating::CMinus => "C-",
            Rating::DPlus => "D+",
            Rating::D => "D",
            Rating::DMinus => "D-",
        }
    }

    /// The bare letter grade this rating belongs to, with any `+`/`-` dropped.
    pub fn letter(&self) -> Rating {
        match self {
            Rating::APlus | Rating::A | Rating::AMinus => Rating::A,
            Rating::BPlus | Rating::B | Rating::BMinus => Rating::B,
            Rating::CPlus | Rating::C | Rating::CMinus => Rating::C,
            Rating::DPlus | Rating::D | Rating::DMinus => Rating::D,
        }
    }
}

impl FromStr for Rating {
    type Err = RatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "A+" => Ok(Rating::APlus),
            "A" => Ok(Rating::A),
            "A-" => Ok(Rating::AMinus),
            "B+" => Ok(Rating::BPlus),
            "B" => Ok(Rating::B),
            "B-" => Ok(Rating::BMinus),
            "C+" => Ok(Rating::CPlus),
            "C" => Ok(Rating::C),
            "C-" => Ok(Rating::CMinus),
            "D+" => Ok(Rating::DPlus),
            "D" => Ok(Rating::D),
            "D-" => Ok(Rating::DMinus),
            _ => Err(RatingError::UnknownGrade(s.to_string())),
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Rating {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Which grade-to-score table a deployment uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScale {
    /// Twelve grades, A+ = 4.3 down to D- = 0.7.
    #[default]
    PlusMinus,
    /// Four letter grades, A = 4 down to D = 1. Modifiers collapse onto the letter.
    Letter,
}

impl RatingScale {
    /// Numeric score used for every average and variance computation.
    pub fn score(&self, rating: Rating) -> f64 {
        match self {
            RatingScale::PlusMinus => match rating {
                Rating::APlus => 4.3,
                Rating::A => 4.0,
                Rating::AMinus => 3.7,
                Rating::BPlus => 3.3,
                Rating::B => 3.0,
                Rating::BMinus => 2.7,
                Rating::CPlus => 2.3,
                Rating::C => 2.0,
                Rating::CMinus => 1.7,
                Rating::DPlus => 1.3,
                Rating::D => 1.0,
                Rating::DMinus => 0.7,
            },
            RatingScale::Letter => match rating.letter() {
                Rating::A => 4.0,
                Rating::B => 3.0,
                Rating::C => 2.0,
                _ => 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plus_minus_table_matches_published_scores() {
        let expected = [4.3, 4.0, 3.7, 3.3, 3.0, 2.7, 2.3, 2.0, 1.7, 1.3, 1.0, 0.7];
        for (rating, want) in Rating::ALL.iter().zip(expected) {
            let got = RatingScale::PlusMinus.score(*rating);
            assert!((got - want).abs() < f64::EPSILON, "{rating}: {got} != {want}");
        }
    }

    #[test]
    fn letter_scale_collapses_modifiers() {
        let scale = RatingScale::Letter;
        assert_eq!(scale.score(Rating::APlus), 4.0);
        assert_eq!(scale.score(Rating::AMinus), 4.0);
        assert_eq!(scale.score(Rating::B), 3.0);
        assert_eq!(scale.score(Rating::CPlus), 2.0);
        assert_eq!(scale.score(Rating::DMinus), 1.0);
    }

    #[test]
    fn parse_accepts_canonical_and_lowercase() {
        assert_eq!("A+".parse::<Rating>().unwrap(), Rating::APlus);
        assert_eq!(" b- ".parse::<Rating>().unwrap(), Rating::BMinus);
        assert_eq!("d".parse::<Rating>().unwrap(), Rating::D);
    }

    #[test]
    fn parse_rejects_unknown_grade() {
        let err = "E".parse::<Rating>().unwrap_err();
        assert_eq!(err, RatingError::UnknownGrade("E".into()));
        assert!("A++".parse::<Rating>().is_err());
        assert!("".parse::<Rating>().is_err());
    }

    #[test]
    fn display_matches_wire_string() {
        for rating in Rating::ALL {
            assert_eq!(rating.to_string().parse::<Rating>().unwrap(), rating);
        }
        assert_eq!(Rating::CMinus.to_string(), "C-");
    }

    #[test]
    fn serde_uses_grade_strings() {
        let json = serde_json::to_string(&Rating::BPlus).unwrap();
        assert_eq!(json, r#""B+""#);
        let back: Rating = serde_json::from_str(r#""D-""#).unwrap();
        assert_eq!(back, Rating::DMinus);
        assert!(serde_json::from_str::<Rating>(r#""Z""#).is_err());
    }

    #[test]
    fn scale_deserializes_from_snake_case() {
        #[derive(Deserialize)]
        struct Wrapper {
            scale: RatingScale,
        }
        let w: Wrapper = toml::from_str("scale = \"letter\"").unwrap();
        assert_eq!(w.scale, RatingScale::Letter);
        let w: Wrapper = toml::from_str("scale = \"plus_minus\"").unwrap();
        assert_eq!(w.scale, RatingScale::PlusMinus);
    }
}
