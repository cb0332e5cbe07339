use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Which side of the wedding a guest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Party {
    Bride,
    Groom,
}

impl Party {
    pub fn as_str(self) -> &'static str {
        match self {
            Party::Bride => "BRIDE",
            Party::Groom => "GROOM",
        }
    }
}

impl fmt::Display for Party {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Party {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "BRIDE" => Ok(Party::Bride),
            "GROOM" => Ok(Party::Groom),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

/// A guestbook entry as shown to visitors.
///
/// The password hash lives only in the stored row and never reaches this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Talk {
    pub id: String,
    pub author: String,
    pub color: String,
    pub party: Party,
    pub msg: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
    pub published: bool,
}

/// Meal attendance answer. `idk` is what the RSVP page sends for "not sure yet".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsvpAnswer {
    #[serde(rename = "yes")]
    Yes,
    #[serde(rename = "no")]
    No,
    #[serde(rename = "idk", alias = "unsure")]
    Unsure,
}

impl RsvpAnswer {
    pub fn as_str(self) -> &'static str {
        match self {
            RsvpAnswer::Yes => "yes",
            RsvpAnswer::No => "no",
            RsvpAnswer::Unsure => "idk",
        }
    }
}

impl FromStr for RsvpAnswer {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "yes" => Ok(RsvpAnswer::Yes),
            "no" => Ok(RsvpAnswer::No),
            "idk" | "unsure" => Ok(RsvpAnswer::Unsure),
            other => Err(UnknownVariant(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rsvp {
    pub id: String,
    pub msg: RsvpAnswer,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownVariant(pub String);

impl fmt::Display for UnknownVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown variant '{}'", self.0)
    }
}

impl std::error::Error for UnknownVariant {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn talk_serializes_created_as_millis() {
        let talk = Talk {
            id: "1681527600000".into(),
            author: "Mina".into(),
            color: "#ECC8F7".into(),
            party: Party::Bride,
            msg: "Congratulations!".into(),
            created: DateTime::from_timestamp_millis(1_681_527_600_000).unwrap(),
            published: true,
        };

        let json = serde_json::to_value(&talk).unwrap();
        assert_eq!(json["created"], 1_681_527_600_000i64);
        assert_eq!(json["party"], "BRIDE");
    }

    #[test]
    fn rsvp_answer_accepts_unsure_alias() {
        let answer: RsvpAnswer = serde_json::from_str("\"unsure\"").unwrap();
        assert_eq!(answer, RsvpAnswer::Unsure);
        assert_eq!(serde_json::to_string(&answer).unwrap(), "\"idk\"");
        assert_eq!("idk".parse::<RsvpAnswer>().unwrap(), RsvpAnswer::Unsure);
        assert!("maybe".parse::<RsvpAnswer>().is_err());
    }
}
