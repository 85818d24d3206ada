use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FilingStatus {
    Single,
    MarriedFilingJointly,
    MarriedFilingSeparately,
    HeadOfHousehold,
}

impl FilingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Single => "S",
            Self::MarriedFilingJointly => "MFJ",
            Self::MarriedFilingSeparately => "MFS",
            Self::HeadOfHousehold => "HOH",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "S" => Some(Self::Single),
            "MFJ" => Some(Self::MarriedFilingJointly),
            "MFS" => Some(Self::MarriedFilingSeparately),
            "HOH" => Some(Self::HeadOfHousehold),
            _ => None,
        }
    }

    /// All supported statuses, in schedule order.
    pub const ALL: [FilingStatus; 4] = [
        Self::Single,
        Self::MarriedFilingJointly,
        Self::MarriedFilingSeparately,
        Self::HeadOfHousehold,
    ];
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_round_trips_every_status() {
        for status in FilingStatus::ALL {
            assert_eq!(FilingStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn parse_rejects_unknown_code() {
        assert_eq!(FilingStatus::parse("QSS"), None);
        assert_eq!(FilingStatus::parse(""), None);
    }
}
