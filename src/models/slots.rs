use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    Booking,
    Hotel,
    Visa,
    Inquiry,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Booking => "booking",
            Intent::Hotel => "hotel",
            Intent::Visa => "visa",
            Intent::Inquiry => "inquiry",
        }
    }

    /// Parses an intent name as staff or filters spell it. `flight` and `book`
    /// are accepted as aliases for `booking`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "booking" | "book" | "flight" => Some(Intent::Booking),
            "hotel" => Some(Intent::Hotel),
            "visa" => Some(Intent::Visa),
            "inquiry" => Some(Intent::Inquiry),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Service {
    Flight,
    Hotel,
    Visa,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Flight => "flight",
            Service::Hotel => "hotel",
            Service::Visa => "visa",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "flight" => Some(Service::Flight),
            "hotel" => Some(Service::Hotel),
            "visa" => Some(Service::Visa),
            _ => None,
        }
    }
}

/// Structured fields pulled out of a free-text message.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slots {
    pub intent: Intent,
    pub service: Option<Service>,
    pub destination: Option<String>,
    pub date: Option<String>,
    pub adults: u32,
    pub children: u32,
    pub infants: u32,
}

impl Default for Slots {
    fn default() -> Self {
        Self {
            intent: Intent::Inquiry,
            service: None,
            destination: None,
            date: None,
            adults: 0,
            children: 0,
            infants: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_aliases() {
        assert_eq!(Intent::parse("booking"), Some(Intent::Booking));
        assert_eq!(Intent::parse("Flight"), Some(Intent::Booking));
        assert_eq!(Intent::parse(" visa "), Some(Intent::Visa));
        assert_eq!(Intent::parse("cruise"), None);
    }

    #[test]
    fn test_slots_serialize_absent_fields_as_null() {
        let json = serde_json::to_value(Slots::default()).unwrap();
        assert_eq!(json["intent"], "inquiry");
        assert!(json["service"].is_null());
        assert!(json["destination"].is_null());
        assert_eq!(json["adults"], 0);
    }
}
