//! Keyword and regex slot extraction for inbound travel messages.
//!
//! Every rule runs independently over the whole text and the first match in
//! table order wins. Nothing here fails: a rule that finds nothing leaves its
//! slot absent or zero.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::models::{Intent, Service, Slots};

static ISO_DATE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{4}[/-][0-9]{1,2}[/-][0-9]{1,2}\b").unwrap());

static DAY_MONTH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b[0-9]{1,2}[/-][0-9]{1,2}(?:[/-][0-9]{2,4})?\b").unwrap()
});

static ADULTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:adults?|بالغين|بالغ|كبار|راشدين)").unwrap()
});

static CHILDREN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:children|child|kids?|أطفال|اطفال|طفل)").unwrap()
});

static INFANTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([0-9]+)\s*(?:infants?|babies|baby|رضع|رضيع)").unwrap()
});

static BARE_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([0-9]{1,2})\b").unwrap());

static NAME_INTRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:اسمي|أنا|my name is|mr\.|ms\.)\s*([A-Za-z\x{0600}-\x{06FF} ]{2,40})")
        .unwrap()
});

static NAME_TRAILER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:^|\s+)(?:اريد|أريد|ابغى|أبغى|طلب|حجز).*$").unwrap());

/// Keyword vocabularies and the destination gazetteer. Order matters: the
/// first entry that matches wins.
#[derive(Debug, Clone)]
pub struct ExtractorTables {
    pub booking_flight: Vec<String>,
    pub flight: Vec<String>,
    pub hotel: Vec<String>,
    pub visa: Vec<String>,
    pub gazetteer: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_lowercase()).collect()
}

impl Default for ExtractorTables {
    fn default() -> Self {
        Self {
            booking_flight: words(&[
                "حجز طيران",
                "حجز رحلة",
                "حجز تذكرة",
                "حجز تذاكر",
                "book a flight",
                "book flight",
                "booking a flight",
                "flight booking",
            ]),
            flight: words(&[
                "طيران", "تذكرة", "تذاكر", "رحلة", "طائرة", "flight", "ticket", "airline", "trip",
                "fly",
            ]),
            hotel: words(&["فندق", "فنادق", "غرفة", "hotel", "room", "accommodation"]),
            visa: words(&["تأشيرة", "تاشيرة", "فيزا", "visa"]),
            gazetteer: words(&[
                "القاهرة",
                "مصر",
                "السعودية",
                "الرياض",
                "جدة",
                "عمّان",
                "الأردن",
                "دبي",
                "الدوحة",
                "أمريكا",
                "الولايات المتحدة",
                "عدن",
                "cairo",
                "egypt",
                "riyadh",
                "jeddah",
                "amman",
                "dubai",
                "doha",
                "aden",
            ]),
        }
    }
}

pub struct SlotExtractor {
    tables: ExtractorTables,
    normalize_dates: bool,
}

impl Default for SlotExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl SlotExtractor {
    pub fn new() -> Self {
        Self::with_tables(ExtractorTables::default())
    }

    pub fn with_tables(tables: ExtractorTables) -> Self {
        let tables = ExtractorTables {
            booking_flight: lowercase_all(tables.booking_flight),
            flight: lowercase_all(tables.flight),
            hotel: lowercase_all(tables.hotel),
            visa: lowercase_all(tables.visa),
            gazetteer: tables.gazetteer,
        };
        Self {
            tables,
            normalize_dates: false,
        }
    }

    /// Rewrite recognised dates as `YYYY-MM-DD` instead of keeping the raw token.
    pub fn with_date_normalization(mut self, enabled: bool) -> Self {
        self.normalize_dates = enabled;
        self
    }

    pub fn extract(&self, text: &str) -> Slots {
        let lower = text.to_lowercase();
        let (intent, service) = self.classify(&lower);

        let mut slots = Slots {
            intent,
            service,
            destination: self.destination(&lower),
            date: self.date(text),
            adults: first_count(&ADULTS, text),
            children: first_count(&CHILDREN, text),
            infants: first_count(&INFANTS, text),
        };

        // Legacy heuristic: with no count phrase at all, any short number is
        // taken as the adult count. Dates like 20/12 are misread as 20 adults.
        if slots.adults == 0 && slots.children == 0 && slots.infants == 0 {
            slots.adults = first_count(&BARE_NUMBER, text);
        }

        slots
    }

    fn classify(&self, lower: &str) -> (Intent, Option<Service>) {
        if contains_any(lower, &self.tables.booking_flight) || contains_any(lower, &self.tables.flight) {
            (Intent::Booking, Some(Service::Flight))
        } else if contains_any(lower, &self.tables.hotel) {
            (Intent::Hotel, Some(Service::Hotel))
        } else if contains_any(lower, &self.tables.visa) {
            (Intent::Visa, Some(Service::Visa))
        } else {
            (Intent::Inquiry, None)
        }
    }

    fn destination(&self, lower: &str) -> Option<String> {
        self.tables
            .gazetteer
            .iter()
            .find(|place| lower.contains(place.to_lowercase().as_str()))
            .cloned()
    }

    fn date(&self, text: &str) -> Option<String> {
        let token = ISO_DATE
            .find(text)
            .or_else(|| DAY_MONTH_DATE.find(text))?
            .as_str();

        if self.normalize_dates {
            Some(normalize_date(token))
        } else {
            Some(token.to_string())
        }
    }
}

fn lowercase_all(list: Vec<String>) -> Vec<String> {
    list.into_iter().map(|w| w.to_lowercase()).collect()
}

fn contains_any(haystack: &str, needles: &[String]) -> bool {
    needles.iter().any(|n| !n.is_empty() && haystack.contains(n.as_str()))
}

fn first_count(re: &Regex, text: &str) -> u32 {
    re.captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Tries the candidate formats that fit the token's shape and returns the date
/// as `YYYY-MM-DD`. Tokens that fit none (including day/month without a year)
/// come back unchanged.
pub fn normalize_date(token: &str) -> String {
    let parts: Vec<&str> = token.split(['/', '-']).collect();
    if parts.len() != 3 {
        return token.to_string();
    }

    let formats: &[&str] = if parts[0].len() == 4 {
        &["%Y-%m-%d", "%Y/%m/%d"]
    } else if parts[2].len() == 4 {
        &["%d/%m/%Y", "%d-%m-%Y"]
    } else {
        &["%d/%m/%y", "%d-%m-%y"]
    };

    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(token, fmt).ok())
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| token.to_string())
}

/// Picks a sender name out of a self-introduction such as "اسمي احمد" or
/// "My name is Sara", dropping a trailing request verb.
pub fn extract_name(text: &str) -> Option<String> {
    let caps = NAME_INTRO.captures(text)?;
    let candidate = caps.get(1)?.as_str().trim();
    let candidate = NAME_TRAILER.replace(candidate, "");
    let candidate = candidate.trim();

    if candidate.chars().count() < 2 {
        None
    } else {
        Some(candidate.to_string())
    }
}
