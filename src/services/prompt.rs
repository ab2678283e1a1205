use crate::models::{Intent, Service, Slots};

pub const SERVICE_MENU: &str =
    "أهلاً بك! اختر نوع الخدمة:\n1. حجز طيران ✈️\n2. حجز فندق 🏨\n3. تأشيرة 🛂\n4. أخرى";
pub const ASK_DESTINATION: &str = "إلى أي وجهة تريد السفر؟";
pub const ASK_DATE: &str = "ما هو تاريخ السفر المطلوب؟ (مثال: 25/12)";
pub const ASK_ADULTS: &str = "كم عدد المسافرين البالغين؟";
pub const REQUEST_RECORDED: &str = "تم تسجيل طلبك ✅ سيتواصل معك أحد موظفينا قريباً.";
pub const FORWARDED_TO_STAFF: &str = "تم تحويل طلبك إلى الموظف المختص وسيتم الرد عليك قريباً.";

/// The next question to put to the sender, decided from slot completeness alone.
pub fn next_prompt(slots: &Slots) -> &'static str {
    if slots.intent == Intent::Inquiry {
        return SERVICE_MENU;
    }

    match slots.service {
        Some(Service::Flight) => {
            if slots.destination.is_none() {
                ASK_DESTINATION
            } else if slots.date.is_none() {
                ASK_DATE
            } else if slots.adults == 0 {
                ASK_ADULTS
            } else {
                REQUEST_RECORDED
            }
        }
        _ => FORWARDED_TO_STAFF,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flight(destination: Option<&str>, date: Option<&str>, adults: u32) -> Slots {
        Slots {
            intent: Intent::Booking,
            service: Some(Service::Flight),
            destination: destination.map(str::to_string),
            date: date.map(str::to_string),
            adults,
            ..Slots::default()
        }
    }

    #[test]
    fn test_inquiry_gets_service_menu() {
        assert_eq!(next_prompt(&Slots::default()), SERVICE_MENU);
    }

    #[test]
    fn test_flight_asks_for_missing_slots_in_order() {
        assert_eq!(next_prompt(&flight(None, None, 0)), ASK_DESTINATION);
        assert_eq!(next_prompt(&flight(None, Some("20/12"), 2)), ASK_DESTINATION);
        assert_eq!(next_prompt(&flight(Some("جدة"), None, 0)), ASK_DATE);
        assert_eq!(next_prompt(&flight(Some("جدة"), Some("2025-12-30"), 0)), ASK_ADULTS);
        assert_eq!(next_prompt(&flight(Some("جدة"), Some("2025-12-30"), 2)), REQUEST_RECORDED);
    }

    #[test]
    fn test_other_services_are_handed_off() {
        let hotel = Slots {
            intent: Intent::Hotel,
            service: Some(Service::Hotel),
            ..Slots::default()
        };
        let visa = Slots {
            intent: Intent::Visa,
            service: Some(Service::Visa),
            ..Slots::default()
        };
        assert_eq!(next_prompt(&hotel), FORWARDED_TO_STAFF);
        assert_eq!(next_prompt(&visa), FORWARDED_TO_STAFF);
    }

    #[test]
    fn test_prompt_is_deterministic() {
        let slots = flight(Some("جدة"), None, 1);
        assert_eq!(next_prompt(&slots), next_prompt(&slots.clone()));
    }
}
