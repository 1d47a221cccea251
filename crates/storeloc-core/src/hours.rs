//! Weekly business hours as free-text strings per day.

use chrono::{Datelike, Weekday};
use serde::{Deserialize, Serialize};

const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub struct BusinessHours {
    pub monday: Option<String>,
    pub tuesday: Option<String>,
    pub wednesday: Option<String>,
    pub thursday: Option<String>,
    pub friday: Option<String>,
    pub saturday: Option<String>,
    pub sunday: Option<String>,
}

impl BusinessHours {
    #[must_use]
    pub fn get(&self, day: Weekday) -> Option<&str> {
        let slot = match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        };
        slot.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    /// Days with hours text, Monday first.
    pub fn days(&self) -> impl Iterator<Item = (Weekday, &str)> + '_ {
        WEEK.iter()
            .filter_map(move |&day| self.get(day).map(|text| (day, text)))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days().next().is_none()
    }

    /// Heuristic: a day counts as open when it has hours text that does not
    /// mention "closed". The text is not parsed as a time range, so a store
    /// listed as "9am-5pm" reports open at any time of that day.
    #[must_use]
    pub fn is_open_on(&self, day: Weekday) -> bool {
        self.get(day)
            .is_some_and(|text| !text.to_ascii_lowercase().contains("closed"))
    }

    /// [`Self::is_open_on`] applied to the local weekday.
    #[must_use]
    pub fn is_open_now(&self) -> bool {
        self.is_open_on(chrono::Local::now().weekday())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hours() -> BusinessHours {
        BusinessHours {
            monday: Some("9:00 AM - 5:00 PM".to_string()),
            tuesday: Some("Closed".to_string()),
            wednesday: Some("   ".to_string()),
            saturday: Some("closed for renovation".to_string()),
            sunday: Some("By appointment".to_string()),
            ..BusinessHours::default()
        }
    }

    #[test]
    fn open_when_text_present_without_closed() {
        assert!(hours().is_open_on(Weekday::Mon));
        assert!(hours().is_open_on(Weekday::Sun));
    }

    #[test]
    fn closed_text_is_case_insensitive() {
        assert!(!hours().is_open_on(Weekday::Tue));
        assert!(!hours().is_open_on(Weekday::Sat));
    }

    #[test]
    fn missing_or_blank_day_is_not_open() {
        assert!(!hours().is_open_on(Weekday::Wed));
        assert!(!hours().is_open_on(Weekday::Thu));
    }

    #[test]
    fn days_are_listed_monday_first_and_skip_blanks() {
        let h = hours();
        let days: Vec<Weekday> = h.days().map(|(d, _)| d).collect();
        assert_eq!(
            days,
            vec![Weekday::Mon, Weekday::Tue, Weekday::Sat, Weekday::Sun]
        );
    }

    #[test]
    fn default_hours_are_empty() {
        assert!(BusinessHours::default().is_empty());
        assert!(!hours().is_empty());
    }

    #[test]
    fn deserializes_partial_week() {
        let h: BusinessHours =
            serde_json::from_str(r#"{"friday": "10-6", "sunday": null}"#).unwrap();
        assert_eq!(h.get(Weekday::Fri), Some("10-6"));
        assert_eq!(h.get(Weekday::Sun), None);
    }
}
