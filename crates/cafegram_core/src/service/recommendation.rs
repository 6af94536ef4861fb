//! One-shot café recommendation reminders.
//!
//! # Responsibility
//! - Build reminder content for a randomly picked café.
//! - Resolve reminder actions into hand-off data (e.g. a `tel://` URL).
//!
//! # Invariants
//! - Core never delivers reminders itself; a [`ReminderScheduler`] does.
//! - An empty catalog never reaches the scheduler.

use crate::model::cafe::{CafeId, CafeRecord};
use crate::repo::cafe_repo::CafeRepository;
use crate::service::catalog::{CafeCatalog, CatalogError};
use log::{info, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

pub const REMINDER_ID: &str = "cafegram.cafeSuggestion";
pub const REMINDER_CATEGORY: &str = "cafegram.cafeAction";
pub const RESERVE_ACTION_ID: &str = "cafegram.makeReservation";
pub const CANCEL_ACTION_ID: &str = "cafegram.cancel";
pub const DEFAULT_REMINDER_DELAY: Duration = Duration::from_secs(10);

static PHONE_SEPARATORS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s\-().]+").expect("valid phone separator regex"));

/// User actions attached to a recommendation reminder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderAction {
    /// "Reserve a table": call the café.
    Reserve,
    /// "Later": dismiss.
    Cancel,
}

impl ReminderAction {
    pub fn from_identifier(identifier: &str) -> Option<Self> {
        match identifier {
            RESERVE_ACTION_ID => Some(Self::Reserve),
            CANCEL_ACTION_ID => Some(Self::Cancel),
            _ => None,
        }
    }

    pub fn identifier(self) -> &'static str {
        match self {
            Self::Reserve => RESERVE_ACTION_ID,
            Self::Cancel => CANCEL_ACTION_ID,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Reserve => "Reserve a table",
            Self::Cancel => "Later",
        }
    }

    /// Whether the action brings the app to the foreground.
    pub fn opens_app(self) -> bool {
        matches!(self, Self::Reserve)
    }

    /// Telephony hand-off URL for this action, if any.
    ///
    /// Only `Reserve` with a non-blank phone produces a URL.
    pub fn call_url(self, phone: Option<&str>) -> Option<String> {
        if self != Self::Reserve {
            return None;
        }
        let digits = PHONE_SEPARATORS_RE.replace_all(phone?.trim(), "");
        if digits.is_empty() {
            return None;
        }
        Some(format!("tel://{digits}"))
    }
}

/// Reminder request handed to the external scheduler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recommendation {
    pub identifier: &'static str,
    pub category: &'static str,
    pub title: String,
    pub subtitle: String,
    pub body: String,
    /// Phone carried with the reminder for the reserve action.
    pub phone: Option<String>,
    /// Opaque image bytes to attach, when the café has one.
    pub attachment: Option<Vec<u8>>,
    pub actions: [ReminderAction; 2],
    /// Fire once after this delay; never repeats.
    pub delay: Duration,
    pub cafe_id: CafeId,
}

impl Recommendation {
    pub fn for_cafe(cafe: &CafeRecord, delay: Duration) -> Self {
        Self {
            identifier: REMINDER_ID,
            category: REMINDER_CATEGORY,
            title: "Cafe Recommendation".to_string(),
            subtitle: "Try a new cafe today".to_string(),
            body: format!(
                "I recommend you to check out {}. The cafe is one of my favorites. It's located at {}. Would you like to give it a try?",
                cafe.name, cafe.location
            ),
            phone: cafe.phone.clone(),
            attachment: cafe.image.clone(),
            actions: [ReminderAction::Reserve, ReminderAction::Cancel],
            delay,
            cafe_id: cafe.id,
        }
    }

    /// Resolves a user response to this reminder into a call URL.
    pub fn respond(&self, action_identifier: &str) -> Option<String> {
        ReminderAction::from_identifier(action_identifier)?.call_url(self.phone.as_deref())
    }
}

/// Share text used by the check-in share action.
pub fn check_in_message(cafe: &CafeRecord) -> String {
    format!("Just checking in at {}", cafe.name)
}

/// External collaborator that presents reminders to the user.
pub trait ReminderScheduler {
    fn schedule(&mut self, recommendation: &Recommendation) -> Result<(), String>;
}

#[derive(Debug)]
pub enum RecommendError {
    Catalog(CatalogError),
    Scheduler(String),
}

impl Display for RecommendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog(err) => write!(f, "{err}"),
            Self::Scheduler(message) => write!(f, "reminder scheduling failed: {message}"),
        }
    }
}

impl Error for RecommendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::Scheduler(_) => None,
        }
    }
}

impl From<CatalogError> for RecommendError {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value)
    }
}

/// Picks a random café and hands its reminder to `scheduler`.
pub fn recommend<R: CafeRepository, S: ReminderScheduler>(
    catalog: &mut CafeCatalog<R>,
    scheduler: &mut S,
    delay: Duration,
) -> Result<Recommendation, RecommendError> {
    let cafe = catalog.pick_random()?;
    let recommendation = Recommendation::for_cafe(&cafe, delay);

    if let Err(message) = scheduler.schedule(&recommendation) {
        warn!(
            "event=reminder_schedule module=recommendation status=error cafe_id={} error={}",
            cafe.id, message
        );
        return Err(RecommendError::Scheduler(message));
    }

    info!(
        "event=reminder_schedule module=recommendation status=ok cafe_id={} delay_ms={}",
        cafe.id,
        delay.as_millis()
    );
    Ok(recommendation)
}

#[cfg(test)]
mod tests {
    use super::{check_in_message, Recommendation, ReminderAction, DEFAULT_REMINDER_DELAY};
    use crate::model::cafe::{CafeRecord, NewCafe};

    fn cafe() -> CafeRecord {
        CafeRecord::from_new(NewCafe {
            location: "Hong Kong".to_string(),
            phone: Some("232-923423".to_string()),
            ..NewCafe::named("Cafe Deadend")
        })
        .unwrap()
    }

    #[test]
    fn body_mentions_name_and_location() {
        let reminder = Recommendation::for_cafe(&cafe(), DEFAULT_REMINDER_DELAY);
        assert!(reminder.body.contains("check out Cafe Deadend."));
        assert!(reminder.body.contains("located at Hong Kong."));
        assert_eq!(reminder.delay.as_secs(), 10);
    }

    #[test]
    fn reserve_action_builds_tel_url_without_separators() {
        let reminder = Recommendation::for_cafe(&cafe(), DEFAULT_REMINDER_DELAY);
        assert_eq!(
            reminder.respond("cafegram.makeReservation").as_deref(),
            Some("tel://232923423")
        );
        assert_eq!(reminder.respond("cafegram.cancel"), None);
        assert_eq!(reminder.respond("unknown"), None);
    }

    #[test]
    fn blank_phone_yields_no_url() {
        assert_eq!(ReminderAction::Reserve.call_url(Some(" - ")), None);
        assert_eq!(ReminderAction::Reserve.call_url(None), None);
    }

    #[test]
    fn share_text_uses_name() {
        assert_eq!(check_in_message(&cafe()), "Just checking in at Cafe Deadend");
    }
}
