use cafegram_core::{
    recommend, seeded_source, CafeCatalog, CatalogError, MemoryCafeRepository, NewCafe,
    RecommendError, Recommendation, ReminderAction, ReminderScheduler,
};
use std::time::Duration;

#[derive(Default)]
struct RecordingScheduler {
    scheduled: Vec<Recommendation>,
    fail_with: Option<String>,
}

impl ReminderScheduler for RecordingScheduler {
    fn schedule(&mut self, recommendation: &Recommendation) -> Result<(), String> {
        if let Some(message) = &self.fail_with {
            return Err(message.clone());
        }
        self.scheduled.push(recommendation.clone());
        Ok(())
    }
}

fn catalog_with(names: &[&str]) -> CafeCatalog<MemoryCafeRepository> {
    let mut catalog = CafeCatalog::load(MemoryCafeRepository::new())
        .unwrap()
        .with_random_source(seeded_source(11));
    for name in names {
        catalog
            .add(NewCafe {
                location: "Sydney".to_string(),
                phone: Some("(02) 9999-1234".to_string()),
                image: Some(vec![1, 2, 3]),
                ..NewCafe::named(*name)
            })
            .unwrap();
    }
    catalog
}

#[test]
fn recommend_hands_reminder_to_scheduler() {
    let mut catalog = catalog_with(&["Homei", "Teakha", "Petite Oyster"]);
    let mut scheduler = RecordingScheduler::default();

    let reminder = recommend(&mut catalog, &mut scheduler, Duration::from_secs(10)).unwrap();

    assert_eq!(scheduler.scheduled, vec![reminder.clone()]);
    let cafe = catalog.get(reminder.cafe_id).unwrap();
    assert!(reminder.body.contains(&cafe.name));
    assert_eq!(reminder.title, "Cafe Recommendation");
    assert_eq!(reminder.attachment.as_deref(), Some([1u8, 2, 3].as_slice()));
    assert_eq!(
        reminder.actions,
        [ReminderAction::Reserve, ReminderAction::Cancel]
    );
    assert_eq!(
        reminder.respond(ReminderAction::Reserve.identifier()).as_deref(),
        Some("tel://0299991234")
    );
}

#[test]
fn empty_catalog_never_reaches_scheduler() {
    let mut catalog = catalog_with(&[]);
    let mut scheduler = RecordingScheduler::default();

    let err = recommend(&mut catalog, &mut scheduler, Duration::from_secs(10)).unwrap_err();

    assert!(matches!(err, RecommendError::Catalog(CatalogError::EmptyCatalog)));
    assert!(scheduler.scheduled.is_empty());
}

#[test]
fn scheduler_failure_is_reported() {
    let mut catalog = catalog_with(&["Only"]);
    let mut scheduler = RecordingScheduler {
        fail_with: Some("permission denied".to_string()),
        ..RecordingScheduler::default()
    };

    let err = recommend(&mut catalog, &mut scheduler, Duration::ZERO).unwrap_err();

    assert!(matches!(&err, RecommendError::Scheduler(message) if message == "permission denied"));
    assert_eq!(err.to_string(), "reminder scheduling failed: permission denied");
    assert_eq!(catalog.len(), 1);
}
