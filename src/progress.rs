use crate::models::{Id, Photo, PhotoSession};
use serde::Serialize;
use std::collections::HashSet;

/// Photos are tied to a session only through the vehicle and the category.
/// Two open sessions of the same type on one vehicle share their photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionKey<'a> {
    pub vehicle_id: Id,
    pub category: &'a str,
}

impl<'a> SessionKey<'a> {
    pub fn of(session: &'a PhotoSession) -> Self {
        Self {
            vehicle_id: session.vehicle_id,
            category: session.session_type.as_str(),
        }
    }

    pub fn matches(&self, photo: &Photo) -> bool {
        photo.vehicle_id == self.vehicle_id && photo.category == self.category
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct SessionProgress {
    pub session_id: Id,
    pub percent: f64,
    pub complete: bool,
    pub captured: Vec<String>,
    pub missing: Vec<String>,
    pub required: Vec<String>,
}

pub fn matched_photos<'p>(session: &PhotoSession, photos: &'p [Photo]) -> Vec<&'p Photo> {
    let key = SessionKey::of(session);
    photos.iter().filter(|photo| key.matches(photo)).collect()
}

/// Distinct angles among the matched photos, first capture first.
pub fn captured_angles(session: &PhotoSession, photos: &[Photo]) -> Vec<String> {
    let mut seen = HashSet::new();
    matched_photos(session, photos)
        .into_iter()
        .filter_map(|photo| photo.angle.as_deref())
        .filter(|angle| seen.insert(*angle))
        .map(str::to_string)
        .collect()
}

pub fn progress(session: Option<&PhotoSession>, photos: &[Photo], required: &[String]) -> f64 {
    let Some(session) = session else {
        return 0.0;
    };
    if required.is_empty() {
        return 0.0;
    }

    let captured = angle_set(session, photos);
    let present = required
        .iter()
        .filter(|angle| captured.contains(angle.as_str()))
        .count();

    100.0 * present as f64 / required.len() as f64
}

pub fn is_complete(session: Option<&PhotoSession>, photos: &[Photo], required: &[String]) -> bool {
    progress(session, photos, required) >= 100.0
}

pub fn missing_angles(
    session: Option<&PhotoSession>,
    photos: &[Photo],
    required: &[String],
) -> Vec<String> {
    let Some(session) = session else {
        return required.to_vec();
    };
    if photos.is_empty() || required.is_empty() {
        return required.to_vec();
    }

    let captured = angle_set(session, photos);
    required
        .iter()
        .filter(|angle| !captured.contains(angle.as_str()))
        .cloned()
        .collect()
}

pub fn session_progress(
    session: &PhotoSession,
    photos: &[Photo],
    required: &[String],
) -> SessionProgress {
    let percent = progress(Some(session), photos, required);
    SessionProgress {
        session_id: session.id,
        percent,
        complete: percent >= 100.0,
        captured: captured_angles(session, photos),
        missing: missing_angles(Some(session), photos, required),
        required: required.to_vec(),
    }
}

fn angle_set<'p>(session: &PhotoSession, photos: &'p [Photo]) -> HashSet<&'p str> {
    matched_photos(session, photos)
        .into_iter()
        .filter_map(|photo| photo.angle.as_deref())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SessionType;

    fn session(vehicle_id: Id, session_type: SessionType) -> PhotoSession {
        PhotoSession {
            id: 1,
            session_name: "intake".into(),
            session_type,
            status: "active".into(),
            vehicle_id,
            customer_id: None,
            start_time: None,
            end_time: None,
            total_photos: 0,
        }
    }

    fn photo(id: Id, vehicle_id: Id, category: &str, angle: &str) -> Photo {
        Photo {
            id,
            vehicle_id,
            category: category.into(),
            angle: Some(angle.into()),
            ..Photo::default()
        }
    }

    fn angles(labels: &[&str]) -> Vec<String> {
        labels.iter().map(|label| label.to_string()).collect()
    }

    #[test]
    fn only_photos_matching_vehicle_and_category_count() {
        let session = session(7, SessionType::Damage);
        let photos = vec![
            photo(1, 7, "damage", "front"),
            photo(2, 7, "check-in", "rear"),
            photo(3, 8, "damage", "left"),
        ];
        let required = angles(&["front", "rear", "left"]);

        let percent = progress(Some(&session), &photos, &required);
        assert!((percent - 100.0 / 3.0).abs() < 1e-9);
        assert_eq!(
            missing_angles(Some(&session), &photos, &required),
            angles(&["rear", "left"])
        );
        assert!(!is_complete(Some(&session), &photos, &required));
    }

    #[test]
    fn empty_required_list_is_zero_progress() {
        let session = session(7, SessionType::CheckIn);
        let photos = vec![photo(1, 7, "check-in", "front")];
        assert_eq!(progress(Some(&session), &photos, &[]), 0.0);
        assert!(!is_complete(Some(&session), &photos, &[]));
        assert!(missing_angles(Some(&session), &photos, &[]).is_empty());
    }

    #[test]
    fn absent_session_or_photos_leaves_everything_missing() {
        let session = session(7, SessionType::CheckIn);
        let required = angles(&["front", "rear"]);
        assert_eq!(missing_angles(None, &[], &required), required);
        assert_eq!(missing_angles(Some(&session), &[], &required), required);
        assert_eq!(progress(None, &[photo(1, 7, "check-in", "front")], &required), 0.0);
    }

    #[test]
    fn progress_and_missing_share_add_up_to_one_hundred() {
        let session = session(3, SessionType::CheckOut);
        let required = angles(&["front", "rear", "left", "right", "interior", "odometer"]);
        let pool = [
            photo(1, 3, "check-out", "front"),
            photo(2, 3, "check-out", "front"),
            photo(3, 3, "check-out", "roof"),
            photo(4, 3, "check-out", "left"),
            photo(5, 3, "damage", "rear"),
            photo(6, 3, "check-out", "odometer"),
        ];

        for taken in 0..=pool.len() {
            let photos = &pool[..taken];
            let percent = progress(Some(&session), photos, &required);
            let missing = missing_angles(Some(&session), photos, &required);
            let missing_share = 100.0 * missing.len() as f64 / required.len() as f64;
            assert!((percent + missing_share - 100.0).abs() < 1e-9, "taken {taken}");
            assert_eq!(
                is_complete(Some(&session), photos, &required),
                missing.is_empty()
            );
        }
    }

    #[test]
    fn all_required_angles_captured_is_complete() {
        let session = session(2, SessionType::CheckIn);
        let photos = vec![
            photo(1, 2, "check-in", "rear"),
            photo(2, 2, "check-in", "front"),
        ];
        let required = angles(&["front", "rear"]);
        assert_eq!(progress(Some(&session), &photos, &required), 100.0);
        assert!(is_complete(Some(&session), &photos, &required));
        assert!(missing_angles(Some(&session), &photos, &required).is_empty());
    }

    #[test]
    fn angle_matching_is_case_sensitive() {
        let session = session(2, SessionType::CheckIn);
        let photos = vec![photo(1, 2, "check-in", "Front")];
        let required = angles(&["front"]);
        assert_eq!(progress(Some(&session), &photos, &required), 0.0);
        assert_eq!(missing_angles(Some(&session), &photos, &required), required);
    }

    #[test]
    fn missing_angles_keep_required_order() {
        let session = session(2, SessionType::Damage);
        let photos = vec![photo(1, 2, "damage", "b")];
        let required = angles(&["d", "b", "a", "c"]);
        assert_eq!(
            missing_angles(Some(&session), &photos, &required),
            angles(&["d", "a", "c"])
        );
    }

    #[test]
    fn captured_angles_are_distinct_in_capture_order() {
        let session = session(2, SessionType::Damage);
        let mut untagged = photo(4, 2, "damage", "");
        untagged.angle = None;
        let photos = vec![
            photo(1, 2, "damage", "rear"),
            photo(2, 2, "damage", "front"),
            photo(3, 2, "damage", "rear"),
            untagged,
        ];
        assert_eq!(captured_angles(&session, &photos), angles(&["rear", "front"]));

        let summary = session_progress(&session, &photos, &angles(&["front"]));
        assert!(summary.complete);
        assert_eq!(summary.session_id, 1);
    }
}
