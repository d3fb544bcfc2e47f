//! Ready-made listing predicates.
//!
//! The routing layer typically narrows listings to "public objects" or "what
//! the caller owns"; these constructors build those predicates for
//! [`crate::store::FileStore`] read models.

use crate::models::object::ObjectRecord;

/// Keep everything.
pub fn any() -> impl Fn(&ObjectRecord) -> bool {
    |_| true
}

/// Keep only publicly visible objects.
pub fn visible_only() -> impl Fn(&ObjectRecord) -> bool {
    |record| record.visible
}

/// Keep only objects owned by `owner`.
pub fn owned_by(owner: String) -> impl Fn(&ObjectRecord) -> bool {
    move |record| record.owner == owner
}

/// Keep objects that are visible or belong to `owner` — the view a logged-in
/// user gets of the shared history.
pub fn visible_or_owned_by(owner: String) -> impl Fn(&ObjectRecord) -> bool {
    move |record| record.visible || record.owner == owner
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(owner: &str, visible: bool) -> ObjectRecord {
        ObjectRecord {
            file_id: format!("20130101/{owner}/a.txt"),
            name: "a.txt".to_string(),
            size: 1,
            visible,
            owner: owner.to_string(),
            modified_at: Utc::now(),
        }
    }

    #[test]
    fn predicates_match_expected_records() {
        let mine_hidden = record("mike", false);
        let theirs_public = record("liza", true);
        let theirs_hidden = record("liza", false);

        assert!(any()(&theirs_hidden));
        assert!(visible_only()(&theirs_public));
        assert!(!visible_only()(&mine_hidden));
        assert!(owned_by("mike".into())(&mine_hidden));
        assert!(!owned_by("mike".into())(&theirs_public));

        let view = visible_or_owned_by("mike".into());
        assert!(view(&mine_hidden));
        assert!(view(&theirs_public));
        assert!(!view(&theirs_hidden));
    }
}
