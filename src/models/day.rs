//! Day groupings returned by the tree and pagination read models.

use super::object::ObjectRecord;
use serde::{Deserialize, Serialize};

/// All objects of one date partition, with the date pre-split for rendering.
///
/// `year`/`month`/`day` come from fixed-offset slicing of the 8-digit date
/// string; no calendar or timezone computation is involved.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct DayListing {
    pub date: String,
    pub year: String,
    pub month: String,
    pub day: String,
    pub objects: Vec<ObjectRecord>,
}

impl DayListing {
    /// Group `objects` under a validated `YYYYMMDD` date.
    ///
    /// Callers must only pass dates that already passed 8-digit validation.
    pub fn new(date: String, objects: Vec<ObjectRecord>) -> Self {
        let year = date[0..4].to_string();
        let month = date[4..6].to_string();
        let day = date[6..8].to_string();
        Self {
            date,
            year,
            month,
            day,
            objects,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_date_by_offset() {
        let day = DayListing::new("20130104".to_string(), Vec::new());
        assert_eq!(day.year, "2013");
        assert_eq!(day.month, "01");
        assert_eq!(day.day, "04");
    }
}
