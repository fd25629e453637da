use serde::{Deserialize, Serialize};

use super::{require_text, Amenity, Hostel, Record, RecordId, Relation, ValidationError};

/// A room inside a hostel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostelRoom {
    pub name: String,
    /// Owning hostel.
    #[serde(default)]
    pub hostel_id: Option<RecordId>,
    pub room_number: String,
    /// Capacity as recorded by staff.
    pub no_of_rooms: String,
    pub no_of_floor: String,
    /// Amenity installed in the room.
    #[serde(default)]
    pub amenity_id: Option<RecordId>,
    pub rent: i64,
}

impl Record for HostelRoom {
    const MODEL: &'static str = "hms.hostel_rooms";
    const RELATIONS: &'static [Relation] = &[
        Relation::set_null("hostel_id", Hostel::MODEL),
        Relation::set_null("amenity_id", Amenity::MODEL),
    ];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "hostel_id" => self.hostel_id,
            "amenity_id" => self.amenity_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        match field {
            "hostel_id" => self.hostel_id = None,
            "amenity_id" => self.amenity_id = None,
            _ => {}
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require_text(Self::MODEL, "name", &self.name)?;
        require_text(Self::MODEL, "room_number", &self.room_number)?;
        require_text(Self::MODEL, "no_of_rooms", &self.no_of_rooms)?;
        require_text(Self::MODEL, "no_of_floor", &self.no_of_floor)
    }
}
