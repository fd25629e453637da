use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{
    default_true, require, HostelRoom, Record, RecordId, Relation, Stateful, TransitionContext,
    TransitionError, ValidationError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CleanType {
    Monthly,
    Weekly,
    Daily,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InspectorRole {
    Administrator,
    Warden,
    Secretary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomCondition {
    Excellent,
    Good,
    Poor,
}

/// `Approved` is a valid stored value but no helper moves a record into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousekeepingStatus {
    #[default]
    Draft,
    Verified,
    Approved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HousekeepingAction {
    SetToDraft,
    SetToVerified,
    SetToCancelled,
}

/// Cleaning inspection of a single room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HousekeepingRecord {
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub room_id: Option<RecordId>,
    #[serde(default)]
    pub inspect_date: Option<NaiveDateTime>,
    #[serde(default)]
    pub clean_type: Option<CleanType>,
    #[serde(default)]
    pub inspector: Option<InspectorRole>,
    #[serde(default)]
    pub condition: Option<RoomCondition>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub state: HousekeepingStatus,
}

impl HousekeepingRecord {
    pub fn set_to_draft(&mut self) {
        self.state = HousekeepingStatus::Draft;
    }

    pub fn set_to_verified(&mut self) {
        self.state = HousekeepingStatus::Verified;
    }

    pub fn set_to_cancelled(&mut self) {
        self.state = HousekeepingStatus::Cancelled;
    }
}

impl Record for HousekeepingRecord {
    const MODEL: &'static str = "hms.housekeeping";
    const RELATIONS: &'static [Relation] = &[Relation::restrict("room_id", HostelRoom::MODEL)];

    fn reference(&self, field: &str) -> Option<RecordId> {
        match field {
            "room_id" => self.room_id,
            _ => None,
        }
    }

    fn clear_reference(&mut self, field: &str) {
        if field == "room_id" {
            self.room_id = None;
        }
    }

    fn reset_readonly(&mut self) {
        self.state = HousekeepingStatus::default();
    }

    fn keep_readonly(&mut self, stored: &Self) {
        self.state = stored.state;
    }

    fn validate(&self) -> Result<(), ValidationError> {
        require(Self::MODEL, "date", &self.date)?;
        require(Self::MODEL, "room_id", &self.room_id)?;
        require(Self::MODEL, "inspect_date", &self.inspect_date)
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn active_flag(&mut self) -> Option<&mut bool> {
        Some(&mut self.active)
    }
}

impl Stateful for HousekeepingRecord {
    type Status = HousekeepingStatus;
    type Action = HousekeepingAction;

    fn status(&self) -> HousekeepingStatus {
        self.state
    }

    fn apply(
        &mut self,
        action: HousekeepingAction,
        _ctx: &TransitionContext<'_>,
    ) -> Result<(), TransitionError> {
        match action {
            HousekeepingAction::SetToDraft => self.set_to_draft(),
            HousekeepingAction::SetToVerified => self.set_to_verified(),
            HousekeepingAction::SetToCancelled => self.set_to_cancelled(),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::InMemorySequence;

    fn inspection() -> HousekeepingRecord {
        serde_json::from_str(
            r#"{"date":"2021-08-06T09:00:00","room_id":4,"inspect_date":"2021-08-06T11:30:00"}"#,
        )
        .expect("deserializes")
    }

    #[test]
    fn approve_is_not_an_action() {
        let parsed = serde_json::from_value::<HousekeepingAction>(serde_json::json!(
            "set_to_approved"
        ));
        assert!(parsed.is_err());
    }

    #[test]
    fn room_and_dates_are_required() {
        let record: HousekeepingRecord = serde_json::from_str(
            r#"{"date":"2021-08-06T09:00:00","inspect_date":"2021-08-06T11:30:00","clean_type":"weekly"}"#,
        )
        .expect("deserializes");
        assert!(record.inspector.is_none());
        match record.validate() {
            Err(ValidationError::MissingField { field, .. }) => assert_eq!(field, "room_id"),
            other => panic!("expected missing room_id, got {other:?}"),
        }
    }

    #[test]
    fn every_action_lands_on_its_status() {
        let sequences = InMemorySequence::default();
        let ctx = TransitionContext {
            sequences: &sequences,
        };
        let mut record = inspection();
        record.state = HousekeepingStatus::Approved;
        let cases = [
            (HousekeepingAction::SetToDraft, HousekeepingStatus::Draft),
            (HousekeepingAction::SetToCancelled, HousekeepingStatus::Cancelled),
            (HousekeepingAction::SetToVerified, HousekeepingStatus::Verified),
            (HousekeepingAction::SetToCancelled, HousekeepingStatus::Cancelled),
            (HousekeepingAction::SetToCancelled, HousekeepingStatus::Cancelled),
            (HousekeepingAction::SetToDraft, HousekeepingStatus::Draft),
        ];
        for (action, expected) in cases {
            record.apply(action, &ctx).expect("setter never fails");
            assert_eq!(record.status(), expected);
        }
    }

    #[test]
    fn room_reference_blocks_room_deletion() {
        let record = inspection();
        assert_eq!(record.reference("room_id"), Some(RecordId(4)));
        assert_eq!(
            HousekeepingRecord::RELATIONS,
            &[Relation::restrict("room_id", "hms.hostel_rooms")]
        );
    }
}
