use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

/// Payment state of a challan. A record is born `Unpaid` and may only move
/// to `Paid`; no reverse transition is exposed anywhere.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChallanStatus {
    Paid,
    #[default]
    Unpaid,
}

/// A traffic-violation ticket as stored in the remote document.
///
/// Field names are camelCase on the wire to match the JSON array the hosted
/// bin already holds. The `id` is assigned once at issuance and never
/// changes; legacy documents may carry non-UUID ids, so it stays a string.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Challan {
    pub id: String,
    pub name: String,
    pub plate_number: String,
    pub vehicle_type: String,
    pub violation: String,
    pub fine_amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub status: ChallanStatus,
}

impl Challan {
    /// Plate numbers are the primary lookup key and compare
    /// case-insensitively.
    pub fn matches_plate(&self, plate: &str) -> bool {
        self.plate_number.trim().eq_ignore_ascii_case(plate.trim())
    }
}

/// Issuance input: everything the officer provides. `id` and `status` are
/// assigned by the service, never taken from the caller.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChallanDraft {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub plate_number: String,
    #[serde(default)]
    pub vehicle_type: String,
    #[serde(default)]
    pub violation: String,
    #[serde(default)]
    pub fine_amount: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ChallanDraft {
    /// Presence checks for required fields. Error messages carry the wire
    /// field name so the frontend can surface them verbatim.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.plate_number.trim().is_empty() {
            return Err(ModelError::Validation("plateNumber is required".into()));
        }
        if self.name.trim().is_empty() {
            return Err(ModelError::Validation("name is required".into()));
        }
        if self.vehicle_type.trim().is_empty() {
            return Err(ModelError::Validation("vehicleType is required".into()));
        }
        if self.violation.trim().is_empty() {
            return Err(ModelError::Validation("violation is required".into()));
        }
        if !(self.fine_amount > 0.0) {
            return Err(ModelError::Validation("fineAmount must be positive".into()));
        }
        Ok(())
    }

    /// Materialize the draft into a stored record with a fresh id.
    /// Status is forced to `Unpaid` regardless of anything in the input.
    pub fn into_challan(self) -> Challan {
        Challan {
            id: Uuid::new_v4().to_string(),
            name: self.name,
            plate_number: self.plate_number,
            vehicle_type: self.vehicle_type,
            violation: self.violation,
            fine_amount: self.fine_amount,
            date: self.date,
            location: self.location,
            remarks: self.remarks,
            image: self.image,
            status: ChallanStatus::Unpaid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ChallanDraft {
        ChallanDraft {
            name: "Rahul Kumar".into(),
            plate_number: "MH01AB1234".into(),
            vehicle_type: "Car".into(),
            violation: "Overspeeding".into(),
            fine_amount: 1000.0,
            date: NaiveDate::from_ymd_opt(2024, 2, 24).unwrap(),
            location: Some("Western Express Highway".into()),
            remarks: None,
            image: None,
        }
    }

    #[test]
    fn validation_names_the_missing_field() {
        let mut d = draft();
        d.plate_number = "  ".into();
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("plateNumber"));

        let mut d = draft();
        d.vehicle_type.clear();
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("vehicleType"));

        let mut d = draft();
        d.fine_amount = 0.0;
        let err = d.validate().unwrap_err();
        assert!(err.to_string().contains("fineAmount"));

        assert!(draft().validate().is_ok());
    }

    #[test]
    fn issuance_forces_unpaid_and_assigns_id() {
        let c = draft().into_challan();
        assert_eq!(c.status, ChallanStatus::Unpaid);
        assert!(!c.id.is_empty());
        let again = draft().into_challan();
        assert_ne!(c.id, again.id);
    }

    #[test]
    fn plate_match_is_case_insensitive() {
        let c = draft().into_challan();
        assert!(c.matches_plate("mh01ab1234"));
        assert!(c.matches_plate(" MH01AB1234 "));
        assert!(!c.matches_plate("MH02CD5678"));
    }

    #[test]
    fn wire_format_is_camel_case_with_unpaid_default() {
        // Legacy documents carry short ids and may omit status/optionals.
        let json = r#"{
            "id": "c1",
            "name": "Priya Singh",
            "plateNumber": "MH02CD5678",
            "vehicleType": "Car",
            "violation": "Red Light Violation",
            "fineAmount": 500,
            "date": "2024-02-24"
        }"#;
        let c: Challan = serde_json::from_str(json).unwrap();
        assert_eq!(c.id, "c1");
        assert_eq!(c.status, ChallanStatus::Unpaid);
        assert_eq!(c.location, None);

        let out = serde_json::to_value(&c).unwrap();
        assert_eq!(out["plateNumber"], "MH02CD5678");
        assert_eq!(out["status"], "Unpaid");
        assert!(out.get("location").is_none());
    }
}
