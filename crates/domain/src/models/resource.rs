//! Resource domain models.
//!
//! A resource is one person listed in an uploaded spreadsheet against a
//! demand. Rows are first collected as an [`IngestedRecord`] (canonical
//! field name to string value) and then checked into a [`NewResource`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// The fixed set of resource columns a spreadsheet header can map onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    PersonnelNo,
    Name,
    PrimarySkill,
    ManagementLevel,
    HomeLocation,
    LockStatus,
    AvailabilityStatus,
    Email,
    ContactDetails,
    JoiningDate,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::PersonnelNo,
        CanonicalField::Name,
        CanonicalField::PrimarySkill,
        CanonicalField::ManagementLevel,
        CanonicalField::HomeLocation,
        CanonicalField::LockStatus,
        CanonicalField::AvailabilityStatus,
        CanonicalField::Email,
        CanonicalField::ContactDetails,
        CanonicalField::JoiningDate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::PersonnelNo => "personnel_no",
            CanonicalField::Name => "name",
            CanonicalField::PrimarySkill => "primary_skill",
            CanonicalField::ManagementLevel => "management_level",
            CanonicalField::HomeLocation => "home_location",
            CanonicalField::LockStatus => "lock_status",
            CanonicalField::AvailabilityStatus => "availability_status",
            CanonicalField::Email => "email",
            CanonicalField::ContactDetails => "contact_details",
            CanonicalField::JoiningDate => "joining_date",
        }
    }

    /// The only field a row must carry to be accepted.
    pub fn is_mandatory(&self) -> bool {
        matches!(self, CanonicalField::Name)
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One accepted spreadsheet row, keyed by canonical field.
///
/// Only mapped, non-empty cells are present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestedRecord {
    pub demand_id: Uuid,
    pub fields: BTreeMap<CanonicalField, String>,
}

impl IngestedRecord {
    pub fn new(demand_id: Uuid) -> Self {
        Self {
            demand_id,
            fields: BTreeMap::new(),
        }
    }

    pub fn get(&self, field: CanonicalField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn owned(&self, field: CanonicalField) -> String {
        self.get(field).unwrap_or_default().to_string()
    }
}

/// A resource ready to be persisted.
///
/// Length limits mirror the `resources` table column widths; a row that
/// exceeds them is rejected before it reaches the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewResource {
    pub demand_id: Uuid,
    #[validate(length(max = 50, message = "personnel_no exceeds 50 characters"))]
    pub personnel_no: String,
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[validate(length(max = 255, message = "primary_skill exceeds 255 characters"))]
    pub primary_skill: String,
    #[validate(length(max = 50, message = "management_level exceeds 50 characters"))]
    pub management_level: String,
    #[validate(length(max = 255, message = "home_location exceeds 255 characters"))]
    pub home_location: String,
    #[validate(length(max = 100, message = "lock_status exceeds 100 characters"))]
    pub lock_status: String,
    #[validate(length(max = 100, message = "availability_status exceeds 100 characters"))]
    pub availability_status: String,
    #[validate(length(max = 255, message = "email exceeds 255 characters"))]
    pub email: String,
    #[validate(length(max = 100, message = "contact_details exceeds 100 characters"))]
    pub contact_details: String,
    #[validate(length(max = 100, message = "joining_date exceeds 100 characters"))]
    pub joining_date: String,
    pub uploaded_by: Option<Uuid>,
}

impl NewResource {
    /// Builds a resource from an ingested row, filling absent fields with
    /// empty strings, and checks it against the column limits.
    pub fn from_record(
        record: &IngestedRecord,
        uploaded_by: Option<Uuid>,
    ) -> Result<Self, validator::ValidationErrors> {
        let resource = Self {
            demand_id: record.demand_id,
            personnel_no: record.owned(CanonicalField::PersonnelNo),
            name: record.owned(CanonicalField::Name),
            primary_skill: record.owned(CanonicalField::PrimarySkill),
            management_level: record.owned(CanonicalField::ManagementLevel),
            home_location: record.owned(CanonicalField::HomeLocation),
            lock_status: record.owned(CanonicalField::LockStatus),
            availability_status: record.owned(CanonicalField::AvailabilityStatus),
            email: record.owned(CanonicalField::Email),
            contact_details: record.owned(CanonicalField::ContactDetails),
            joining_date: record.owned(CanonicalField::JoiningDate),
            uploaded_by,
        };
        resource.validate()?;
        Ok(resource)
    }
}

/// A persisted resource.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: Uuid,
    pub demand_id: Uuid,
    pub personnel_no: String,
    pub name: String,
    pub primary_skill: String,
    pub management_level: String,
    pub home_location: String,
    pub lock_status: String,
    pub availability_status: String,
    pub email: String,
    pub contact_details: String,
    pub joining_date: String,
    pub evaluation_status: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(pairs: &[(CanonicalField, &str)]) -> IngestedRecord {
        let mut record = IngestedRecord::new(Uuid::new_v4());
        for (field, value) in pairs {
            record.fields.insert(*field, value.to_string());
        }
        record
    }

    #[test]
    fn test_canonical_field_names() {
        let names: Vec<&str> = CanonicalField::ALL.iter().map(|f| f.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "personnel_no",
                "name",
                "primary_skill",
                "management_level",
                "home_location",
                "lock_status",
                "availability_status",
                "email",
                "contact_details",
                "joining_date",
            ]
        );
    }

    #[test]
    fn test_only_name_is_mandatory() {
        let mandatory: Vec<_> = CanonicalField::ALL
            .iter()
            .filter(|f| f.is_mandatory())
            .collect();
        assert_eq!(mandatory, vec![&CanonicalField::Name]);
    }

    #[test]
    fn test_new_resource_from_record_fills_missing() {
        let rec = record(&[
            (CanonicalField::Name, "Jane Doe"),
            (CanonicalField::Email, "jane@x.com"),
        ]);
        let resource = NewResource::from_record(&rec, None).unwrap();
        assert_eq!(resource.name, "Jane Doe");
        assert_eq!(resource.email, "jane@x.com");
        assert_eq!(resource.primary_skill, "");
        assert_eq!(resource.demand_id, rec.demand_id);
    }

    #[test]
    fn test_new_resource_rejects_overlong_field() {
        let long = "9".repeat(51);
        let rec = record(&[
            (CanonicalField::Name, "Jane Doe"),
            (CanonicalField::PersonnelNo, long.as_str()),
        ]);
        let err = NewResource::from_record(&rec, None).unwrap_err();
        assert!(err.field_errors().contains_key("personnel_no"));
    }

    #[test]
    fn test_new_resource_requires_name() {
        let rec = record(&[(CanonicalField::Email, "jane@x.com")]);
        assert!(NewResource::from_record(&rec, None).is_err());
    }

    #[test]
    fn test_canonical_field_serializes_snake_case() {
        let json = serde_json::to_string(&CanonicalField::PrimarySkill).unwrap();
        assert_eq!(json, "\"primary_skill\"");
    }
}
