//! Canonical field vocabulary shared by the registry, strategies, normalizer
//! and validator.

use serde::{Deserialize, Serialize};

/// Canonical field key for a citation record.
///
/// This is a closed vocabulary: jurisdiction mappings may omit keys but can
/// never introduce new ones. `Ord` keeps field maps deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    /// Citation identifier (AIT number).
    FineNumber,
    /// Date the owner was notified of the citation.
    NotificationDate,
    /// Deadline for filing a prior defense.
    DefenseDueDate,
    /// Deadline for identifying the offending driver.
    DriverIdDueDate,
    /// Vehicle license plate.
    LicensePlate,
    /// Vehicle make/model/version.
    VehicleModel,
    /// Where the violation occurred.
    ViolationLocation,
    /// Date of the violation.
    ViolationDate,
    /// Time of the violation.
    ViolationTime,
    /// Violation code (enquadramento).
    ViolationCode,
    /// Fine amount.
    Amount,
    /// Violation description.
    Description,
    /// Speed measured by the device.
    MeasuredSpeed,
    /// Speed considered after the margin of error.
    ConsideredSpeed,
    /// Posted speed limit.
    SpeedLimit,
    /// Vehicle owner name.
    OwnerName,
    /// Owner document (CPF/CNPJ).
    OwnerDocument,
}

/// How the normalizer should treat a field's raw string value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Parsed as a `day/month/year` calendar date.
    Date,
    /// Parsed as a decimal currency amount.
    Amount,
    /// Trimmed and uppercased, nothing else.
    Identifier,
    /// Trimmed free text.
    Text,
}

impl FieldKey {
    /// All canonical keys, in declaration order.
    pub const ALL: [FieldKey; 17] = [
        FieldKey::FineNumber,
        FieldKey::NotificationDate,
        FieldKey::DefenseDueDate,
        FieldKey::DriverIdDueDate,
        FieldKey::LicensePlate,
        FieldKey::VehicleModel,
        FieldKey::ViolationLocation,
        FieldKey::ViolationDate,
        FieldKey::ViolationTime,
        FieldKey::ViolationCode,
        FieldKey::Amount,
        FieldKey::Description,
        FieldKey::MeasuredSpeed,
        FieldKey::ConsideredSpeed,
        FieldKey::SpeedLimit,
        FieldKey::OwnerName,
        FieldKey::OwnerDocument,
    ];

    /// Keys that must be present for a record to be usable downstream.
    pub const REQUIRED: [FieldKey; 3] = [
        FieldKey::FineNumber,
        FieldKey::LicensePlate,
        FieldKey::ViolationDate,
    ];

    /// Snake-case name, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKey::FineNumber => "fine_number",
            FieldKey::NotificationDate => "notification_date",
            FieldKey::DefenseDueDate => "defense_due_date",
            FieldKey::DriverIdDueDate => "driver_id_due_date",
            FieldKey::LicensePlate => "license_plate",
            FieldKey::VehicleModel => "vehicle_model",
            FieldKey::ViolationLocation => "violation_location",
            FieldKey::ViolationDate => "violation_date",
            FieldKey::ViolationTime => "violation_time",
            FieldKey::ViolationCode => "violation_code",
            FieldKey::Amount => "amount",
            FieldKey::Description => "description",
            FieldKey::MeasuredSpeed => "measured_speed",
            FieldKey::ConsideredSpeed => "considered_speed",
            FieldKey::SpeedLimit => "speed_limit",
            FieldKey::OwnerName => "owner_name",
            FieldKey::OwnerDocument => "owner_document",
        }
    }

    /// Normalization category for this key.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldKey::NotificationDate
            | FieldKey::DefenseDueDate
            | FieldKey::DriverIdDueDate
            | FieldKey::ViolationDate => FieldKind::Date,
            FieldKey::Amount => FieldKind::Amount,
            FieldKey::FineNumber | FieldKey::LicensePlate | FieldKey::ViolationCode => {
                FieldKind::Identifier
            }
            _ => FieldKind::Text,
        }
    }
}

impl std::fmt::Display for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_names_match_as_str() {
        for key in FieldKey::ALL {
            let json = serde_json::to_string(&key).unwrap();
            assert_eq!(json, format!("\"{}\"", key.as_str()));
        }
    }

    #[test]
    fn test_required_keys_have_expected_kinds() {
        assert_eq!(FieldKey::FineNumber.kind(), FieldKind::Identifier);
        assert_eq!(FieldKey::LicensePlate.kind(), FieldKind::Identifier);
        assert_eq!(FieldKey::ViolationDate.kind(), FieldKind::Date);
        assert_eq!(FieldKey::Amount.kind(), FieldKind::Amount);
        assert_eq!(FieldKey::Description.kind(), FieldKind::Text);
    }
}
