// Copyright 2021 Cargill Incorporated
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The fixed authorization policy of the cold chain contract.
//!
//! Every caller-facing function has exactly one entry. A function missing from the table is
//! denied to everyone.

use std::fmt;

use cold_chain_sdk::ledger::ApplyError;

pub const MANUFACTURER_ORG: &str = "Org1MSP";
pub const INSPECTOR_ORG: &str = "Org2MSP";
pub const TRANSPORTER_ORG: &str = "Org3MSP";

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Permission {
    Unrestricted,
    Organizations(&'static [&'static str]),
}

impl Permission {
    pub fn allows(&self, organization: &str) -> bool {
        match *self {
            Permission::Unrestricted => true,
            Permission::Organizations(organizations) => organizations.contains(&organization),
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Permission::Unrestricted => write!(f, "unrestricted"),
            Permission::Organizations(organizations) => write!(f, "{}", organizations.join(", ")),
        }
    }
}

const MANUFACTURER_ONLY: Permission = Permission::Organizations(&[MANUFACTURER_ORG]);
const TRANSPORTER_ONLY: Permission = Permission::Organizations(&[TRANSPORTER_ORG]);

#[cfg(not(feature = "delivery-authorization"))]
const DELIVERY_TRANSITIONS: Permission = Permission::Unrestricted;
#[cfg(feature = "delivery-authorization")]
const DELIVERY_TRANSITIONS: Permission = TRANSPORTER_ONLY;

const POLICY: &[(&str, Permission)] = &[
    ("VaccineExists", Permission::Unrestricted),
    ("CreateBatch", MANUFACTURER_ONLY),
    ("ReadBatch", Permission::Unrestricted),
    ("DeleteBatch", MANUFACTURER_ONLY),
    ("GetAllBatch", Permission::Unrestricted),
    ("DeliverToTransporter", MANUFACTURER_ONLY),
    ("AddTemperatureLog", TRANSPORTER_ONLY),
    (
        "GetTemperatureLogHistory",
        Permission::Organizations(&[MANUFACTURER_ORG, INSPECTOR_ORG, TRANSPORTER_ORG]),
    ),
    (
        "VerifyTemperatureLogs",
        Permission::Organizations(&[MANUFACTURER_ORG, INSPECTOR_ORG]),
    ),
    ("StartDelivery", DELIVERY_TRANSITIONS),
    ("CompleteDelivery", DELIVERY_TRANSITIONS),
    ("GetDeliveryStatus", Permission::Unrestricted),
];

#[derive(Debug, Clone, Copy, Default)]
pub struct PermissionPolicy;

impl PermissionPolicy {
    pub fn new() -> Self {
        PermissionPolicy
    }

    pub fn permission(&self, operation: &str) -> Option<Permission> {
        POLICY
            .iter()
            .find(|(name, _)| *name == operation)
            .map(|(_, permission)| *permission)
    }

    pub fn is_permitted(&self, operation: &str, organization: &str) -> bool {
        self.permission(operation)
            .map(|permission| permission.allows(organization))
            .unwrap_or(false)
    }

    /// Fails with `AccessDenied` unless `organization` may invoke `operation`.
    pub fn check(&self, operation: &str, organization: &str) -> Result<(), ApplyError> {
        if self.is_permitted(operation, organization) {
            Ok(())
        } else {
            Err(ApplyError::AccessDenied {
                operation: operation.to_string(),
                organization: organization.to_string(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    // Test that manufacturer only functions reject every other organization
    fn test_manufacturer_only() {
        let policy = PermissionPolicy::new();
        for operation in &["CreateBatch", "DeleteBatch", "DeliverToTransporter"] {
            assert!(policy.is_permitted(operation, MANUFACTURER_ORG));
            assert!(!policy.is_permitted(operation, INSPECTOR_ORG));
            assert!(!policy.is_permitted(operation, TRANSPORTER_ORG));
        }
    }

    #[test]
    // Test the temperature log functions
    fn test_temperature_log_permissions() {
        let policy = PermissionPolicy::new();
        assert!(policy.is_permitted("AddTemperatureLog", TRANSPORTER_ORG));
        assert!(!policy.is_permitted("AddTemperatureLog", MANUFACTURER_ORG));

        for org in &[MANUFACTURER_ORG, INSPECTOR_ORG, TRANSPORTER_ORG] {
            assert!(policy.is_permitted("GetTemperatureLogHistory", org));
        }
        assert!(!policy.is_permitted("GetTemperatureLogHistory", "Org4MSP"));

        assert!(policy.is_permitted("VerifyTemperatureLogs", INSPECTOR_ORG));
        assert!(!policy.is_permitted("VerifyTemperatureLogs", TRANSPORTER_ORG));
    }

    #[test]
    // Test that an unknown function is denied to everyone
    fn test_unknown_operation_denied() {
        let policy = PermissionPolicy::new();
        match policy.check("TransferBatch", MANUFACTURER_ORG) {
            Err(ApplyError::AccessDenied {
                operation,
                organization,
            }) => {
                assert_eq!(operation, "TransferBatch");
                assert_eq!(organization, MANUFACTURER_ORG);
            }
            res => panic!("Expected AccessDenied, got {:?}", res),
        }
    }

    #[test]
    // Test that organization matching is exact
    fn test_organization_is_case_sensitive() {
        let policy = PermissionPolicy::new();
        assert!(!policy.is_permitted("CreateBatch", "org1msp"));
        assert!(!policy.is_permitted("CreateBatch", ""));
    }

    #[cfg(not(feature = "delivery-authorization"))]
    #[test]
    // Test that delivery transitions accept any organization
    fn test_delivery_transitions_unrestricted() {
        let policy = PermissionPolicy::new();
        assert!(policy.is_permitted("StartDelivery", "Org4MSP"));
        assert!(policy.is_permitted("CompleteDelivery", MANUFACTURER_ORG));
    }

    #[cfg(feature = "delivery-authorization")]
    #[test]
    // Test that delivery transitions are limited to the transporter
    fn test_delivery_transitions_restricted() {
        let policy = PermissionPolicy::new();
        assert!(policy.is_permitted("StartDelivery", TRANSPORTER_ORG));
        assert!(!policy.is_permitted("CompleteDelivery", MANUFACTURER_ORG));
    }

    #[test]
    fn test_permission_display() {
        assert_eq!(
            PermissionPolicy::new()
                .permission("VerifyTemperatureLogs")
                .map(|p| p.to_string()),
            Some("Org1MSP, Org2MSP".to_string())
        );
    }
}
