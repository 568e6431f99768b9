//! Policy decisions for every resource family and operation.

use super::*;
use crate::domain::{Doctor, ErrorCode, Mapping, Patient};
use rstest::{fixture, rstest};

const ALL_OPERATIONS: [Operation; 5] = [
    Operation::List,
    Operation::Retrieve,
    Operation::Create,
    Operation::Update,
    Operation::Delete,
];

#[fixture]
fn caller() -> UserId {
    UserId::random()
}

#[rstest]
#[case(Operation::List, true)]
#[case(Operation::Retrieve, true)]
#[case(Operation::Create, false)]
#[case(Operation::Update, false)]
#[case(Operation::Delete, false)]
fn read_operations(#[case] operation: Operation, #[case] expected: bool) {
    assert_eq!(operation.is_read(), expected);
}

#[rstest]
#[case(Operation::List, PermissionLevel::Public)]
#[case(Operation::Retrieve, PermissionLevel::Public)]
#[case(Operation::Create, PermissionLevel::Authenticated)]
#[case(Operation::Update, PermissionLevel::Authenticated)]
#[case(Operation::Delete, PermissionLevel::Authenticated)]
fn doctor_access_levels(#[case] operation: Operation, #[case] expected: PermissionLevel) {
    assert_eq!(doctor_access(operation), expected);
    assert_eq!(Doctor::permission(operation), expected);
}

#[rstest]
fn patient_and_mapping_operations_are_owner_level() {
    for operation in ALL_OPERATIONS {
        assert_eq!(Patient::permission(operation), PermissionLevel::Owner);
        assert_eq!(Mapping::permission(operation), PermissionLevel::Owner);
    }
}

#[rstest]
fn resource_kinds_are_declared() {
    assert_eq!(Patient::KIND, ResourceKind::Patient);
    assert_eq!(Doctor::KIND, ResourceKind::Doctor);
    assert_eq!(Mapping::KIND, ResourceKind::Mapping);
}

#[rstest]
fn anonymous_patient_access_is_unauthorised() {
    for operation in ALL_OPERATIONS {
        let err = authorize::<Patient>(None, operation).expect_err("anonymous rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
        assert_eq!(err.message(), CREDENTIALS_MISSING);
    }
}

#[rstest]
fn anonymous_mapping_access_is_unauthorised() {
    for operation in ALL_OPERATIONS {
        let err = authorize::<Mapping>(None, operation).expect_err("anonymous rejected");
        assert_eq!(err.code(), ErrorCode::Unauthorized);
    }
}

#[rstest]
fn owner_grant_scopes_to_caller(caller: UserId) {
    let scope = owner_scope::<Patient>(Some(&caller), Operation::Create).expect("owner scope");
    assert_eq!(scope.owner(), caller);
    assert!(scope.is_owner(&caller));
    assert!(!scope.is_owner(&UserId::random()));
}

#[rstest]
#[case(Operation::List)]
#[case(Operation::Retrieve)]
fn anonymous_doctor_reads_are_allowed(#[case] operation: Operation) {
    let grant = authorize::<Doctor>(None, operation).expect("public read");
    assert_eq!(grant, Grant::Anonymous);
    assert_eq!(grant.caller(), None);
}

#[rstest]
#[case(Operation::Create)]
#[case(Operation::Update)]
#[case(Operation::Delete)]
fn anonymous_doctor_writes_are_unauthorised(#[case] operation: Operation) {
    let err = authorize::<Doctor>(None, operation).expect_err("write needs identity");
    assert_eq!(err.code(), ErrorCode::Unauthorized);
}

#[rstest]
fn authenticated_doctor_access_is_not_owner_scoped(caller: UserId) {
    for operation in ALL_OPERATIONS {
        let grant = authorize::<Doctor>(Some(&caller), operation).expect("granted");
        assert_eq!(grant, Grant::Authenticated(caller));
        assert!(grant.into_owner_scope().is_err());
    }
}
