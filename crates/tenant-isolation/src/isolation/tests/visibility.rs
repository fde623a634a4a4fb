use std::sync::Arc;

use super::common::*;
use crate::isolation::{
    AuthError, Connection, IsolationError, StorageError, TenantId, TenantScoped,
};
use crate::suite::{Employee, PayrollRun, Payslip, PayslipLine};

#[test]
fn rows_of_another_tenant_are_never_returned() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    let globex = connection_as(&store, TenantId::random());

    let avery = acme.insert(employee("Avery Chen")).expect("acme insert");
    globex.insert(employee("Jordan Patel")).expect("globex insert");

    let seen_by_acme = acme.select::<Employee>().expect("acme select");
    assert_eq!(seen_by_acme, vec![avery.clone()]);
    assert_eq!(globex.count::<Employee>().expect("globex count"), 1);
    assert!(globex
        .find::<Employee>(avery.id)
        .expect("lookup succeeds")
        .is_none());
}

#[test]
fn targeted_read_of_foreign_row_looks_missing() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    let globex = connection_as(&store, TenantId::random());
    let avery = acme.insert(employee("Avery Chen")).expect("insert");

    match globex.get::<Employee>(avery.id) {
        Err(IsolationError::NotFoundOrForbidden { table, id }) => {
            assert_eq!(table, Employee::TABLE);
            assert_eq!(id, avery.id);
        }
        other => panic!("expected not found, got {other:?}"),
    }
}

#[test]
fn repeated_reads_return_the_same_rows() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    for name in ["Avery Chen", "Riley Okafor", "Sam Lindqvist"] {
        acme.insert(employee(name)).expect("insert");
    }

    let first = acme.select::<Employee>().expect("first read");
    let second = acme.select::<Employee>().expect("second read");
    assert_eq!(first.len(), 3);
    assert_eq!(first, second);
}

#[test]
fn indirect_rows_follow_their_parents_owner() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    let globex = connection_as(&store, TenantId::random());
    let fixture = seed_payroll(&acme);

    assert_eq!(acme.select::<Payslip>().expect("payslips"), vec![fixture.payslip.clone()]);
    assert_eq!(
        acme.select::<PayslipLine>().expect("lines"),
        vec![fixture.line.clone()]
    );

    assert!(globex.select::<PayrollRun>().expect("runs").is_empty());
    assert!(globex.select::<Payslip>().expect("payslips").is_empty());
    assert!(globex.select::<PayslipLine>().expect("lines").is_empty());
    assert!(globex
        .find::<PayslipLine>(fixture.line.id)
        .expect("lookup")
        .is_none());
}

#[test]
fn filtered_select_only_sees_visible_rows() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    let globex = connection_as(&store, TenantId::random());
    acme.insert(employee("Avery Chen")).expect("insert");
    globex.insert(employee("Avery Chen")).expect("insert");

    let matches = acme
        .select_where(|employee: &Employee| employee.full_name == "Avery Chen")
        .expect("filtered select");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].organization_id, acme.current_tenant().ok());
}

#[test]
fn unset_context_fails_closed_for_reads_and_writes() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());
    let avery = acme.insert(employee("Avery Chen")).expect("insert");
    let anonymous = Connection::new(1, Arc::clone(&store));

    let errors = [
        anonymous.select::<Employee>().err(),
        anonymous.find::<Employee>(avery.id).err(),
        anonymous.insert(employee("Jordan Patel")).err(),
        anonymous.delete::<Employee>(avery.id).err(),
    ];
    for error in errors {
        match error {
            Some(IsolationError::Auth(AuthError::AuthenticationRequired)) => {}
            other => panic!("expected authentication required, got {other:?}"),
        }
    }
    assert_eq!(store.row_count().expect("count"), 1);
}

#[test]
fn malformed_tenant_clears_the_context() {
    let store = store();
    let mut connection = connection_as(&store, TenantId::random());

    assert!(matches!(
        connection.set_current_tenant_str("not-a-tenant"),
        Err(AuthError::MalformedTenant { .. })
    ));
    assert!(connection
        .select::<Employee>()
        .expect_err("context cleared")
        .is_authentication_required());
}

#[test]
fn storage_failures_propagate_unchanged() {
    let mut connection = Connection::new(0, Arc::new(UnavailableStore));
    connection.set_current_tenant(TenantId::random());

    match connection.select::<Employee>() {
        Err(IsolationError::Storage(StorageError::Unavailable(message))) => {
            assert_eq!(message, "backend offline");
        }
        other => panic!("expected storage failure, got {other:?}"),
    }
}
