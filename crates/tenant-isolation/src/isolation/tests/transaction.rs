use std::sync::Arc;

use super::common::*;
use crate::isolation::{Connection, IsolationError, TenantId};
use crate::suite::{Employee, TimeOffRequest};

#[test]
fn failed_transaction_writes_nothing() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());

    let result = acme.transaction(|tx| -> Result<(), IsolationError> {
        tx.insert(employee("Avery Chen"))?;
        let mut forged = employee("Mallory Quinn");
        forged.organization_id = Some(TenantId::random());
        tx.insert(forged)?;
        Ok(())
    });

    assert!(matches!(result, Err(IsolationError::TenantMismatch { .. })));
    assert_eq!(store.row_count().expect("count"), 0);
}

#[test]
fn transaction_reads_its_own_pending_writes() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());

    let pending = acme
        .transaction(|tx| -> Result<usize, IsolationError> {
            let avery = tx.insert(employee("Avery Chen"))?;
            tx.insert(TimeOffRequest::new(avery.id, date(2024, 7, 1), date(2024, 7, 5)))?;
            assert_eq!(tx.count::<TimeOffRequest>()?, 1);
            assert_eq!(store.row_count().expect("count"), 0);
            Ok(tx.pending_writes())
        })
        .expect("commit");

    assert_eq!(pending, 2);
    assert_eq!(store.row_count().expect("count"), 2);
}

#[test]
fn local_tenant_applies_to_the_transaction_only() {
    let store = store();
    let acme_tenant = TenantId::random();
    let globex_tenant = TenantId::random();
    let acme = connection_as(&store, acme_tenant);

    let stamped = acme
        .transaction(|tx| -> Result<Employee, IsolationError> {
            tx.set_local_tenant(globex_tenant);
            assert_eq!(tx.current_tenant().ok(), Some(globex_tenant));
            tx.insert(employee("Jordan Patel"))
        })
        .expect("insert under local tenant");

    assert_eq!(stamped.organization_id, Some(globex_tenant));
    assert_eq!(acme.current_tenant().ok(), Some(acme_tenant));
    assert!(acme.select::<Employee>().expect("acme view").is_empty());
    assert_eq!(
        connection_as(&store, globex_tenant)
            .count::<Employee>()
            .expect("globex view"),
        1
    );
}

#[test]
fn local_tenant_works_on_a_connection_without_context() {
    let store = store();
    let tenant = TenantId::random();
    let anonymous = Connection::new(0, Arc::clone(&store));

    anonymous
        .transaction(|tx| -> Result<(), IsolationError> {
            tx.set_local_tenant(tenant);
            tx.insert(employee("Avery Chen"))?;
            Ok(())
        })
        .expect("seed-style insert");

    assert!(!anonymous.context().is_set());
    assert_eq!(connection_as(&store, tenant).count::<Employee>().expect("count"), 1);
}

#[test]
fn delete_inside_transaction_sees_staged_children() {
    let store = store();
    let acme = connection_as(&store, TenantId::random());

    let removed = acme
        .transaction(|tx| -> Result<usize, IsolationError> {
            let avery = tx.insert(employee("Avery Chen"))?;
            tx.insert(TimeOffRequest::new(avery.id, date(2024, 7, 1), date(2024, 7, 5)))?;
            tx.delete::<Employee>(avery.id)
        })
        .expect("commit");

    assert_eq!(removed, 2);
    assert_eq!(store.row_count().expect("count"), 0);
}
