use std::thread;

use super::common::*;
use crate::isolation::{ConnectionPool, PoolError, TenantId};
use crate::suite::Employee;

#[test]
fn released_connection_carries_no_tenant() {
    let pool = ConnectionPool::new(store(), 1);
    let tenant = TenantId::random();

    {
        let mut connection = pool.acquire().expect("acquire");
        connection.set_current_tenant(tenant);
        connection.insert(employee("Avery Chen")).expect("insert");
    }

    let reused = pool.acquire().expect("reacquire");
    assert_eq!(reused.id(), 0);
    assert!(!reused.context().is_set());
    assert!(reused
        .select::<Employee>()
        .expect_err("fails closed")
        .is_authentication_required());
}

#[test]
fn acquire_reports_exhaustion_without_waiting() {
    let pool = ConnectionPool::new(store(), 2);
    let first = pool.acquire().expect("first");
    let _second = pool.acquire().expect("second");

    assert!(matches!(pool.acquire(), Err(PoolError::Exhausted { size: 2 })));
    drop(first);
    assert_eq!(pool.idle_count(), 1);
    assert!(pool.acquire().is_ok());
}

#[test]
fn zero_sized_pool_still_holds_one_connection() {
    let pool = ConnectionPool::new(store(), 0);
    assert_eq!(pool.size(), 1);
    assert_eq!(pool.idle_count(), 1);
}

#[test]
fn concurrent_sessions_only_see_their_own_rows() {
    let pool = ConnectionPool::new(store(), 4);
    let tenants: Vec<TenantId> = (0..4).map(|_| TenantId::random()).collect();

    thread::scope(|scope| {
        for tenant in &tenants {
            let pool = pool.clone();
            scope.spawn(move || {
                for round in 0..25 {
                    let mut connection = pool.acquire().expect("pool sized for every thread");
                    connection.set_current_tenant(*tenant);
                    connection
                        .insert(employee(&format!("Employee {round}")))
                        .expect("insert");
                    let visible = connection.select::<Employee>().expect("select");
                    assert_eq!(visible.len(), round + 1);
                    assert!(visible
                        .iter()
                        .all(|employee| employee.organization_id == Some(*tenant)));
                }
            });
        }
    });

    assert_eq!(pool.store().row_count().expect("count"), 100);
    assert_eq!(pool.idle_count(), 4);
}
