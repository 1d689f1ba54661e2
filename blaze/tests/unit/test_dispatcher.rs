//! Sequential dispatch tests

use std::sync::Arc;

use blaze::models::stack::MatchedStack;
use blaze::reconcile::dispatcher::dispatch;

use crate::support::{compose, stack, FakePlatform, IMAGE};

fn matched(ids: &[u64]) -> Vec<MatchedStack> {
    ids.iter()
        .map(|&id| MatchedStack {
            stack: stack(id, &format!("stack-{id}")),
            raw_document: compose(IMAGE, &["blaze.update"]),
            services: vec!["app".to_string()],
        })
        .collect()
}

#[test]
fn test_dispatch_all_succeed() {
    let platform = Arc::new(FakePlatform::new());
    let report = tokio_test::block_on(dispatch(platform.as_ref(), 1, &matched(&[1, 2])));

    assert!(report.is_success());
    assert_eq!(report.updated, vec![1, 2]);
    assert_eq!(report.attempted(), 2);
    assert!(report.first_failure().is_none());
}

#[test]
fn test_dispatch_isolates_failures() {
    let platform = Arc::new(FakePlatform::new().failing_update(1).failing_update(3));
    let report = tokio_test::block_on(dispatch(platform.as_ref(), 1, &matched(&[1, 2, 3, 4])));

    assert_eq!(platform.redeployed(), vec![1, 2, 3, 4]);
    assert_eq!(report.updated, vec![2, 4]);
    assert_eq!(report.updated_count(), 2);
    assert_eq!(report.failures.len(), 2);
    assert_eq!(report.attempted(), 4);

    let first = report.first_failure().unwrap();
    assert_eq!(first.stack_id, 1);
    assert_eq!(first.stack_name, "stack-1");
    assert!(first.reason.contains("stack update failed"));
}

#[test]
fn test_dispatch_nothing() {
    let platform = Arc::new(FakePlatform::new());
    let report = tokio_test::block_on(dispatch(platform.as_ref(), 1, &[]));

    assert!(report.is_success());
    assert_eq!(report.attempted(), 0);
    assert!(platform.calls().is_empty());
}
