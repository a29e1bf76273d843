// Unit tests for task broker semantics: prefetch-1, ack, nack-no-requeue

use gradbridge::models::{TaskKind, TaskMessage};
use gradbridge::queue::{MemoryBroker, TaskBroker, TaskPublisher};
use std::sync::Arc;

#[tokio::test]
async fn test_publish_receive_ack_round_trip() {
    let broker = MemoryBroker::new();

    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();

    let delivery = broker.receive().await.unwrap().expect("task delivered");
    assert_eq!(delivery.task.kind, TaskKind::Ingest);

    broker.ack(&delivery).await.unwrap();
    assert!(!broker.has_inflight().await);
    assert!(broker.receive().await.unwrap().is_none());
}

#[tokio::test]
async fn test_tasks_deliver_in_publish_order() {
    let broker = MemoryBroker::new();

    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();
    broker
        .publish(&TaskMessage::new(TaskKind::Recompute))
        .await
        .unwrap();

    let first = broker.receive().await.unwrap().unwrap();
    assert_eq!(first.task.kind, TaskKind::Ingest);
    broker.ack(&first).await.unwrap();

    let second = broker.receive().await.unwrap().unwrap();
    assert_eq!(second.task.kind, TaskKind::Recompute);
}

#[tokio::test]
async fn test_no_second_delivery_while_one_is_unresolved() {
    let broker = MemoryBroker::new();

    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();
    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();

    let first = broker.receive().await.unwrap().unwrap();

    // Prefetch limit: nothing else until the first is acked or nacked.
    assert!(broker.receive().await.unwrap().is_none());
    assert_eq!(broker.pending_len().await, 1);

    broker.ack(&first).await.unwrap();
    assert!(broker.receive().await.unwrap().is_some());
}

#[tokio::test]
async fn test_nack_buries_without_requeue() {
    let broker = MemoryBroker::new();

    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();

    let delivery = broker.receive().await.unwrap().unwrap();
    broker
        .nack(&delivery, "Enrichment error: process exited with status 1")
        .await
        .unwrap();

    // Not redelivered, recorded on the dead list instead.
    assert!(broker.receive().await.unwrap().is_none());
    assert_eq!(broker.pending_len().await, 0);

    let dead = broker.dead_tasks(10).await.unwrap();
    assert_eq!(dead.len(), 1);
    assert!(dead[0].error.contains("Enrichment error"));
    assert_eq!(dead[0].raw_task, delivery.raw);
}

#[tokio::test]
async fn test_recover_inflight_requeues_at_the_head() {
    let broker = MemoryBroker::new();

    broker
        .publish(&TaskMessage::new(TaskKind::Ingest))
        .await
        .unwrap();
    broker
        .publish(&TaskMessage::new(TaskKind::Recompute))
        .await
        .unwrap();

    let stranded = broker.receive().await.unwrap().unwrap();
    let stranded_raw = stranded.raw.clone();
    // Simulate a crash before ack: the delivery is simply never resolved.
    drop(stranded);

    assert_eq!(broker.recover_inflight().await.unwrap(), 1);
    assert!(!broker.has_inflight().await);

    // The stranded task comes back first.
    let redelivered = broker.receive().await.unwrap().unwrap();
    assert_eq!(redelivered.raw, stranded_raw);
}

#[tokio::test]
async fn test_publisher_reports_publish_success_only() {
    let broker = Arc::new(MemoryBroker::new());
    let publisher = TaskPublisher::new(broker.clone());

    let task = publisher.publish(TaskKind::Recompute).await.unwrap();
    assert_eq!(task.kind, TaskKind::Recompute);

    // Publishing succeeded; nothing has been processed.
    assert_eq!(broker.pending_len().await, 1);
}
