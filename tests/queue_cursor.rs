mod support;

use std::sync::Arc;

use focuspresso::{Error, MemoryKv, Mutation, NewTask, TaskQueue};

use support::{at, date, FlakyKv};

fn draft(title: &str) -> NewTask {
    NewTask::new(title, at(date(2025, 3, 10), 9, 0))
}

#[tokio::test]
async fn cursor_walks_the_queue() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    for title in ["one", "two", "three"] {
        queue.add_task(draft(title)).await?;
    }

    assert_eq!(queue.current().await.unwrap().title, "one");
    let done = queue.complete_current().await?.unwrap();
    assert_eq!(done.title, "one");
    assert!(done.completed);
    queue.complete_current().await?;

    assert_eq!(queue.current().await.unwrap().title, "three");
    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot.cursor, 2);
    assert_eq!(snapshot.completed.len(), 2);
    Ok(())
}

#[tokio::test]
async fn completing_past_the_end_returns_none() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    assert!(queue.complete_current().await?.is_none());

    queue.add_task(draft("only")).await?;
    queue.complete_current().await?;
    assert!(queue.complete_current().await?.is_none());
    assert!(queue.current().await.is_none());
    Ok(())
}

#[tokio::test]
async fn blank_titles_are_rejected_at_the_boundary() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    let err = queue.add_task(draft("   ")).await.unwrap_err();
    assert!(matches!(err, Error::EmptyTitle));
    assert!(queue.snapshot().await.tasks.is_empty());
    Ok(())
}

#[tokio::test]
async fn deleting_before_the_cursor_shifts_it_back() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    let first = queue.add_task(draft("one")).await?;
    queue.add_task(draft("two")).await?;
    queue.add_task(draft("three")).await?;

    queue.complete_current().await?;
    assert_eq!(queue.current().await.unwrap().title, "two");

    // Removing the completed "one" keeps the cursor on "two".
    assert_eq!(queue.delete_task(&first.id).await?, Mutation::Applied);
    assert_eq!(queue.snapshot().await.cursor, 0);
    assert_eq!(queue.current().await.unwrap().title, "two");
    Ok(())
}

#[tokio::test]
async fn deleting_an_unknown_id_is_a_no_op() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    queue.add_task(draft("one")).await?;
    assert_eq!(queue.delete_task("no-such-id").await?, Mutation::NotFound);
    assert_eq!(queue.snapshot().await.tasks.len(), 1);
    Ok(())
}

#[tokio::test]
async fn reset_returns_to_the_initial_empty_state() -> anyhow::Result<()> {
    let queue = TaskQueue::load(Arc::new(MemoryKv::new())).await?;
    queue.add_task(draft("one")).await?;
    queue.add_task(draft("two")).await?;
    queue.complete_current().await?;

    queue.reset().await?;
    let snapshot = queue.snapshot().await;
    assert!(snapshot.tasks.is_empty());
    assert!(snapshot.completed.is_empty());
    assert_eq!(snapshot.cursor, 0);
    Ok(())
}

#[tokio::test]
async fn state_survives_a_reload() -> anyhow::Result<()> {
    let kv = Arc::new(MemoryKv::new());
    {
        let queue = TaskQueue::load(Arc::clone(&kv)).await?;
        queue.add_task(draft("one")).await?;
        queue.add_task(draft("two")).await?;
        queue.complete_current().await?;
    }

    let revived = TaskQueue::load(kv).await?;
    let snapshot = revived.snapshot().await;
    assert_eq!(snapshot.tasks.len(), 2);
    assert_eq!(snapshot.completed.len(), 1);
    assert_eq!(snapshot.cursor, 1);
    assert_eq!(revived.current().await.unwrap().title, "two");
    Ok(())
}

#[tokio::test]
async fn failed_write_leaves_memory_at_the_previous_state() -> anyhow::Result<()> {
    let kv = Arc::new(FlakyKv::new());
    let queue = TaskQueue::load(Arc::clone(&kv)).await?;
    queue.add_task(draft("one")).await?;

    kv.fail_writes(true);
    let err = queue.complete_current().await.unwrap_err();
    assert!(matches!(err, Error::StorageWrite { .. }));

    // Nothing moved: no optimistic update to roll back.
    let snapshot = queue.snapshot().await;
    assert_eq!(snapshot.cursor, 0);
    assert!(snapshot.completed.is_empty());
    assert!(!snapshot.tasks[0].completed);
    Ok(())
}
