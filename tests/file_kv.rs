mod support;

use std::sync::Arc;

use focuspresso::kv::KeyValueStore;
use focuspresso::{App, JsonFileKv, TaskStore};
use tempfile::TempDir;

use support::{at, date, task};

#[tokio::test]
async fn file_backend_round_trips_keys() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let kv = JsonFileKv::new(dir.path().join("state.json"));

    assert!(kv.get("alpha").await?.is_none());
    kv.set("alpha", "1").await?;
    kv.set("beta", "2").await?;
    assert_eq!(kv.get("alpha").await?.as_deref(), Some("1"));

    kv.remove("alpha").await?;
    assert!(kv.get("alpha").await?.is_none());
    assert_eq!(kv.get("beta").await?.as_deref(), Some("2"));
    Ok(())
}

#[tokio::test]
async fn tasks_survive_reopening_the_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("state.json");
    let day = date(2025, 3, 10);
    let entry = task("water plants", at(day, 9, 0));

    {
        let store = TaskStore::new(Arc::new(JsonFileKv::new(&path)));
        store.add_task(day, entry.clone()).await?;
    }

    let revived = TaskStore::new(Arc::new(JsonFileKv::new(&path)));
    assert_eq!(revived.load_tasks(day).await?, vec![entry]);
    Ok(())
}

#[tokio::test]
async fn app_cold_starts_from_the_file() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("state.json");
    let day = date(2025, 3, 10);

    {
        let app = App::load(Arc::new(JsonFileKv::new(&path))).await?;
        app.queue
            .add_task(focuspresso::NewTask::new("first", at(day, 9, 0)))
            .await?;
        let (completed, report) = app.complete_current_task().await?.unwrap();
        assert_eq!(completed.title, "first");
        assert_eq!(report.experience, 10);
    }

    let app = App::load(Arc::new(JsonFileKv::new(&path))).await?;
    assert_eq!(app.progression.character().await.experience, 10);
    let snapshot = app.queue.snapshot().await;
    assert_eq!(snapshot.cursor, 1);
    assert_eq!(snapshot.completed.len(), 1);
    Ok(())
}
