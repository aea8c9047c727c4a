use dqw_tracker::models::{Collectible, HistoryEntry, HistoryStatus, Priority, Task};
use dqw_tracker::storage::{FileStore, Storage};
use chrono::NaiveDate;

#[tokio::test]
async fn tables_survive_a_restart() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("nested").join("data");

    let storage = Storage::File(FileStore::new(&data_dir));
    let kokoro = vec![
        Collectible::new("キラーマジンガ", Priority::High, 2, 1),
        Collectible::new("ラプソーン, 覚醒", Priority::Low, 1, 1),
    ];
    let history = vec![HistoryEntry {
        date: NaiveDate::from_ymd_opt(2026, 4, 2).unwrap(),
        task_name: "walk".into(),
        status: HistoryStatus::Done,
    }];
    storage.save(&kokoro).await.unwrap();
    storage.save(&history).await.unwrap();

    let reopened = Storage::File(FileStore::new(&data_dir));
    assert_eq!(reopened.load(Vec::<Collectible>::new()).await, kokoro);
    assert_eq!(reopened.load(Vec::<HistoryEntry>::new()).await, history);
}

#[tokio::test]
async fn save_overwrites_the_whole_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let storage = Storage::File(store.clone());

    storage
        .save(&[Task::new("a"), Task::new("b"), Task::new("c")])
        .await
        .unwrap();
    storage.save(&[Task::new("b")]).await.unwrap();

    let text = std::fs::read_to_string(store.path_for("tasks")).unwrap();
    assert_eq!(text, "name,done\nb,false\n");
}

#[tokio::test]
async fn missing_or_unreadable_files_fall_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    let storage = Storage::File(store.clone());

    assert_eq!(storage.load(vec![Task::new("seed")]).await, vec![Task::new("seed")]);

    std::fs::write(store.path_for("kokoro"), "name,priority,target_count,held_count,completed\nA,high,lots,0,false\n").unwrap();
    let fallback = vec![Collectible::imported("seed")];
    assert_eq!(storage.load(fallback.clone()).await, fallback);
}

#[tokio::test]
async fn header_only_file_is_an_empty_table() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.path_for("tasks"), "name,done\n").unwrap();

    let storage = Storage::File(store);
    assert!(storage.load(vec![Task::new("seed")]).await.is_empty());
}
