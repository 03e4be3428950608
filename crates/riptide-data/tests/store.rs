use anyhow::Result;
use riptide_core::{DownloadState, InfoHash};
use riptide_data::{DownloadStore, NewDownload, ProgressUpdate};

fn sample_download(hash: &str, name: &str) -> NewDownload {
    NewDownload {
        info_hash: InfoHash::new(hash),
        name: name.to_owned(),
        magnet: format!("magnet:?xt=urn:btih:{hash}&dn={name}"),
        provider: "YTS".to_owned(),
        total_bytes: 1_000,
        download_path: format!("/downloads/{name}"),
        selected_files: vec![0, 2],
    }
}

#[tokio::test]
async fn insert_and_fetch_round_trips() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let hash = InfoHash::new("aa11aa11aa11aa11aa11aa11aa11aa11aa11aa11");
    let id = store
        .insert_download(&sample_download(hash.as_str(), "movie"))
        .await?;

    let record = store.get_by_hash(&hash).await?.expect("record exists");
    assert_eq!(record.id, id);
    assert_eq!(record.status, DownloadState::Pending);
    assert_eq!(record.total_bytes, 1_000);
    assert_eq!(record.selected_files, vec![0, 2]);
    assert!(record.completed_at.is_none());

    assert!(
        store
            .get_by_hash(&InfoHash::new("ffffffffffffffffffffffffffffffffffffffff"))
            .await?
            .is_none()
    );
    Ok(())
}

#[tokio::test]
async fn reinserting_an_identity_revives_the_row() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let hash = "bb22bb22bb22bb22bb22bb22bb22bb22bb22bb22";
    let first = store.insert_download(&sample_download(hash, "movie")).await?;
    store
        .update_progress(
            first,
            &ProgressUpdate {
                status: DownloadState::Downloading,
                progress: 40.0,
                downloaded_bytes: 400,
                download_bps: 100,
                upload_bps: 10,
                peers_connected: 3,
                seeders: 9,
                leechers: 2,
            },
        )
        .await?;

    let second = store
        .insert_download(&sample_download(hash, "movie-restarted"))
        .await?;
    assert_eq!(first, second, "upsert must keep the original row id");

    let record = store
        .get_by_hash(&InfoHash::new(hash))
        .await?
        .expect("record exists");
    assert_eq!(record.name, "movie-restarted");
    assert_eq!(record.status, DownloadState::Pending);
    assert_eq!(record.downloaded_bytes, 0);
    Ok(())
}

#[tokio::test]
async fn progress_updates_overwrite_counters() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let hash = InfoHash::new("cc33cc33cc33cc33cc33cc33cc33cc33cc33cc33");
    let id = store
        .insert_download(&sample_download(hash.as_str(), "show"))
        .await?;

    store
        .update_progress(
            id,
            &ProgressUpdate {
                status: DownloadState::Downloading,
                progress: 40.0,
                downloaded_bytes: 400,
                download_bps: 2_048,
                upload_bps: 512,
                peers_connected: 7,
                seeders: 21,
                leechers: 4,
            },
        )
        .await?;

    let record = store.get_by_hash(&hash).await?.expect("record exists");
    assert_eq!(record.status, DownloadState::Downloading);
    assert!((record.progress - 40.0).abs() < f64::EPSILON);
    assert_eq!(record.downloaded_bytes, 400);
    assert_eq!(record.peers_connected, 7);
    assert!(record.updated_at >= record.created_at);
    Ok(())
}

#[tokio::test]
async fn completion_flips_status_and_appends_history() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let hash = InfoHash::new("dd44dd44dd44dd44dd44dd44dd44dd44dd44dd44");
    let id = store
        .insert_download(&sample_download(hash.as_str(), "album"))
        .await?;

    store.mark_completed(id, 12).await?;

    let record = store.get_by_hash(&hash).await?.expect("record exists");
    assert_eq!(record.status, DownloadState::Completed);
    assert!((record.progress - 100.0).abs() < f64::EPSILON);
    assert!(record.completed_at.is_some());

    let history = store.history(10).await?;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].info_hash, hash);
    assert_eq!(history[0].file_count, 12);

    // Completed records no longer count as unfinished.
    assert!(store.get_unfinished().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn unfinished_filter_spans_pending_downloading_paused() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let pending = store
        .insert_download(&sample_download(
            "1111111111111111111111111111111111111111",
            "one",
        ))
        .await?;
    let downloading = store
        .insert_download(&sample_download(
            "2222222222222222222222222222222222222222",
            "two",
        ))
        .await?;
    let paused = store
        .insert_download(&sample_download(
            "3333333333333333333333333333333333333333",
            "three",
        ))
        .await?;
    let completed = store
        .insert_download(&sample_download(
            "4444444444444444444444444444444444444444",
            "four",
        ))
        .await?;

    store
        .update_status(downloading, DownloadState::Downloading)
        .await?;
    store.update_status(paused, DownloadState::Paused).await?;
    store.mark_completed(completed, 1).await?;

    let unfinished = store.get_unfinished().await?;
    let ids: Vec<_> = unfinished.iter().map(|record| record.id).collect();
    assert_eq!(unfinished.len(), 3);
    assert!(ids.contains(&pending));
    assert!(ids.contains(&downloading));
    assert!(ids.contains(&paused));
    Ok(())
}

#[tokio::test]
async fn deleting_a_download_removes_the_row() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    let hash = InfoHash::new("ee55ee55ee55ee55ee55ee55ee55ee55ee55ee55");
    let id = store
        .insert_download(&sample_download(hash.as_str(), "clip"))
        .await?;

    store.delete_download(id).await?;
    assert!(store.get_by_hash(&hash).await?.is_none());
    Ok(())
}

#[tokio::test]
async fn settings_upsert_and_read_back() -> Result<()> {
    let store = DownloadStore::connect_in_memory().await?;
    assert!(store.get_setting("download_dir").await?.is_none());

    store.set_setting("download_dir", "/media/downloads").await?;
    store.set_setting("download_dir", "/srv/media").await?;

    assert_eq!(
        store.get_setting("download_dir").await?.as_deref(),
        Some("/srv/media")
    );
    Ok(())
}
