use std::{sync::Arc, time::Duration};

use crate::{
    config::{Config, MetadataBackend},
    engine::StorageEngine,
    storage::api::ContentStore,
};

/// Logs the resource count every `sweep_interval` seconds and sweeps orphaned
/// blobs, as long as metadata is durable. Never returns; abort the task to stop it.
pub async fn housekeeping_loop<C>(config: Arc<Config>, engine: Arc<StorageEngine<C>>)
where
    C: ContentStore + Send + Sync + 'static,
{
    // a memory index starts empty, so every blob already on disk would look orphaned
    let sweep = config.metadata_backend != MetadataBackend::Memory;
    if !sweep {
        tracing::info!("Memory metadata backend, orphan sweep disabled");
    }

    loop {
        let worker = engine.clone();
        let status = tokio::task::spawn_blocking(move || {
            let swept = if sweep { Some(worker.sweep_orphans()) } else { None };
            (swept, worker.len())
        })
        .await;

        match status {
            Ok((swept, resources)) => {
                if let Some(Err(e)) = swept {
                    tracing::warn!(error = %e, "Orphan sweep failed");
                }
                match resources {
                    Ok(resources) => tracing::info!(resources, "Housekeeping status"),
                    Err(e) => tracing::warn!(error = %e, "Failed to count resources"),
                }
            }
            Err(e) => tracing::warn!(error = %e, "Housekeeping task panicked"),
        }

        tokio::time::sleep(Duration::from_secs(config.sweep_interval)).await;
    }
}

#[cfg(test)]
mod housekeeping_tests {
    use super::*;
    use crate::{metadata::MetadataBuilder, util::logging::init_test_logging};
    use std::{fs, io::Cursor};
    use tempfile::{NamedTempFile, TempDir};
    use tokio::time::sleep;

    async fn run_two_iterations(cfg: Arc<Config>, engine: Arc<StorageEngine>) {
        let task = tokio::spawn({
            let cfg = cfg.clone();
            let engine = engine.clone();
            async move { housekeeping_loop(cfg, engine).await }
        });
        sleep(Duration::from_secs(cfg.sweep_interval * 2)).await;
        task.abort();
    }

    #[tokio::test]
    async fn housekeeping_removes_orphans_with_durable_metadata() {
        init_test_logging();
        let dir = TempDir::new().unwrap();
        let db_file = NamedTempFile::new().unwrap();
        let mut cfg = Config::new_test(dir.path());
        cfg.metadata_backend = MetadataBackend::Redb(db_file.path().to_path_buf());
        let cfg = Arc::new(cfg);
        let engine = Arc::new(StorageEngine::open(&cfg).unwrap());

        let kept = engine.create(MetadataBuilder::new(), &mut Cursor::new(b"keep me")).unwrap();
        // a blob with no metadata, as left by a crash mid-create
        fs::write(dir.path().join("orphan-1"), b"lost").unwrap();

        run_two_iterations(cfg, engine.clone()).await;

        assert!(!dir.path().join("orphan-1").exists(), "orphan should be swept");
        assert!(dir.path().join(kept.identifier()).exists(), "live blob should survive");
        assert_eq!(engine.len().unwrap(), 1);
    }

    #[tokio::test]
    async fn housekeeping_leaves_blobs_alone_with_memory_metadata() {
        init_test_logging();
        let dir = TempDir::new().unwrap();
        // written by an earlier run, unknown to a fresh memory index
        fs::write(dir.path().join("earlier-run"), b"still wanted").unwrap();

        let cfg = Arc::new(Config::new_test(dir.path()));
        let engine = Arc::new(StorageEngine::open(&cfg).unwrap());

        run_two_iterations(cfg, engine).await;

        assert!(dir.path().join("earlier-run").exists());
    }
}
