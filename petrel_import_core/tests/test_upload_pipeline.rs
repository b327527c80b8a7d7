use std::time::Duration;

use common::{new_env, PEOPLE_CSV};
use futures::TryStreamExt;
use object_store::path::Path;
use petrel_import_core::ImportError;
use petrel_metadata_core::{DatasetCatalog, UsageStore};
use petrel_queue::UploadJobQueue;
use petrel_resources::{
    TenantId, UploadFileInput, UploadJobFile, UploadJobMessage, UploadStatus,
    MAX_FILE_SIZE_BYTES,
};
use tokio_util::sync::CancellationToken;

mod common;

fn file_input(file_name: &str, size_bytes: i64) -> UploadFileInput {
    UploadFileInput {
        file_name: file_name.to_string(),
        content_type: "application/octet-stream".to_string(),
        size_bytes,
    }
}

fn tenant() -> TenantId {
    TenantId::new_unchecked("t1")
}

#[tokio::test]
async fn test_presign_validation_boundaries() {
    let env = new_env();

    let err = env
        .service
        .create_presign(&tenant(), vec![file_input("data.csv", MAX_FILE_SIZE_BYTES + 1)])
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation { .. }));

    let err = env
        .service
        .create_presign(&tenant(), vec![file_input("tool.exe", 1024)])
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::Validation { .. }));

    // A one-byte csv at the lower boundary is accepted.
    let result = env
        .service
        .create_presign(&tenant(), vec![file_input("data.csv", 1)])
        .await
        .unwrap();
    assert!(!result.upload_id.is_empty());
    assert_eq!(result.files.len(), 1);
    assert!(!result.files[0].presigned_url.is_empty());
}

#[tokio::test]
async fn test_presign_creates_records_with_namespaced_keys() {
    let env = new_env();

    let result = env
        .service
        .create_presign(
            &tenant(),
            vec![file_input("orders.csv", 1024), file_input("users.json", 2048)],
        )
        .await
        .unwrap();

    use petrel_metadata_core::UploadStore;
    let upload = env
        .upload_store
        .find_by_id(&tenant(), &result.upload_id)
        .await
        .unwrap();
    assert_eq!(upload.status, UploadStatus::Presigned);

    let files = env
        .upload_store
        .find_files_by_upload_id(&tenant(), &result.upload_id)
        .await
        .unwrap();
    assert_eq!(files.len(), 2);
    for file in &files {
        assert!(file.object_key.starts_with("uploads/t1/"));
    }
    assert!(files[0].object_key.ends_with(".csv"));
    assert!(files[1].object_key.ends_with(".json"));
}

#[tokio::test]
async fn test_complete_enqueues_job_and_rejects_second_call() {
    let env = new_env();

    let presign = env
        .service
        .create_presign(&tenant(), vec![file_input("orders.csv", 1024)])
        .await
        .unwrap();

    let (upload, files) = env
        .service
        .complete(&tenant(), &presign.upload_id)
        .await
        .unwrap();
    assert_eq!(upload.status, UploadStatus::Uploaded);
    assert_eq!(files.len(), 1);

    // The conversion job carries the file references.
    let job = env.job_queue().dequeue().await.unwrap().expect("job enqueued");
    assert_eq!(job.upload_id, presign.upload_id);
    assert_eq!(job.files.len(), 1);
    assert_eq!(job.files[0].file_name, "orders.csv");

    // Completion is not idempotent: a second call is a hard conflict.
    let err = env
        .service
        .complete(&tenant(), &presign.upload_id)
        .await
        .unwrap_err();
    assert!(matches!(err, ImportError::AlreadyComplete { .. }));

    let err = env.service.complete(&tenant(), "missing").await.unwrap_err();
    assert!(matches!(err, ImportError::NotFound { .. }));
}

#[tokio::test]
async fn test_csv_conversion_creates_dataset() {
    let env = new_env();

    let presign = env
        .service
        .create_presign(&tenant(), vec![file_input("people.csv", PEOPLE_CSV.len() as i64)])
        .await
        .unwrap();

    // Simulate the client's direct-to-storage upload.
    env.put_object(&presign.files[0].object_key, PEOPLE_CSV).await;

    env.service.complete(&tenant(), &presign.upload_id).await.unwrap();

    let ct = CancellationToken::new();
    tokio::spawn(env.new_consumer().run(ct.clone()));

    let mut dataset = None;
    for _ in 0..100 {
        if let Ok(found) = env.catalog.get(&tenant(), "people").await {
            dataset = Some(found);
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    ct.cancel();

    let dataset = dataset.expect("dataset registered");
    assert_eq!(dataset.row_count, Some(3));
    assert!(dataset.storage_path.starts_with("imports/t1/dt="));
    assert!(dataset.storage_path.ends_with(".parquet"));

    let schema_json = dataset.schema_json.expect("schema recorded");
    assert!(schema_json.contains("name"));
    assert!(schema_json.contains("age"));

    // The converted file is a readable parquet object with all rows.
    let data = env
        .fs
        .store()
        .get(&Path::from(dataset.storage_path.clone()))
        .await
        .unwrap()
        .bytes()
        .await
        .unwrap();
    let reader = parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder::try_new(data)
        .unwrap()
        .build()
        .unwrap();
    let total_rows: usize = reader.map(|batch| batch.unwrap().num_rows()).sum();
    assert_eq!(total_rows, 3);

    // Usage was metered best-effort.
    let daily = env
        .usage
        .daily(&tenant(), chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(daily.rows_count, 3);
    assert_eq!(daily.uploads_count, 1);
    assert_eq!(daily.storage_bytes, PEOPLE_CSV.len() as i64);
}

#[tokio::test]
async fn test_duplicate_delivery_converts_once() {
    let env = new_env();
    let object_key = "uploads/t1/2026-08-06/f1.csv";
    env.put_object(object_key, PEOPLE_CSV).await;

    let job = UploadJobMessage {
        upload_id: "job-1".to_string(),
        tenant_id: tenant(),
        files: vec![UploadJobFile {
            file_id: "f1".to_string(),
            file_name: "people.csv".to_string(),
            object_key: object_key.to_string(),
            content_type: "text/csv".to_string(),
            size_bytes: PEOPLE_CSV.len() as i64,
        }],
    };

    // The queue is at-least-once: the same message is delivered twice.
    let queue = env.job_queue();
    queue.enqueue(&job).await.unwrap();
    queue.enqueue(&job).await.unwrap();

    let ct = CancellationToken::new();
    tokio::spawn(env.new_consumer().run(ct.clone()));

    for _ in 0..100 {
        if env.catalog.get(&tenant(), "people").await.is_ok() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    // Let the second delivery drain through the consumer.
    tokio::time::sleep(Duration::from_millis(500)).await;
    ct.cancel();

    // Exactly one materialization: one import object, an empty DLQ.
    let store = env.fs.store();
    let imports: Vec<_> = store
        .list(Some(&Path::from("imports")))
        .try_collect()
        .await
        .unwrap();
    assert_eq!(imports.len(), 1);

    let dlq = UploadJobQueue::new(env.queue_store.clone())
        .drain_dlq()
        .await
        .unwrap();
    assert!(dlq.is_empty(), "duplicate delivery must not dead-letter: {dlq:?}");
}

#[tokio::test]
async fn test_partial_failure_dead_letters_whole_message() {
    let env = new_env();
    let good_key = "uploads/t1/2026-08-06/good.csv";
    env.put_object(good_key, PEOPLE_CSV).await;

    let job = UploadJobMessage {
        upload_id: "job-2".to_string(),
        tenant_id: tenant(),
        files: vec![
            UploadJobFile {
                file_id: "good".to_string(),
                file_name: "good.csv".to_string(),
                object_key: good_key.to_string(),
                content_type: "text/csv".to_string(),
                size_bytes: PEOPLE_CSV.len() as i64,
            },
            UploadJobFile {
                file_id: "missing".to_string(),
                file_name: "missing.csv".to_string(),
                // Never uploaded; the download will fail.
                object_key: "uploads/t1/2026-08-06/missing.csv".to_string(),
                content_type: "text/csv".to_string(),
                size_bytes: 10,
            },
        ],
    };

    env.job_queue().enqueue(&job).await.unwrap();

    let ct = CancellationToken::new();
    tokio::spawn(env.new_consumer().run(ct.clone()));

    let dlq_queue = UploadJobQueue::new(env.queue_store.clone());
    let mut dlq = Vec::new();
    for _ in 0..100 {
        dlq = dlq_queue.drain_dlq().await.unwrap();
        if !dlq.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    ct.cancel();

    assert_eq!(dlq.len(), 1);
    assert_eq!(dlq[0].message.upload_id, "job-2");
    assert!(dlq[0].reason.contains("object store error"));

    // The file that converted before the failure stays cataloged; no
    // compensating rollback.
    let dataset = env.catalog.get(&tenant(), "good").await.unwrap();
    assert_eq!(dataset.row_count, Some(3));

    // The failure path records no usage.
    let daily = env
        .usage
        .daily(&tenant(), chrono::Utc::now().date_naive())
        .await
        .unwrap();
    assert_eq!(daily.rows_count, 0);
    assert_eq!(daily.uploads_count, 0);
}

#[tokio::test]
async fn test_non_csv_files_are_skipped() {
    let env = new_env();

    let job = UploadJobMessage {
        upload_id: "job-3".to_string(),
        tenant_id: tenant(),
        files: vec![UploadJobFile {
            file_id: "f1".to_string(),
            file_name: "data.json".to_string(),
            object_key: "uploads/t1/2026-08-06/f1.json".to_string(),
            content_type: "application/json".to_string(),
            size_bytes: 64,
        }],
    };

    env.job_queue().enqueue(&job).await.unwrap();

    let ct = CancellationToken::new();
    tokio::spawn(env.new_consumer().run(ct.clone()));

    // The job succeeds without converting anything.
    let mut uploads_count = 0;
    for _ in 0..100 {
        uploads_count = env
            .usage
            .daily(&tenant(), chrono::Utc::now().date_naive())
            .await
            .unwrap()
            .uploads_count;
        if uploads_count > 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    ct.cancel();

    assert_eq!(uploads_count, 1);
    assert!(env.catalog.get(&tenant(), "data").await.is_err());

    let dlq = UploadJobQueue::new(env.queue_store.clone())
        .drain_dlq()
        .await
        .unwrap();
    assert!(dlq.is_empty());
}
