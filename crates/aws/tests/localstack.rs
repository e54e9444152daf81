//! End-to-end tests against a running `LocalStack` container.
//!
//! Run with `docker run -p 4566:4566 localstack/localstack` and
//! `cargo test -p connector-aws --features integration`.
#![cfg(feature = "integration")]

use std::time::Duration;

use connector_aws::config::LOCALSTACK_ENDPOINT;
use connector_aws::{ConsumerConfig, S3Config, S3Store, SqsConfig, SqsQueue};
use tokio_util::sync::CancellationToken;

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", uuid::Uuid::new_v4().simple())
}

#[tokio::test]
async fn s3_bucket_and_file_lifecycle() {
    let bucket = unique("connector-it");
    let config = S3Config::local("us-east-1", &bucket).with_credentials("test", "test");
    let store = S3Store::new(config).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let local = dir.path().join("local.txt");
    let downloaded = dir.path().join("downloaded.txt");
    tokio::fs::write(&local, b"hello from connector").await.unwrap();

    store.create_bucket().await.unwrap();
    store.upload_file("greeting.txt", &local).await.unwrap();
    store.download_file("greeting.txt", &downloaded).await.unwrap();

    let content = tokio::fs::read(&downloaded).await.unwrap();
    assert_eq!(content, b"hello from connector");

    store.delete_file("greeting.txt").await.unwrap();
    store.delete_bucket().await.unwrap();
}

#[tokio::test]
async fn sqs_round_trip_through_consumer() {
    let sdk = aws_config::from_env()
        .region(aws_config::Region::new("us-east-1"))
        .endpoint_url(LOCALSTACK_ENDPOINT)
        .credentials_provider(aws_credential_types::Credentials::new(
            "test", "test", None, None, "it",
        ))
        .load()
        .await;
    let admin = aws_sdk_sqs::Client::new(&sdk);
    let created = admin
        .create_queue()
        .queue_name(unique("connector-it"))
        .send()
        .await
        .unwrap();
    let queue_url = created.queue_url().unwrap().to_owned();

    let queue = SqsQueue::new(
        SqsConfig::new("us-east-1", &queue_url)
            .with_credentials("test", "test")
            .with_endpoint_url(LOCALSTACK_ENDPOINT),
    )
    .await
    .unwrap();

    queue.send_message("{\"id\":42}", "").await.unwrap();

    let cancel = CancellationToken::new();
    let mut consumer = queue
        .consume(
            cancel.clone(),
            ConsumerConfig {
                wait_seconds: 1,
                ..ConsumerConfig::default()
            },
        )
        .unwrap();

    let message = tokio::time::timeout(Duration::from_secs(10), consumer.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(message.body(), Some("{\"id\":42}"));
    queue
        .delete_message(message.receipt_handle().unwrap())
        .await
        .unwrap();

    consumer.shutdown().await.unwrap();
    admin.delete_queue().queue_url(queue_url).send().await.unwrap();
}
