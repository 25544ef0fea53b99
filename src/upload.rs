use aws_sdk_s3::primitives::ByteStream;
use tracing::{info, warn};

use crate::output::gzip_bytes;

/// Object key and content type for an export file, before any compression.
pub fn export_object(file_name: &str, gzip: bool) -> (String, &'static str) {
    if gzip {
        (format!("{file_name}.gz"), "application/gzip")
    } else {
        (file_name.to_string(), "text/csv")
    }
}

/// The bucket an export goes to, if any. `gzip` only compresses the S3
/// object, so asking for it without a bucket is reported and ignored.
pub fn upload_target(bucket: Option<String>, gzip: bool) -> Option<String> {
    if gzip && bucket.is_none() {
        warn!("--gzip has no effect without an S3 bucket; the export stays plain CSV");
    }
    bucket
}

/// Uploads an export CSV to an S3 bucket, optionally gzip-compressing it first.
/// Returns the object key written.
#[tracing::instrument(skip(client, body), fields(bytes = body.len()))]
pub async fn upload_export(
    client: &aws_sdk_s3::Client,
    bucket: &str,
    file_name: &str,
    body: Vec<u8>,
    gzip: bool,
) -> anyhow::Result<String> {
    let (key, content_type) = export_object(file_name, gzip);
    let body = if gzip { gzip_bytes(&body)? } else { body };

    client
        .put_object()
        .bucket(bucket)
        .key(&key)
        .body(ByteStream::from(body))
        .content_type(content_type)
        .send()
        .await?;

    info!(bucket, key = %key, "Export uploaded to S3");
    Ok(key)
}
