//! S3-backed secondary cache tier. Eviction is delegated to a bucket
//! lifecycle policy configured out-of-band; this backend only moves bytes.

use alloy_primitives::{keccak256, Bytes};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use eigenda_proxy_types::{BackendType, ProxyError};

use crate::Backend;

pub struct S3Backend {
    client: Client,
    bucket: String,
}

impl S3Backend {
    pub fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }

    fn object_key(key: &[u8]) -> String {
        hex::encode(key)
    }
}

#[async_trait]
impl Backend for S3Backend {
    fn backend_type(&self) -> BackendType {
        BackendType::S3
    }

    async fn put(&self, key: &[u8], value: Bytes) -> Result<(), ProxyError> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .body(ByteStream::from(value.to_vec()))
            .send()
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))?;
        Ok(())
    }

    async fn get(&self, key: &[u8]) -> Result<Bytes, ProxyError> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(Self::object_key(key))
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|se| se.is_no_such_key()).unwrap_or(false) {
                    ProxyError::NotFound
                } else {
                    ProxyError::Transient(e.to_string())
                }
            })?;
        let bytes = output
            .body
            .collect()
            .await
            .map_err(|e| ProxyError::Transient(e.to_string()))?
            .into_bytes();
        Ok(Bytes::from(bytes.to_vec()))
    }

    async fn verify(&self, key: &[u8], value: &Bytes) -> Result<(), ProxyError> {
        if keccak256(value).as_slice() == key {
            Ok(())
        } else {
            Err(ProxyError::BadRequest("s3 object does not match keccak256(key)".into()))
        }
    }
}
