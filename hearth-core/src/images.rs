use crate::{CoreError, CoreResult};
use async_trait::async_trait;

/// Contract over the third-party image host: bytes in, public URL out.
#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, bytes: &[u8]) -> CoreResult<String>;
}

/// Result of uploading a batch of photos. URLs uploaded before a failure are
/// kept; a failure mid-batch must not lose them.
#[derive(Debug)]
pub struct BatchUploadOutcome {
    pub urls: Vec<String>,
    /// Index of the image that failed and the error, if any.
    pub failure: Option<(usize, CoreError)>,
}

impl BatchUploadOutcome {
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Upload images in order, stopping at the first failure.
pub async fn upload_all(host: &dyn ImageHost, images: &[Vec<u8>]) -> BatchUploadOutcome {
    let mut urls = Vec::with_capacity(images.len());

    for (index, bytes) in images.iter().enumerate() {
        match host.upload(bytes).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::warn!("Image upload failed at index {}: {}", index, e);
                return BatchUploadOutcome {
                    urls,
                    failure: Some((index, e)),
                };
            }
        }
    }

    BatchUploadOutcome { urls, failure: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FlakyHost {
        fail_at: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ImageHost for FlakyHost {
        async fn upload(&self, _bytes: &[u8]) -> CoreResult<String> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n == self.fail_at {
                Err(CoreError::TransientNetwork("upload failed".into()))
            } else {
                Ok(format!("https://img.example/{}", n))
            }
        }
    }

    #[tokio::test]
    async fn test_batch_keeps_earlier_urls_on_failure() {
        let host = FlakyHost {
            fail_at: 2,
            calls: AtomicUsize::new(0),
        };
        let images = vec![vec![1u8], vec![2], vec![3], vec![4]];

        let outcome = upload_all(&host, &images).await;
        assert_eq!(outcome.urls.len(), 2);
        assert_eq!(outcome.failure.as_ref().unwrap().0, 2);
        assert!(!outcome.is_complete());
    }

    #[tokio::test]
    async fn test_batch_complete() {
        let host = FlakyHost {
            fail_at: usize::MAX,
            calls: AtomicUsize::new(0),
        };
        let outcome = upload_all(&host, &[vec![1u8], vec![2]]).await;
        assert_eq!(outcome.urls.len(), 2);
        assert!(outcome.is_complete());
    }
}
