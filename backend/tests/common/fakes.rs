use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use gallery_backend::media_storage::{BucketError, BucketResult, MediaStore, PresignedUrl};
use image_storage::image_record::{
    ImageRecord, ImageRecordStore, ImageStorageError, ImageStorageResult,
};

pub const FAKE_BUCKET_URL: &str = "https://fake-bucket.s3.ap-south-1.amazonaws.com";

/// In-memory object store that signs nothing and counts calls
#[derive(Default)]
pub struct FakeMediaStore {
    fail_presign: bool,
    presign_calls: AtomicUsize,
    issued: Mutex<Vec<(String, String)>>,
}

impl FakeMediaStore {
    pub fn failing() -> Self {
        Self {
            fail_presign: true,
            ..Self::default()
        }
    }

    pub fn presign_calls(&self) -> usize {
        self.presign_calls.load(Ordering::SeqCst)
    }

    /// `(key, content_type)` of every URL handed out
    pub fn issued(&self) -> Vec<(String, String)> {
        self.issued.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaStore for FakeMediaStore {
    async fn presign_put(&self, key: &str, content_type: &str) -> BucketResult<PresignedUrl> {
        self.presign_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_presign {
            return Err(BucketError::PresignError("simulated signing failure".to_string()));
        }

        self.issued
            .lock()
            .unwrap()
            .push((key.to_string(), content_type.to_string()));

        Ok(PresignedUrl {
            url: format!("{FAKE_BUCKET_URL}/{key}?X-Amz-Expires=300&X-Amz-Signature=fake"),
            expires_at: Utc::now() + Duration::from_secs(300),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{FAKE_BUCKET_URL}/{key}")
    }
}

/// In-memory metadata store that keeps insertion order and counts calls
#[derive(Default)]
pub struct MemoryImageStore {
    fail_insert: bool,
    id_taken: bool,
    fail_scan: bool,
    records: Mutex<Vec<ImageRecord>>,
    insert_calls: AtomicUsize,
    scan_calls: AtomicUsize,
}

impl MemoryImageStore {
    pub fn with_records(records: Vec<ImageRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            ..Self::default()
        }
    }

    pub fn failing_insert() -> Self {
        Self {
            fail_insert: true,
            ..Self::default()
        }
    }

    /// Store that reports every new id as already present
    pub fn with_taken_ids() -> Self {
        Self {
            id_taken: true,
            ..Self::default()
        }
    }

    pub fn failing_scan() -> Self {
        Self {
            fail_scan: true,
            ..Self::default()
        }
    }

    pub fn records(&self) -> Vec<ImageRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub fn scan_calls(&self) -> usize {
        self.scan_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageRecordStore for MemoryImageStore {
    async fn insert(&self, record: &ImageRecord) -> ImageStorageResult<()> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert {
            return Err(ImageStorageError::SerializationError(
                "simulated write failure".to_string(),
            ));
        }

        let mut records = self.records.lock().unwrap();
        if self.id_taken || records.iter().any(|r| r.image_id == record.image_id) {
            return Err(ImageStorageError::ImageRecordExists(record.image_id.clone()));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn scan_all(&self) -> ImageStorageResult<Vec<ImageRecord>> {
        self.scan_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_scan {
            return Err(ImageStorageError::SerializationError(
                "simulated read failure".to_string(),
            ));
        }

        Ok(self.records())
    }
}
