// Content-addressed cache for generated slide images

use std::fs;
use std::path::PathBuf;

use notebook_deck_core::{decode_data_url, encode_data_url};
use sha2::{Digest, Sha256};

/// Cache key: hex sha256 of `model|aspect_ratio|prompt`
pub fn cache_key(model: &str, aspect_ratio: &str, prompt: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(format!("{}|{}|{}", model, aspect_ratio, prompt).as_bytes());
    hex::encode(hasher.finalize())
}

/// PNG files under `<dir>/<key>.png`
#[derive(Debug, Clone)]
pub struct ImageCache {
    dir: PathBuf,
}

impl ImageCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.png", key))
    }

    /// Cached image as a PNG data URL
    pub fn read(&self, key: &str) -> Option<String> {
        let bytes = fs::read(self.path_for(key)).ok()?;
        if bytes.is_empty() {
            return None;
        }
        Some(encode_data_url("image/png", &bytes))
    }

    /// Store the payload of `data_url`. Failures are logged and reported as false;
    /// a cache miss later just regenerates.
    pub fn write(&self, key: &str, data_url: &str) -> bool {
        let Some((_, bytes)) = decode_data_url(data_url) else {
            tracing::warn!("Not caching image {}: not a base64 data URL", key);
            return false;
        };

        let result = fs::create_dir_all(&self.dir).and_then(|_| {
            let path = self.path_for(key);
            let tmp = path.with_extension("png.tmp");
            fs::write(&tmp, &bytes)?;
            fs::rename(&tmp, &path)
        });

        match result {
            Ok(()) => {
                tracing::debug!("Cached image {} ({} bytes)", key, bytes.len());
                true
            }
            Err(e) => {
                tracing::warn!("Failed to cache image {}: {}", key, e);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_is_stable_and_distinct() {
        let a = cache_key("m", "16:9", "forest");
        assert_eq!(a, cache_key("m", "16:9", "forest"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, cache_key("m", "1:1", "forest"));
        assert_ne!(a, cache_key("other", "16:9", "forest"));
        assert_ne!(a, cache_key("m", "16:9", "forest "));
    }

    #[test]
    fn test_miss_then_hit() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path().join("ppt_images"));
        let key = cache_key("m", "16:9", "forest");

        assert!(cache.read(&key).is_none());

        let url = encode_data_url("image/png", &[1, 2, 3, 4]);
        assert!(cache.write(&key, &url));
        assert!(cache.path_for(&key).exists());
        assert_eq!(cache.read(&key).unwrap(), url);
    }

    #[test]
    fn test_write_rejects_non_data_url() {
        let dir = tempfile::tempdir().unwrap();
        let cache = ImageCache::new(dir.path());
        assert!(!cache.write("k", "https://example.com/a.png"));
        assert!(cache.read("k").is_none());
    }
}
