//! Content-invalidated load cache. The source table is treated as static
//! per session, so cached parses are reused until the file bytes actually
//! change — never on a timer.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use sha2::{Digest, Sha256};
use tracing::{debug, info};

use rewards_core::types::RedemptionRecord;
use rewards_core::RewardsResult;

use crate::loader::RecordLoader;

struct CacheEntry {
    digest: String,
    records: Arc<Vec<RedemptionRecord>>,
}

/// Wraps a [`RecordLoader`] with a per-path cache keyed by content digest.
pub struct CachedLoader {
    loader: RecordLoader,
    entries: DashMap<PathBuf, CacheEntry>,
}

impl CachedLoader {
    pub fn new(loader: RecordLoader) -> Self {
        Self {
            loader,
            entries: DashMap::new(),
        }
    }

    /// Load a file, reusing the previous parse when its bytes are unchanged.
    pub fn load(&self, path: impl AsRef<Path>) -> RewardsResult<Arc<Vec<RedemptionRecord>>> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let digest = hex::encode(Sha256::digest(&bytes));

        if let Some(entry) = self.entries.get(path) {
            if entry.digest == digest {
                debug!(path = %path.display(), "load cache hit");
                return Ok(entry.records.clone());
            }
        }

        let records = Arc::new(self.loader.load_reader(bytes.as_slice())?);
        info!(
            path = %path.display(),
            rows = records.len(),
            "parsed and cached redemption records"
        );
        self.entries.insert(
            path.to_path_buf(),
            CacheEntry {
                digest,
                records: records.clone(),
            },
        );
        Ok(records)
    }

    /// Drop the cached parse for one path.
    pub fn invalidate(&self, path: impl AsRef<Path>) {
        self.entries.remove(path.as_ref());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for CachedLoader {
    fn default() -> Self {
        Self::new(RecordLoader::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const CSV_ONE: &str = "Member_Name_Surname_Per_Redemption,Brand,Reward_Received,\
Date_of_Redemption,Redemptions_by_User,Satisfaction_Rating_on_Reward,\
Reward_Value_Amount_in_Dollars,Point_Value_per_Redemption,Cost_Per_Redemption_in_Dollars\n\
Ada Byrne,Acme,Gift Card,2024-03-15,7,4.5,25.0,500,3.1\n";

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("rewards-cache-{}-{}", std::process::id(), name));
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_unchanged_file_reuses_parse() {
        let path = temp_file("reuse.csv", CSV_ONE);
        let cache = CachedLoader::default();

        let first = cache.load(&path).unwrap();
        let second = cache.load(&path).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_changed_content_invalidates() {
        let path = temp_file("changed.csv", CSV_ONE);
        let cache = CachedLoader::default();

        let first = cache.load(&path).unwrap();
        assert_eq!(first.len(), 1);

        let mut extended = CSV_ONE.to_string();
        extended.push_str("Raj Patel,Globex,Coffee Mug,2024-04-01,2,3.0,10.0,200,1.2\n");
        std::fs::write(&path, extended).unwrap();

        let second = cache.load(&path).unwrap();
        assert_eq!(second.len(), 2);
        assert!(!Arc::ptr_eq(&first, &second));

        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_explicit_invalidate() {
        let path = temp_file("invalidate.csv", CSV_ONE);
        let cache = CachedLoader::default();

        cache.load(&path).unwrap();
        assert_eq!(cache.len(), 1);
        cache.invalidate(&path);
        assert!(cache.is_empty());

        std::fs::remove_file(&path).unwrap();
    }
}
