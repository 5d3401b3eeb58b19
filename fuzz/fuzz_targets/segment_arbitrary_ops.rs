#![no_main]

use std::collections::HashMap;
use std::time::Duration;

use libfuzzer_sys::fuzz_target;
use slabcache::error::CacheError;
use slabcache::segment::{Segment, CHUNK_SIZE};

// Fuzz arbitrary operation sequences against a small Segment, checking it
// against a model map keyed by hash:
// - get returns what the model predicts (value, miss, or mismatch)
// - len always equals the model size
// - CacheFull appears only when the model holds `capacity` live entries
fuzz_target!(|data: &[u8]| {
    let mut segment = Segment::new(8 * CHUNK_SIZE);
    let capacity = segment.capacity();
    let mut model: HashMap<u64, (String, Vec<u8>)> = HashMap::new();

    for op in data.chunks_exact(3) {
        let hash = u64::from(op[1] % 16);
        let key = format!("key-{}", op[2] % 8);
        let value = vec![op[2]; usize::from(op[2] % 32)];

        match op[0] % 4 {
            0 => match segment.set(&key, hash, &value, None) {
                Ok(()) => {
                    model.insert(hash, (key, value));
                }
                Err(CacheError::CacheFull) => {
                    assert_eq!(model.len(), capacity);
                    assert!(!model.contains_key(&hash));
                }
                Err(err) => panic!("unexpected set error: {err}"),
            },
            1 => match model.get(&hash) {
                Some((stored_key, stored_value)) if *stored_key == key => {
                    assert_eq!(segment.get(&key, hash).unwrap(), *stored_value);
                }
                Some(_) => {
                    assert_eq!(segment.get(&key, hash), Err(CacheError::KeyMismatch));
                }
                None => {
                    assert_eq!(segment.get(&key, hash), Err(CacheError::EntryNotFound));
                }
            },
            2 => {
                segment.del(hash);
                model.remove(&hash);
            }
            3 => {
                // No entry carries a TTL here, so a sweep removes nothing.
                assert_eq!(segment.clean(i64::MAX), 0);
            }
            _ => unreachable!(),
        }

        assert_eq!(segment.len(), model.len());
    }

    // Expiring entries written with a zero TTL are reclaimable.
    let mut expiring = Segment::new(2 * CHUNK_SIZE);
    expiring
        .set("short", 1, b"v", Some(Duration::from_secs(0)))
        .unwrap();
    assert_eq!(expiring.clean(i64::MAX), 1);
    assert_eq!(expiring.len(), 0);
});
