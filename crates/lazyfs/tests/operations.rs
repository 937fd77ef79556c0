//! End-to-end tests for the dispatch policy.
//!
//! Scenarios covered:
//! - terabyte-scale files: attributes and reads at the far end of a
//!   1 TiB file, with nothing materialized
//! - resize across magnitudes, including sizes past 2^40
//! - concurrent creates from many threads, including racing exclusive
//!   creates that must elect a single winner
//! - teardown draining the registry

use std::sync::{Arc, Barrier};
use std::thread;

use lazyfs::content::SENTINEL_BYTE;
use lazyfs::{FsError, LazyFs, ROOT_PATH};

/// One tebibyte, the canonical "larger than any test disk" size.
const ONE_TIB: u64 = 1_099_511_627_776;

#[test]
fn test_uncreated_paths_fail_not_found() {
    let fs = LazyFs::new();
    for path in ["/never", "/made", "/up"] {
        assert!(matches!(fs.getattr(path), Err(FsError::NotFound(_))));
        assert!(matches!(fs.read(path, 0, 16), Err(FsError::NotFound(_))));
    }
}

#[test]
fn test_resize_roundtrip_across_magnitudes() {
    let fs = LazyFs::new();
    fs.create("/f", false).unwrap();

    for size in [0u64, 1, 511, 512, 4096, 1 << 20, 1 << 32, ONE_TIB, 1 << 50] {
        fs.truncate("/f", size).unwrap();
        let attr = fs.getattr("/f").unwrap();
        assert_eq!(attr.size, size);
        assert_eq!(attr.blocks, size / 512);
    }
}

#[test]
fn test_one_tib_scenario() {
    let fs = LazyFs::new();
    fs.create("/big", false).unwrap();
    fs.truncate("/big", ONE_TIB).unwrap();

    assert_eq!(fs.getattr("/big").unwrap().size, ONE_TIB);

    let head = fs.read("/big", 0, 16).unwrap();
    assert_eq!(head, vec![SENTINEL_BYTE; 16]);

    // Last byte of the file: a 4-byte read yields exactly 1 byte.
    let tail = fs.read("/big", ONE_TIB - 1, 4).unwrap();
    assert_eq!(tail, vec![SENTINEL_BYTE; 1]);

    // At the end of the file: nothing left to read.
    assert!(fs.read("/big", ONE_TIB, 4).unwrap().is_empty());
}

#[test]
fn test_create_listing_and_removal() {
    let fs = LazyFs::new();
    fs.create("/data.bin", false).unwrap();
    fs.create("/scratch", false).unwrap();

    let mut entries = fs.readdir(ROOT_PATH).unwrap();
    entries.sort();
    assert_eq!(entries, vec![".", "..", "data.bin", "scratch"]);

    fs.remove("/scratch").unwrap();
    let mut entries = fs.readdir(ROOT_PATH).unwrap();
    entries.sort();
    assert_eq!(entries, vec![".", "..", "data.bin"]);

    // Removing again reports the entry as gone.
    assert!(matches!(fs.remove("/scratch"), Err(FsError::NotFound(_))));
}

#[test]
fn test_listing_has_no_duplicates() {
    let fs = LazyFs::new();
    fs.create("/f", false).unwrap();
    // Re-creating must not yield a second directory entry.
    fs.create("/f", false).unwrap();

    let entries = fs.readdir(ROOT_PATH).unwrap();
    assert_eq!(entries.iter().filter(|e| *e == "f").count(), 1);
}

#[test]
fn test_concurrent_creates_lose_nothing() {
    let fs = Arc::new(LazyFs::new());
    let threads: usize = 16;

    let handles: Vec<_> = (0..threads)
        .map(|i| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                fs.create(&format!("/f{}", i), false).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(fs.registry().len(), threads);
    for i in 0..threads {
        assert_eq!(fs.getattr(&format!("/f{}", i)).unwrap().size, 0);
    }
}

#[test]
fn test_concurrent_exclusive_creates_single_winner() {
    let threads: usize = 8;

    // Repeat to give the scheduler chances to interleave the racing
    // creates. Exactly one thread may win each round.
    for _ in 0..200 {
        let fs = Arc::new(LazyFs::new());
        let barrier = Arc::new(Barrier::new(threads));

        let handles: Vec<_> = (0..threads)
            .map(|_| {
                let fs = Arc::clone(&fs);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    fs.create("/x", true)
                })
            })
            .collect();

        let mut wins = 0;
        for handle in handles {
            match handle.join().unwrap() {
                Ok(()) => wins += 1,
                Err(FsError::AlreadyExists(_)) => {}
                Err(err) => panic!("unexpected error: {err}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(fs.registry().len(), 1);
    }
}

#[test]
fn test_concurrent_resizes_on_one_file() {
    let fs = Arc::new(LazyFs::new());
    fs.create("/shared", false).unwrap();

    let sizes: Vec<u64> = (1..=8).map(|i| i * 1000).collect();
    let handles: Vec<_> = sizes
        .iter()
        .map(|&size| {
            let fs = Arc::clone(&fs);
            thread::spawn(move || {
                fs.truncate("/shared", size).unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // One of the writers won; the entry is intact either way.
    let final_size = fs.getattr("/shared").unwrap().size;
    assert!(sizes.contains(&final_size));
}

#[test]
fn test_teardown_leaves_empty_registry() {
    let fs = LazyFs::new();
    fs.create("/a", false).unwrap();
    fs.create("/b", false).unwrap();
    fs.truncate("/b", ONE_TIB).unwrap();

    fs.destroy();

    assert!(fs.registry().list().is_empty());
    let entries = fs.readdir(ROOT_PATH).unwrap();
    assert_eq!(entries, vec![".", ".."]);
}
