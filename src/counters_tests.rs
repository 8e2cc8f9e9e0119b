//! Unit tests for the hit-counter cache.

use super::*;
use std::sync::Arc;
use std::thread;

const DAY: i64 = 20_000;

fn cache() -> (tempfile::TempDir, CounterCache) {
    let tmp = tempfile::tempdir().unwrap();
    let cache = CounterCache::new(tmp.path().join("cache"));
    (tmp, cache)
}

// ─── Paths ──────────────────────────────────────────────────────────

#[test]
fn test_counter_path_layout() {
    let cache = CounterCache::new("/var/cache/gitbrowse");
    assert_eq!(
        cache.counter_path("/srv/git/linux/").unwrap(),
        PathBuf::from("/var/cache/gitbrowse/linux/counters-linux")
    );
    assert_eq!(
        cache.counter_path("tools.git").unwrap(),
        PathBuf::from("/var/cache/gitbrowse/tools.git/counters-tools")
    );
}

#[test]
fn test_counter_path_custom_prefix() {
    let cache = CounterCache::new("/c").with_prefix("views");
    assert_eq!(cache.counter_path("p").unwrap(), PathBuf::from("/c/p/views-p"));
}

#[test]
fn test_counter_path_rejects_empty_name() {
    let cache = CounterCache::new("/c");
    assert!(cache.counter_path("").is_err());
    assert!(cache.counter_path("/").is_err());
    assert!(cache.counter_path("..").is_err());
}

// ─── stats ──────────────────────────────────────────────────────────

#[test]
fn test_first_call_creates_file_and_directories() {
    let (_tmp, cache) = cache();
    let stats = cache.stats_on_day("proj", false, DAY).unwrap();
    assert_eq!(stats, CounterStats { today: 0, total: 0 });

    let path = cache.counter_path("proj").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), format!("{} 0 0\n", DAY));
}

#[test]
fn test_increments_same_day() {
    let (_tmp, cache) = cache();
    for _ in 0..5 {
        cache.stats_on_day("proj", true, DAY).unwrap();
    }
    let stats = cache.stats_on_day("proj", false, DAY).unwrap();
    assert_eq!(stats, CounterStats { today: 5, total: 5 });
}

#[test]
fn test_day_rollover_resets_today_only() {
    let (_tmp, cache) = cache();
    for _ in 0..3 {
        cache.stats_on_day("proj", true, DAY).unwrap();
    }
    let stats = cache.stats_on_day("proj", true, DAY + 1).unwrap();
    assert_eq!(stats, CounterStats { today: 1, total: 4 });
}

#[test]
fn test_read_without_increment_persists_rollover() {
    let (_tmp, cache) = cache();
    cache.stats_on_day("proj", true, DAY).unwrap();
    let stats = cache.stats_on_day("proj", false, DAY + 2).unwrap();
    assert_eq!(stats, CounterStats { today: 0, total: 1 });

    let path = cache.counter_path("proj").unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), format!("{} 0 1\n", DAY + 2));
}

#[test]
fn test_corrupt_file_recovers_as_fresh() {
    let (_tmp, cache) = cache();
    let path = cache.counter_path("proj").unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, "garbage here\n").unwrap();

    let stats = cache.stats_on_day("proj", true, DAY).unwrap();
    assert_eq!(stats, CounterStats { today: 1, total: 1 });
    assert_eq!(fs::read_to_string(path).unwrap(), format!("{} 1 1\n", DAY));
}

#[test]
fn test_shorter_content_is_fully_rewritten() {
    let (_tmp, cache) = cache();
    let path = cache.counter_path("proj").unwrap();
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, format!("{} 123456 9999999\n", DAY - 1)).unwrap();

    cache.stats_on_day("proj", false, DAY).unwrap();
    assert_eq!(fs::read_to_string(path).unwrap(), format!("{} 0 9999999\n", DAY));
}

#[test]
fn test_repositories_are_independent() {
    let (_tmp, cache) = cache();
    cache.stats_on_day("a", true, DAY).unwrap();
    cache.stats_on_day("a", true, DAY).unwrap();
    let b = cache.stats_on_day("b", true, DAY).unwrap();
    assert_eq!(b, CounterStats { today: 1, total: 1 });
}

#[test]
fn test_concurrent_increments_are_not_lost() {
    let (_tmp, cache) = cache();
    let cache = Arc::new(cache);
    let threads = 8;
    let per_thread = 25;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for _ in 0..per_thread {
                    cache.stats_on_day("busy", true, DAY).unwrap();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let stats = cache.stats_on_day("busy", false, DAY).unwrap();
    let expected = (threads * per_thread) as u64;
    assert_eq!(stats, CounterStats { today: expected, total: expected });
}

#[test]
fn test_stats_uses_current_day() {
    let (_tmp, cache) = cache();
    let stats = cache.stats("proj", true).unwrap();
    assert_eq!(stats, CounterStats { today: 1, total: 1 });
    let content = fs::read_to_string(cache.counter_path("proj").unwrap()).unwrap();
    let state = CounterState::parse(&content).unwrap();
    assert_eq!(state.day, days_since_epoch(unix_now()));
}

// ─── CounterState ───────────────────────────────────────────────────

#[test]
fn test_state_parse() {
    assert_eq!(
        CounterState::parse("19000 3 42\n"),
        Some(CounterState { day: 19000, today: 3, total: 42 })
    );
    assert_eq!(CounterState::parse("19000 3"), None);
    assert_eq!(CounterState::parse("a b c"), None);
    assert_eq!(CounterState::parse(""), None);
}
