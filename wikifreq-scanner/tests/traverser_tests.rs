// Tests for bounded breadth-first traversal

use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use wikifreq_scanner::{FetchError, StaticFetcher, Tokenizer, TraversalError, Traverser};

fn traverser(fetcher: &Arc<StaticFetcher>) -> Traverser {
    Traverser::new(fetcher.clone())
}

fn titles(result: &wikifreq_scanner::TraversalResult) -> Vec<String> {
    result.streams.iter().map(|s| s.title.clone()).collect()
}

// ============================================================================
// Depth Bounds
// ============================================================================

#[tokio::test]
async fn test_depth_zero_fetches_only_seed() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("Python", "Python content", &["Java", "Ruby"])
            .with_article("Java", "Java content", &[]),
    );

    let result = traverser(&fetcher).traverse("Python", 0).await.unwrap();

    assert_eq!(titles(&result), vec!["Python"]);
    assert_eq!(result.visited, vec!["Python"]);
    assert_eq!(fetcher.calls(), vec!["Python"]);
}

#[tokio::test]
async fn test_depth_one_stops_before_second_hop() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "a", &["B", "C"])
            .with_article("B", "b", &["C", "D"])
            .with_article("C", "c", &[])
            .with_article("D", "d", &[]),
    );

    let result = traverser(&fetcher).traverse("A", 1).await.unwrap();

    let visited: HashSet<_> = result.visited.iter().cloned().collect();
    let expected: HashSet<_> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
    assert_eq!(visited, expected);
    assert_eq!(fetcher.call_count("D"), 0);
    assert_eq!(fetcher.calls().len(), 3);
}

#[tokio::test]
async fn test_breadth_first_output_order() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "a", &["B", "C"])
            .with_article("B", "b", &["D"])
            .with_article("C", "c", &["E"])
            .with_article("D", "d", &[])
            .with_article("E", "e", &[]),
    );

    let result = traverser(&fetcher).traverse("A", 2).await.unwrap();

    assert_eq!(titles(&result), vec!["A", "B", "C", "D", "E"]);
    assert_eq!(result.visited, vec!["A", "B", "C", "D", "E"]);
}

#[tokio::test]
async fn test_visited_bounded_by_branching() {
    // Complete binary tree, three levels deep below the root.
    let mut fetcher = StaticFetcher::new();
    let mut all = vec!["n".to_string()];
    let mut level = vec!["n".to_string()];
    for _ in 0..3 {
        let mut next = Vec::new();
        for parent in &level {
            next.push(format!("{}0", parent));
            next.push(format!("{}1", parent));
        }
        all.extend(next.iter().cloned());
        level = next;
    }
    for title in &all {
        let left = format!("{}0", title);
        let right = format!("{}1", title);
        fetcher = fetcher.with_article(title, title, &[left.as_str(), right.as_str()]);
    }
    let fetcher = Arc::new(fetcher);

    for depth in 0..=3usize {
        let result = traverser(&fetcher).traverse("n", depth).await.unwrap();
        let bound: usize = (0..=depth).map(|k| 2usize.pow(k as u32)).sum();
        assert_eq!(result.visited.len(), bound, "depth {}", depth);
    }
}

// ============================================================================
// Visited Set
// ============================================================================

#[tokio::test]
async fn test_cycles_are_not_revisited() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "a", &["B", "A"])
            .with_article("B", "b", &["A", "B"]),
    );

    let result = traverser(&fetcher).traverse("A", 5).await.unwrap();

    assert_eq!(titles(&result), vec!["A", "B"]);
    assert_eq!(fetcher.calls(), vec!["A", "B"]);
}

#[tokio::test]
async fn test_shared_link_fetched_once() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "a", &["B", "C"])
            .with_article("B", "b", &["D"])
            .with_article("C", "c", &["D"])
            .with_article("D", "d", &["A", "B", "C"]),
    );

    let result = traverser(&fetcher).traverse("A", 3).await.unwrap();

    assert_eq!(fetcher.call_count("D"), 1);
    let calls = fetcher.calls();
    let unique: HashSet<_> = calls.iter().collect();
    assert_eq!(calls.len(), unique.len(), "no title fetched twice");
    assert_eq!(result.streams.len(), 4);
}

#[tokio::test]
async fn test_title_variants_share_one_visit() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("Seed", "seed", &["New_York", "new york", "New York"])
            .with_article("New_York", "city", &[]),
    );

    let result = traverser(&fetcher).traverse("Seed", 1).await.unwrap();

    assert_eq!(fetcher.calls(), vec!["Seed", "New_York"]);
    assert_eq!(result.visited, vec!["Seed", "New_York"]);
}

#[tokio::test]
async fn test_redirect_target_is_marked_visited() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("Seed", "seed", &["UK", "Britain"])
            .with_article("Britain", "island", &["United Kingdom"])
            .with_article("United Kingdom", "kingdom", &[])
            .with_redirect("UK", "United Kingdom"),
    );

    let result = traverser(&fetcher).traverse("Seed", 2).await.unwrap();

    assert_eq!(fetcher.calls(), vec!["Seed", "UK", "Britain"]);
    assert_eq!(fetcher.call_count("United Kingdom"), 0);
    assert_eq!(result.streams.len(), 3);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_seed_failure_is_fatal() {
    let fetcher = Arc::new(StaticFetcher::new().with_article("B", "b", &[]));

    let err = traverser(&fetcher).traverse("Missing", 2).await.unwrap_err();

    match err {
        TraversalError::SeedFetch { title, source } => {
            assert_eq!(title, "Missing");
            assert!(matches!(source, FetchError::NotFound(_)));
        }
    }
    assert_eq!(fetcher.calls(), vec!["Missing"]);
}

#[tokio::test]
async fn test_link_failures_are_skipped() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "alpha", &["B", "C", "D"])
            .with_article("B", "beta", &[])
            .with_article("C", "gamma", &[])
            .with_failure("C"),
    );

    let result = traverser(&fetcher).traverse("A", 1).await.unwrap();

    assert_eq!(titles(&result), vec!["A", "B"]);
    let failed: HashSet<_> = result.errors.iter().map(|e| e.title.as_str()).collect();
    assert_eq!(failed, ["C", "D"].into_iter().collect());
    assert!(result.errors.iter().any(|e| e.error.contains("503")));
    assert!(result.errors.iter().any(|e| e.error.contains("not found")));
}

#[tokio::test(start_paused = true)]
async fn test_slow_link_times_out_and_is_skipped() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "alpha", &["Slow", "Fast"])
            .with_article("Slow", "slow", &[])
            .with_article("Fast", "fast", &[])
            .with_delay("Slow", Duration::from_secs(30)),
    );

    let result = traverser(&fetcher)
        .with_fetch_timeout(Duration::from_secs(5))
        .traverse("A", 1)
        .await
        .unwrap();

    assert_eq!(titles(&result), vec!["A", "Fast"]);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].title, "Slow");
    assert!(result.errors[0].error.contains("Timed out"));
}

#[tokio::test(start_paused = true)]
async fn test_slow_seed_is_a_seed_failure() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "alpha", &[])
            .with_delay("A", Duration::from_secs(30)),
    );

    let err = traverser(&fetcher)
        .with_fetch_timeout(Duration::from_secs(5))
        .traverse("A", 0)
        .await
        .unwrap_err();

    let TraversalError::SeedFetch { source, .. } = err;
    assert!(matches!(source, FetchError::Timeout(_)));
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test(start_paused = true)]
async fn test_siblings_are_fetched_concurrently() {
    let mut fetcher = StaticFetcher::new().with_article("Root", "root", &["L1", "L2", "L3", "L4"]);
    for leaf in ["L1", "L2", "L3", "L4"] {
        fetcher = fetcher
            .with_article(leaf, leaf, &[])
            .with_delay(leaf, Duration::from_secs(1));
    }
    let fetcher = Arc::new(fetcher);

    let start = tokio::time::Instant::now();
    let result = traverser(&fetcher)
        .with_max_concurrency(4)
        .traverse("Root", 1)
        .await
        .unwrap();
    let parallel = start.elapsed();

    let start = tokio::time::Instant::now();
    traverser(&fetcher)
        .with_max_concurrency(1)
        .traverse("Root", 1)
        .await
        .unwrap();
    let serial = start.elapsed();

    assert_eq!(titles(&result), vec!["Root", "L1", "L2", "L3", "L4"]);
    assert!(parallel < Duration::from_secs(2), "parallel took {:?}", parallel);
    assert!(serial >= Duration::from_secs(4), "serial took {:?}", serial);
}

// ============================================================================
// Tokens and Progress
// ============================================================================

#[tokio::test]
async fn test_streams_carry_tokens() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "The cat sat on the mat.", &["B"])
            .with_article("B", "Born in 1912", &[]),
    );

    let result = traverser(&fetcher)
        .with_tokenizer(Tokenizer::new().with_skip_numeric(true))
        .traverse("A", 1)
        .await
        .unwrap();

    assert_eq!(
        result.streams[0].tokens,
        vec!["the", "cat", "sat", "on", "the", "mat"]
    );
    assert_eq!(result.streams[1].tokens, vec!["born", "in"]);
    assert_eq!(result.token_count(), 8);
    assert_eq!(result.fetched_count(), 2);
}

#[tokio::test]
async fn test_progress_callback_reports_levels() {
    let fetcher = Arc::new(
        StaticFetcher::new()
            .with_article("A", "a", &["B"])
            .with_article("B", "b", &["C"])
            .with_article("C", "c", &[]),
    );
    let seen: Arc<Mutex<Vec<(usize, String)>>> = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    traverser(&fetcher)
        .with_progress_callback(Arc::new(move |level, title| {
            seen_clone.lock().unwrap().push((level, title));
        }))
        .traverse("A", 2)
        .await
        .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(
        *seen,
        vec![
            (0, "A".to_string()),
            (1, "B".to_string()),
            (2, "C".to_string())
        ]
    );
}
