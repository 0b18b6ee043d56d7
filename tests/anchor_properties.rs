//! End-to-end anchoring behaviour through the umbrella crate.

use std::collections::BTreeMap;

use paranote::{
    AnchorOutcome, Comment, CommentNode, FingerprintConfig, Resolver, build_tree, counts,
    extract, extract_fingerprint, resolve,
};

fn ids(comments: &[Comment]) -> Vec<&str> {
    comments.iter().map(|c| c.id.as_str()).collect()
}

#[test]
fn completeness_holds_for_mixed_input() {
    let paragraphs = ["Alpha text", "Beta text", "Gamma text"];
    let comments = vec![
        Comment::new("verified", 1, Some("Beta"), "x"),
        Comment::new("moved", 2, Some("Alpha"), "x"),
        Comment::new("orphan", 1, Some("Omega"), "x"),
        Comment::new("plain", 5, None, "x"),
        Comment::reply("reply", "moved", 2, "x"),
        Comment::reply("lonely", "gone", 0, "x"),
    ];
    let mapping = resolve(&paragraphs, &comments);

    let total: usize = mapping.iter().map(|(_, bucket)| bucket.len()).sum();
    assert_eq!(total, comments.len());
    assert_eq!(ids(mapping.get(0)), vec!["moved", "reply", "lonely"]);
    assert_eq!(ids(mapping.get(1)), vec!["verified", "orphan"]);
    assert_eq!(ids(mapping.get(5)), vec!["plain"]);
}

#[test]
fn no_drift_when_document_unchanged() {
    let paragraphs = ["Call me Ishmael.", "Some years ago, never mind how long", "precisely"];
    let comments: Vec<Comment> = paragraphs
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let fp = extract_fingerprint(p);
            Comment::new(format!("c{i}"), i, Some(fp.as_str()), "x")
        })
        .collect();

    let resolution = Resolver::default().resolve_detailed(&paragraphs, &comments);
    for placement in &resolution.placements {
        assert_eq!(placement.resolved_index, placement.recorded_index);
        assert_eq!(placement.outcome, AnchorOutcome::Verified);
    }
}

#[test]
fn relocation_follows_reorder() {
    // Written when the chapter read ["Gamma text", ...].
    let comments = vec![Comment::new("c", 0, Some("Gamma"), "x")];
    let mapping = resolve(&["Alpha text", "Gamma text", "Beta text"], &comments);
    assert_eq!(ids(mapping.get(1)), vec!["c"]);
}

#[test]
fn duplicate_paragraphs_pick_the_first() {
    let paragraphs = ["Chorus line", "Verse one", "Chorus line"];
    let comments = vec![Comment::new("c", 1, Some("Chorus"), "x")];
    let mapping = resolve(&paragraphs, &comments);
    assert_eq!(ids(mapping.get(0)), vec!["c"]);
    assert!(mapping.get(2).is_empty());
}

#[test]
fn orphans_are_preserved() {
    let comments = vec![Comment::new("c", 4, Some("Vanished paragraph"), "x")];
    let resolution = Resolver::default().resolve_detailed(&["Something else"], &comments);
    assert_eq!(ids(resolution.mapping.get(4)), vec!["c"]);
    assert_eq!(resolution.orphans().count(), 1);
}

#[test]
fn tree_integrity_across_buckets() {
    let paragraphs = ["Alpha text", "Gamma text"];
    let comments = vec![
        Comment::new("root", 0, Some("Gamma"), "x"),
        Comment::reply("r1", "root", 0, "x"),
        Comment::reply("r2", "r1", 0, "x"),
        Comment::reply("r3", "root", 0, "x"),
        Comment::new("other", 0, Some("Alpha"), "x"),
    ];
    let mapping = resolve(&paragraphs, &comments);

    let mut total = 0;
    for (_, bucket) in mapping.iter() {
        let forest = build_tree(bucket);
        let emitted: usize = forest.iter().map(CommentNode::flatten_count).sum();
        assert_eq!(emitted, bucket.len());
        total += emitted;
    }
    assert_eq!(total, comments.len());

    let forest = build_tree(mapping.get(1));
    assert_eq!(forest.len(), 1);
    let walk: Vec<&str> = forest[0].iter().map(CommentNode::id).collect();
    assert_eq!(walk, vec!["root", "r1", "r2", "r3"]);
}

#[test]
fn counts_only_roots() {
    let comments = vec![
        Comment::new("a", 0, None, "x"),
        Comment::new("b", 0, None, "x"),
        Comment::reply("a1", "a", 0, "x"),
        Comment::reply("a2", "a", 0, "x"),
        Comment::reply("b1", "b", 0, "x"),
    ];
    let counts = counts(&resolve(&["p"], &comments));
    assert_eq!(counts.get(0), 2);
    assert_eq!(counts.thread_total(0), 5);
    let map: BTreeMap<usize, usize> = counts.into();
    assert_eq!(map, BTreeMap::from([(0, 2)]));
}

#[test]
fn idempotent_under_repeated_runs() {
    let paragraphs = ["Alpha text", "Gamma text", "Beta text"];
    let comments = vec![
        Comment::new("a", 0, Some("Gamma"), "x"),
        Comment::new("b", 2, Some("Beta"), "x"),
        Comment::reply("a1", "a", 0, "x"),
    ];
    let once = resolve(&paragraphs, &comments);
    let twice = resolve(&paragraphs, &comments);
    assert_eq!(once, twice);
}

#[test]
fn injected_badges_do_not_break_matching() {
    let cfg = FingerprintConfig::markup();
    let original = r#"<p>The lamps went out one by one<span class="na-comment-count">1</span></p>"#;
    let captured = extract(original, &cfg);
    assert_eq!(captured, "The lamps went out one by one");

    let resolver = Resolver::new(Default::default(), cfg).expect("config");
    let edited = [
        r#"<p>A new first paragraph.<span class="na-comment-count">0</span></p>"#,
        r#"<p>The lamps went out one by one<span class="na-comment-count">7</span></p>"#,
    ];
    let comments = vec![Comment::new("c", 0, Some(captured.as_str()), "x")];
    let mapping = resolver.resolve(&edited, &comments);
    assert_eq!(ids(mapping.get(1)), vec!["c"]);
}

#[test]
fn unicode_prefixes_count_characters() {
    let paragraph = "Über den Wolken muss die Freiheit wohl grenzenlos sein.";
    let fp = extract_fingerprint(paragraph);
    assert_eq!(fp.chars().count(), 32);
    let comments = vec![Comment::new("c", 3, Some(fp.as_str()), "x")];
    let mapping = resolve(&["Intro", paragraph], &comments);
    assert_eq!(ids(mapping.get(1)), vec!["c"]);
}
