use paranote::{
    Comment, FingerprintConfig, ParagraphFingerprints, Resolver, counts, extract,
    extract_fingerprint, resolve, snapshot_digest,
};

fn chapter() -> Vec<String> {
    (0..40)
        .map(|i| format!("Paragraph {i:02}: the tide came in and went out again."))
        .collect()
}

#[test]
fn fingerprints_are_stable_across_calls() {
    let text = "  A paragraph with leading space and a long enough tail.\n";
    let first = extract_fingerprint(text);
    let second = extract_fingerprint(text);
    assert_eq!(first, second);
    assert_eq!(first.chars().count(), 32);
    assert!(!first.starts_with(' '));
}

#[test]
fn markup_and_plain_agree_on_clean_text() {
    let plain = extract("Just words, nothing else here at all.", &FingerprintConfig::default());
    let markup = extract(
        "<p>Just words, nothing else here at all.</p>",
        &FingerprintConfig::markup(),
    );
    assert_eq!(plain, markup);
}

#[test]
fn digest_tracks_document_shape() {
    let cfg = FingerprintConfig::default();
    let paragraphs = chapter();
    let a = ParagraphFingerprints::from_paragraphs(&paragraphs, &cfg);
    let b = ParagraphFingerprints::from_paragraphs(&paragraphs, &cfg);
    assert_eq!(a.digest, b.digest);
    assert_eq!(a.digest, snapshot_digest(cfg.version, &a.fingerprints));

    let mut reordered = paragraphs.clone();
    reordered.swap(0, 1);
    let c = ParagraphFingerprints::from_paragraphs(&reordered, &cfg);
    assert_ne!(a.digest, c.digest);
}

#[test]
fn resolution_is_deterministic() {
    let paragraphs = chapter();
    let comments: Vec<Comment> = (0..100)
        .map(|i| {
            let target = (i * 7) % paragraphs.len();
            let fp = extract_fingerprint(&paragraphs[target]);
            Comment::new(format!("c{i}"), (target + 3) % paragraphs.len(), Some(fp.as_str()), "x")
        })
        .collect();

    let resolver = Resolver::default();
    let first = resolver.resolve_detailed(&paragraphs, &comments);
    let second = resolver.resolve_detailed(&paragraphs, &comments);
    assert_eq!(first, second);
    assert_eq!(counts(&first.mapping), counts(&second.mapping));

    // Every comment found the paragraph it was written against.
    for (i, placement) in first.placements.iter().enumerate() {
        assert_eq!(placement.resolved_index, (i * 7) % paragraphs.len());
    }
}

#[test]
fn resolution_is_thread_safe() {
    let paragraphs = std::sync::Arc::new(chapter());
    let comments = std::sync::Arc::new(vec![
        Comment::new("a", 0, Some("Paragraph 05"), "x"),
        Comment::reply("b", "a", 0, "y"),
    ]);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let paragraphs = std::sync::Arc::clone(&paragraphs);
            let comments = std::sync::Arc::clone(&comments);
            std::thread::spawn(move || resolve(paragraphs.as_slice(), comments.as_slice()))
        })
        .collect();

    for handle in handles {
        let mapping = handle.join().expect("thread completes");
        let ids: Vec<&str> = mapping.get(5).iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
    }
}
