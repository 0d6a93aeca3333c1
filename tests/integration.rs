use std::ops::Range;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use expect_test::expect;
use retagls::{
    extract_regions, language_at, language_for_viewport, load_settings, DocumentState,
    LanguageSink, LanguageTag, Region, RegionCache, RegionSource, RetagConfig, Retagger,
};
use tower_lsp::lsp_types::{Position, Url};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const VIEW: &str = "<ul>\n@foreach ($items as $item)\n<?php $n = 1; ?>\n<li>{{ $item }}</li>\n@endforeach\n<?php echo $n; ?>\n</ul>\n";

/// One line per region: `<start>..<end> <text>`.
fn format_regions(text: &str, regions: &[Region]) -> String {
    if regions.is_empty() {
        return "(no regions)".to_string();
    }
    regions
        .iter()
        .map(|r| format!("{}..{} {:?}", r.start, r.end, &text[r.start..r.end]))
        .collect::<Vec<_>>()
        .join("\n")
}

fn tag_name(tag: LanguageTag) -> &'static str {
    match tag {
        LanguageTag::Script => "script",
        LanguageTag::Template => "template",
    }
}

fn view_uri() -> Url {
    Url::parse("file:///app/resources/views/items.blade.php").unwrap()
}

#[derive(Default)]
struct RecordingSink {
    calls: Mutex<Vec<String>>,
}

impl LanguageSink for RecordingSink {
    fn set_language(&self, uri: &Url, tag: LanguageTag) {
        let name = uri.path().rsplit('/').next().unwrap_or_default().to_string();
        self.calls
            .lock()
            .unwrap()
            .push(format!("{} -> {}", name, tag_name(tag)));
    }
}

impl RecordingSink {
    fn take(&self) -> String {
        std::mem::take(&mut *self.calls.lock().unwrap()).join("\n")
    }
}

#[derive(Default)]
struct CountingSource {
    calls: AtomicUsize,
}

impl RegionSource for CountingSource {
    fn extract(&self, text: &str) -> Vec<Region> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        extract_regions(text)
    }
}

// ---------------------------------------------------------------------------
// Tests — region extraction
// ---------------------------------------------------------------------------

#[test]
fn blade_view_regions() {
    let actual = format_regions(VIEW, &extract_regions(VIEW));
    let expected = expect![[r#"
        32..48 "<?php $n = 1; ?>"
        82..99 "<?php echo $n; ?>""#]];
    expected.assert_eq(&actual);
}

#[test]
fn unterminated_block_has_no_region() {
    let text = "<div><?php echo 'open';\n</div>";
    let actual = format_regions(text, &extract_regions(text));
    let expected = expect![[r#"(no regions)"#]];
    expected.assert_eq(&actual);
}

#[test]
fn configured_delimiters_from_fixture() {
    let fixture = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/twig/retagls.toml");
    let config = RetagConfig::from_settings(&load_settings(&fixture));

    assert!(config.matches(&Url::parse("file:///templates/base.html.twig").unwrap()));
    assert!(!config.matches(&view_uri()));
    assert_eq!(config.language_id(LanguageTag::Script), "twig");
    assert_eq!(config.max_documents, Some(2));
    assert!(!config.advisory);

    let text = "{# header #}\n<h1>{{ title }}</h1>\n{{ user.name }}\n";
    let actual = format_regions(text, &config.scanner().unwrap().scan(text));
    let expected = expect![[r#"
        17..28 "{{ title }}"
        34..49 "{{ user.name }}""#]];
    expected.assert_eq(&actual);
}

// ---------------------------------------------------------------------------
// Tests — language selection
// ---------------------------------------------------------------------------

#[test]
fn viewport_scenarios() {
    let regions = [Region::new(10, 20)];
    let scenarios: Vec<(Vec<Range<usize>>, usize)> = vec![
        (vec![0..5], 2),
        (vec![12..18], 15),
        (vec![0..30], 3),
        (vec![0..30], 15),
        (vec![0..5, 25..30], 0),
        (vec![0..5, 25..30], 15),
        (vec![0..10], 10),
        (vec![10..20], 3),
    ];

    let actual = scenarios
        .iter()
        .map(|(visible, cursor)| {
            format!(
                "{:?} cursor {} -> {}",
                visible,
                cursor,
                tag_name(language_for_viewport(&regions, visible, *cursor))
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    let expected = expect![[r#"
        [0..5] cursor 2 -> template
        [12..18] cursor 15 -> script
        [0..30] cursor 3 -> template
        [0..30] cursor 15 -> script
        [0..5, 25..30] cursor 0 -> template
        [0..5, 25..30] cursor 15 -> template
        [0..10] cursor 10 -> template
        [10..20] cursor 3 -> script"#]];
    expected.assert_eq(&actual);
}

#[test]
fn every_offset_between_blocks_is_template() {
    let regions = extract_regions(VIEW);
    for offset in 0..=VIEW.len() {
        let inside = regions.iter().any(|r| offset >= r.start && offset <= r.end);
        let expected = if inside {
            LanguageTag::Script
        } else {
            LanguageTag::Template
        };
        assert_eq!(language_at(&regions, offset), expected, "offset {}", offset);
    }
}

// ---------------------------------------------------------------------------
// Tests — cache and event handling
// ---------------------------------------------------------------------------

#[test]
fn cache_rescans_only_on_new_revision() {
    let cache = RegionCache::with_extractor(CountingSource::default());
    let uri = view_uri();

    let first = cache.get_regions(&uri, 1, VIEW);
    let second = cache.get_regions(&uri, 1, VIEW);
    assert_eq!(first, second);
    assert_eq!(cache.extractor().calls.load(Ordering::SeqCst), 1);

    cache.get_regions(&uri, 2, VIEW);
    assert_eq!(cache.extractor().calls.load(Ordering::SeqCst), 2);

    cache.invalidate(&Url::parse("file:///never/opened.blade.php").unwrap());
    cache.invalidate(&uri);
    cache.get_regions(&uri, 2, VIEW);
    assert_eq!(cache.extractor().calls.load(Ordering::SeqCst), 3);
}

#[test]
fn cursor_session() {
    let sink = Arc::new(RecordingSink::default());
    let retagger = Retagger::new(Arc::clone(&sink));
    let doc = DocumentState::new(view_uri(), VIEW.to_string(), 1);

    for (line, character) in [(0, 2), (2, 0), (2, 16), (3, 0), (5, 6), (6, 0)] {
        let offset = doc
            .line_index
            .position_to_offset(Position::new(line, character))
            .unwrap();
        retagger.selection_changed(&doc, offset);
    }

    let expected = expect![[r#"
        items.blade.php -> template
        items.blade.php -> script
        items.blade.php -> script
        items.blade.php -> template
        items.blade.php -> script
        items.blade.php -> template"#]];
    expected.assert_eq(&sink.take());
}

#[test]
fn viewport_session() {
    let sink = Arc::new(RecordingSink::default());
    let retagger = Retagger::new(Arc::clone(&sink));
    let doc = DocumentState::new(view_uri(), VIEW.to_string(), 1);
    let range = |start: (u32, u32), end: (u32, u32)| {
        doc.line_index
            .range_to_offsets(tower_lsp::lsp_types::Range::new(
                Position::new(start.0, start.1),
                Position::new(end.0, end.1),
            ))
            .unwrap()
    };

    // header only
    retagger.viewport_changed(&doc, &[range((0, 0), (1, 26))], Some(0));
    // first script block only
    retagger.viewport_changed(&doc, &[range((2, 0), (2, 16))], Some(0));
    // whole file, cursor in markup
    retagger.viewport_changed(&doc, &[range((0, 0), (6, 5))], Some(50));
    // whole file, cursor in second block
    retagger.viewport_changed(&doc, &[range((0, 0), (6, 5))], Some(90));
    // nothing visible
    assert_eq!(retagger.viewport_changed(&doc, &[], Some(90)), None);

    let expected = expect![[r#"
        items.blade.php -> template
        items.blade.php -> script
        items.blade.php -> template
        items.blade.php -> script"#]];
    expected.assert_eq(&sink.take());
}

#[test]
fn closing_document_drops_cached_regions() {
    let retagger = Retagger::new(Arc::new(RecordingSink::default()));
    let doc = DocumentState::new(view_uri(), VIEW.to_string(), 4);

    retagger.selection_changed(&doc, 0);
    assert_eq!(retagger.cache().get(&doc.uri).map(|e| e.revision), Some(4));

    retagger.document_closed(&doc.uri);
    assert!(retagger.cache().get(&doc.uri).is_none());
}
