use bus::{PageCommand, PageReply};
use content::Page;
use core_types::{DocumentModel, SearchOptions};
use html::NodeId;
use html_test_support::{OutlineOptions, diff_lines, outline};
use search::{SearchPattern, build_occurrence_map};

fn assert_outline(page: &Page, root: NodeId, expected: &[&str]) {
    let expected: Vec<String> = expected.iter().map(|s| s.to_string()).collect();
    let actual = outline(page.document(), root, OutlineOptions::default());
    assert!(
        expected == actual,
        "outline mismatch\n{}",
        diff_lines(&expected, &actual)
    );
}

fn init(page: &mut Page) -> DocumentModel {
    match page.handle(PageCommand::Init) {
        PageReply::Model { model } => model,
        other => panic!("unexpected reply {other:?}"),
    }
}

fn first_element(page: &Page) -> NodeId {
    let doc = page.document();
    doc.children(doc.root())[0]
}

#[test]
fn init_wraps_each_retained_text_node() {
    let mut page = Page::parse("<p>Hello <b>world</b><!--c--></p>", None);
    let model = init(&mut page);
    assert_eq!(model.node_count(), 2);

    let p = first_element(&page);
    assert_outline(
        &page,
        p,
        &[
            "<p>",
            "  <span style=\"all: unset;\" id=\"<uuid>\">",
            "    \"Hello \"",
            "  <b>",
            "    <span style=\"all: unset;\" id=\"<uuid>\">",
            "      \"world\"",
            "  <!-- c -->",
        ],
    );
}

#[test]
fn highlight_spans_stay_inside_their_wrappers() {
    let mut page = Page::parse("<p>wo<b>r</b>ld</p>", None);
    let model = init(&mut page);
    let options = SearchOptions::default();
    let pattern = SearchPattern::new("world", &options).unwrap();
    let map = build_occurrence_map(&model, &pattern, &options);
    page.handle(PageCommand::HighlightUpdate {
        occurrence_map: map,
        index: 0,
        regex: pattern.source().to_string(),
        options,
    });

    let p = first_element(&page);
    assert_outline(
        &page,
        p,
        &[
            "<p>",
            "  <span style=\"all: unset;\" id=\"<uuid>\">",
            "    <span class=\"findr-highlight findr-occr0 findr-focus\" style=\"background-color: #ff9813;\">",
            "      \"wo\"",
            "  <b>",
            "    <span style=\"all: unset;\" id=\"<uuid>\">",
            "      <span class=\"findr-highlight findr-occr0 findr-focus\" style=\"background-color: #ff9813;\">",
            "        \"r\"",
            "  <span style=\"all: unset;\" id=\"<uuid>\">",
            "    <span class=\"findr-highlight findr-occr0 findr-focus\" style=\"background-color: #ff9813;\">",
            "      \"ld\"",
        ],
    );
}

#[test]
fn full_restore_is_idempotent() {
    let html = "<div><h1>Title</h1><ul><li>one</li><li>two <em>three</em></li></ul></div>";
    let mut page = Page::parse(html, None);
    let model = init(&mut page);
    assert_eq!(model.len(), 3);

    let restore = PageCommand::Restore {
        uuids: model.uuids(),
    };
    page.handle(restore.clone());
    assert_eq!(page.html(), html);
    page.handle(restore);
    assert_eq!(page.html(), html);
}
