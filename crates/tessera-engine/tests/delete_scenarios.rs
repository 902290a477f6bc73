use pretty_assertions::assert_eq;
use rstest::rstest;
use tessera_engine::{
    DeleteOutcome, EditingPolicy, Handled, HtmlSchema, NodeId, Position, Range, Reentrancy,
    RestoreReport, Tree, delete_backward, delete_forward, delete_range, is_fake_br,
    prepare_update,
};

fn range(tree: &Tree, from: &str, to: &str) -> Range {
    Range::new(
        tree,
        tree.resolve_path(from).unwrap(),
        tree.resolve_path(to).unwrap(),
    )
}

fn delete_with(
    policy: &EditingPolicy,
    markup: &str,
    from: &str,
    to: &str,
) -> (Tree, DeleteOutcome) {
    let mut tree = Tree::from_markup(markup);
    let range = range(&tree, from, to);
    let outcome = delete_range(&mut tree, policy, range).unwrap();
    (tree, outcome)
}

fn delete(markup: &str, from: &str, to: &str) -> (Tree, DeleteOutcome) {
    delete_with(&EditingPolicy::default(), markup, from, to)
}

fn has_class(class: &'static str) -> impl Fn(&Tree, NodeId) -> bool {
    move |tree: &Tree, node: NodeId| tree.element(node).is_some_and(|el| el.has_class(class))
}

#[test]
fn deleting_last_word_keeps_trailing_space() {
    let (tree, outcome) = delete("<p>Hello world</p>", "0/0:6", "0/0:11");

    assert_eq!(tree.to_markup(), "<p>Hello&nbsp;</p>");
    assert_eq!(tree.path_string(outcome.cursor), "0/0:6");
    assert_eq!(tree.rendered_text(tree.root()), "Hello ");
    assert_eq!(
        outcome.restore,
        Some(RestoreReport {
            applied: 1,
            skipped_stale: 3,
            unchanged: 0,
        })
    );
}

#[test]
fn paragraph_boundary_merges() {
    let (tree, outcome) = delete("<p>foo</p><p>bar</p>", "0/0:3", "1/0:0");

    assert_eq!(tree.to_markup(), "<p>foobar</p>");
    assert!(outcome.merged);
    assert_eq!(tree.path_string(outcome.cursor), "0/0:3");
}

#[test]
fn unbreakable_paragraph_is_not_merged() {
    let policy = EditingPolicy::default().unbreakable(has_class("locked"));
    let (tree, outcome) = delete_with(
        &policy,
        "<p>foo</p><p class=\"locked\">bar</p>",
        "0/0:3",
        "1/0:0",
    );

    assert_eq!(tree.to_markup(), "<p>foo</p><p class=\"locked\">bar</p>");
    assert!(!outcome.merged);
}

#[test]
fn emptied_line_keeps_one_break() {
    let (tree, outcome) = delete("<p>abc<br></p>", "0/0:0", "0/0:3");

    assert_eq!(tree.to_markup(), "<p><br></p>");
    assert_eq!(tree.path_string(outcome.cursor), "0:0");
}

#[test]
fn trailing_break_is_duplicated_when_last_line_empties() {
    let (tree, outcome) = delete("<p>a<br>bc</p>", "0/2:0", "0/2:2");

    insta::assert_snapshot!(tree.to_markup(), @"<p>a<br><br></p>");
    let first = tree.node_at_path(&[0, 1]).unwrap();
    assert!(!is_fake_br(&tree, &HtmlSchema, first));
    assert_eq!(tree.path_string(outcome.cursor), "0:2");
}

#[test]
fn merge_drops_trailing_break() {
    let (tree, outcome) = delete("<p>a<br></p><p>b</p>", "0:2", "1/0:0");

    assert_eq!(tree.to_markup(), "<p>ab</p>");
    assert!(outcome.merged);
    assert_eq!(tree.path_string(outcome.cursor), "0/0:1");
}

#[test]
fn merge_collapses_leading_nbsp() {
    let (tree, _) = delete("<p>foo</p><p>&nbsp;bar</p>", "0/0:3", "1/0:0");

    insta::assert_snapshot!(tree.to_markup(), @"<p>foo bar</p>");
    assert_eq!(tree.rendered_text(tree.root()), "foo bar");
}

#[rstest]
#[case::trailing_space("<p>foo </p><p>bar</p>", "0/0:4")]
#[case::leading_space("<p>foo</p><p> bar</p>", "0/0:3")]
fn merge_drops_collapsed_space_at_the_seam(#[case] markup: &str, #[case] from: &str) {
    let (tree, outcome) = delete(markup, from, "1/0:0");

    assert!(outcome.merged);
    assert_eq!(tree.to_markup(), "<p>foobar</p>");
    assert_eq!(tree.rendered_text(tree.root()), "foobar");
}

#[test]
fn deleting_nbsp_keeps_the_plain_space_before_it() {
    let (tree, _) = delete("<p>a &nbsp;b</p>", "0/0:2", "0/0:3");

    assert_eq!(tree.to_markup(), "<p>a b</p>");
    assert_eq!(tree.rendered_text(tree.root()), "a b");
}

#[test]
fn emptied_paragraph_gets_placeholder() {
    let (tree, outcome) = delete("<p>abc</p>", "0/0:0", "0/0:3");

    assert_eq!(tree.to_markup(), "<p><br></p>");
    assert_eq!(tree.path_string(outcome.cursor), "0:0");
}

#[test]
fn delete_then_reinsert_round_trips() {
    let original = "<p>abc</p>";
    let (mut tree, outcome) = delete(original, "0/0:1", "0/0:2");
    assert_eq!(tree.to_markup(), "<p>ac</p>");

    tree.insert_text(outcome.cursor, "b").unwrap();

    assert_eq!(tree.to_markup(), original);
    let reference = Tree::from_markup(original);
    assert_eq!(
        tree.rendered_text(tree.root()),
        reference.rendered_text(reference.root())
    );
}

#[test]
fn deleting_last_inline_word_keeps_preceding_space() {
    // The space before the emptied inline now ends the line, so it is made
    // non-collapsing; the inline survives with a marker because the caret
    // is in it.
    let (tree, outcome) = delete("<p>a <b>c</b></p>", "0/1/0:0", "0/1/0:1");

    assert_eq!(tree.to_markup(), "<p>a&nbsp;<b>&#8203;</b></p>");
    assert_eq!(tree.path_string(outcome.cursor), "0/1/0:0");
}

#[test]
fn unremovable_nodes_are_cleared_not_detached() {
    let policy = EditingPolicy::default().unremovable(has_class("keep"));
    let (tree, outcome) = delete_with(
        &policy,
        "<div>x</div><p class=\"keep\">y</p><div>z</div>",
        "0/0:0",
        "2/0:1",
    );

    assert_eq!(tree.to_markup(), "<p class=\"keep\"><br></p><div><br></div>");
    assert_eq!(outcome.emptied_unremovable.len(), 1);
    assert!(tree.is_attached(outcome.emptied_unremovable[0]));
}

#[test]
fn unremovable_cells_stay_separate() {
    let policy = EditingPolicy::default().unremovable(|tree: &Tree, node: NodeId| {
        tree.tag(node).is_some_and(|tag| tag.as_str() == "td")
    });
    let (tree, outcome) = delete_with(
        &policy,
        "<table><tbody><tr><td>a</td><td>b</td></tr></tbody></table>",
        "0/0/0/0/0:0",
        "0/0/0/1/0:1",
    );

    assert_eq!(
        tree.to_markup(),
        "<table><tbody><tr><td><br></td><td><br></td></tr></tbody></table>"
    );
    assert!(!outcome.merged);
}

#[test]
fn hook_takes_over_deletion() {
    let policy = EditingPolicy::default().before_delete(10, |tree: &mut Tree, range: &Range| {
        let widget = tree.node_at_path(&[0, 1]);
        match widget {
            Some(widget) if tree.element(widget).is_some_and(|el| el.has_class("widget")) => {
                let _ = tree.remove(widget);
                Handled::Yes(Some(range.start()))
            }
            _ => Handled::No,
        }
    });
    let (tree, outcome) = delete_with(
        &policy,
        "<p>a<span class=\"widget\">w</span>b</p>",
        "0:1",
        "0:2",
    );

    assert_eq!(tree.to_markup(), "<p>ab</p>");
    assert!(outcome.intercepted);
    assert_eq!(outcome.restore, None);
}

#[test]
fn nested_delete_skips_restoration() {
    let mut tree = Tree::from_markup("<p>Hello world</p>");
    let policy = EditingPolicy::default();
    let outer_point = tree.resolve_path("0:0").unwrap();
    let outer = prepare_update(&tree, &policy, &[outer_point], Reentrancy::Exclusive).unwrap();

    let inner = range(&tree, "0/0:6", "0/0:11");
    let outcome = delete_range(&mut tree, &policy, inner).unwrap();
    assert_eq!(outcome.restore, None);
    assert_eq!(tree.to_markup(), "<p>Hello </p>");

    outer.discard();
}

#[rstest]
#[case::character("<p>ab</p>", "0/0:2", "<p>a</p>", "0/0:1")]
#[case::paragraph_join("<p>foo</p><p>bar</p>", "1/0:0", "<p>foobar</p>", "0/0:3")]
#[case::empty_paragraph("<p><br></p><p>b</p>", "1/0:0", "<p>b</p>", "0/0:0")]
#[case::real_break("<p>a<br>b</p>", "0/2:0", "<p>ab</p>", "0/0:1")]
#[case::island(
    "<p>a<span contenteditable=\"false\">xy</span>b</p>",
    "0/2:0",
    "<p>ab</p>",
    "0/0:1"
)]
#[case::inline_into_block("<p>a</p>b", "1:0", "<p>ab</p>", "0/0:1")]
fn backspace(
    #[case] markup: &str,
    #[case] at: &str,
    #[case] expected: &str,
    #[case] cursor: &str,
) {
    let mut tree = Tree::from_markup(markup);
    let policy = EditingPolicy::default();
    let pos = tree.resolve_path(at).unwrap();

    let outcome = delete_backward(&mut tree, &policy, pos).unwrap().unwrap();

    assert_eq!(tree.to_markup(), expected);
    assert_eq!(tree.path_string(outcome.cursor), cursor);
}

#[test]
fn backspace_over_rule_removes_it() {
    let mut tree = Tree::from_markup("<p>a</p><hr><p>b</p>");
    let policy = EditingPolicy::default();
    let pos = tree.resolve_path("2/0:0").unwrap();

    delete_backward(&mut tree, &policy, pos).unwrap().unwrap();

    assert_eq!(tree.to_markup(), "<p>a</p><p>b</p>");
}

#[test]
fn forward_delete_pulls_next_block_up() {
    let mut tree = Tree::from_markup("<p>foo</p><p>bar</p>");
    let policy = EditingPolicy::default();
    let pos = tree.resolve_path("0/0:3").unwrap();

    let outcome = delete_forward(&mut tree, &policy, pos).unwrap().unwrap();

    assert_eq!(tree.to_markup(), "<p>foobar</p>");
    assert_eq!(tree.path_string(outcome.cursor), "0/0:3");
}

#[test]
fn single_step_at_document_edges_is_a_noop() {
    let mut tree = Tree::from_markup("<p>ab</p>");
    let policy = EditingPolicy::default();
    let start = tree.resolve_path("0/0:0").unwrap();
    let end = tree.resolve_path("0/0:2").unwrap();

    assert_eq!(delete_backward(&mut tree, &policy, start).unwrap(), None);
    assert_eq!(delete_forward(&mut tree, &policy, end).unwrap(), None);
    assert_eq!(tree.to_markup(), "<p>ab</p>");
}

#[test]
fn stale_position_is_rejected() {
    let mut tree = Tree::from_markup("<p>a</p><p>b</p>");
    let policy = EditingPolicy::default();
    let second = tree.child(tree.root(), 1).unwrap();
    let inside = Position::new(tree.child(second, 0).unwrap(), 0);
    tree.remove(second).unwrap();

    assert!(delete_backward(&mut tree, &policy, inside).is_err());
}
