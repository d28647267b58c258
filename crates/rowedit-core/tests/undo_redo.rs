use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowedit_core::{
    ActionEngine, ActionInput, CursorPolicy, Document, EditOp, EditSession, EditorSettings,
    JoinDirection, Position, Selection, TabKeyBehavior,
};

#[derive(Debug, PartialEq)]
struct Snapshot {
    text: String,
    cursor: Position,
    selection: Option<Selection>,
}

fn snapshot(session: &EditSession) -> Snapshot {
    Snapshot {
        text: session.text(),
        cursor: session.cursor_position(),
        selection: session.selection(),
    }
}

/// Perform, undo, redo; the final state must equal performing alone.
fn assert_symmetric(text: &str, op: EditOp) {
    let mut session = EditSession::with_text(text, EditorSettings::default());
    let before = session.text();
    session
        .perform(op.clone())
        .unwrap_or_else(|| panic!("{} changed nothing", op.key()));
    let after = snapshot(&session);

    assert!(session.undo());
    assert_eq!(session.text(), before, "undo of {}", op.key());

    assert!(session.redo());
    assert_eq!(snapshot(&session), after, "redo of {}", op.key());
}

#[test]
fn test_every_descriptor_is_symmetric() {
    let text = "fn main() {\n\tlet x = 1;\n    x\n}";
    let ops = [
        EditOp::InsertCharacter {
            pos: Position::new(1, 5),
            text: "ab".into(),
        },
        EditOp::DeleteCharacter {
            pos: Position::new(1, 1),
            text: "let".into(),
        },
        EditOp::InsertChunk {
            pos: Position::new(0, 11),
            text: "\n\t// hi\n".into(),
        },
        EditOp::DeleteChunk {
            start: Position::new(0, 3),
            end: Position::new(2, 2),
            text: String::new(),
        },
        EditOp::InsertTab {
            pos: Position::new(2, 4),
            text: "\t".into(),
        },
        EditOp::RemoveTab {
            pos: Position::new(2, 0),
            text: "    ".into(),
        },
        EditOp::Indent {
            first_row: 1,
            history: vec!["  ".into(), "\t".into()],
        },
        EditOp::Unindent {
            first_row: 0,
            history: vec!["\t".into(); 4],
        },
        EditOp::Newline {
            pos: Position::new(1, 5),
            indent: 4,
        },
        EditOp::JoinLine {
            row: 2,
            direction: JoinDirection::Up,
            col: 0,
            strip: 0,
        },
        EditOp::DeleteSelection {
            selection: Selection::new(Position::new(1, 0), Position::new(3, 0)),
            text: String::new(),
        },
        EditOp::InsertChunkAndSelect {
            selection: Selection::new(Position::new(3, 1), Position::new(3, 1)),
            text: "\n// end".into(),
        },
        EditOp::DeleteSelectionAndInsertChunk {
            selection: Selection::new(Position::new(1, 5), Position::new(1, 6)),
            deleted: String::new(),
            text: "y".into(),
        },
    ];

    for op in ops {
        assert_symmetric(text, op);
    }
}

#[test]
fn test_padding_past_row_end_is_undone() {
    let settings = EditorSettings::default().with_strict_lines(false);
    let mut session = EditSession::with_text("ab", settings);
    session.set_cursor_position(Position::new(0, 5));
    session
        .execute("insertCharacter", ActionInput::Char('x'))
        .unwrap();
    assert_eq!(session.text(), "ab   x");

    session.undo();
    assert_eq!(session.text(), "ab");
}

#[test]
fn test_tab_text_is_replayed_exactly() {
    let settings = EditorSettings::default().with_tab_key_behavior(TabKeyBehavior::Spaces);
    let mut session = EditSession::with_text("ab", settings);
    session.set_cursor_position(Position::new(0, 2));
    session.execute("insertTab", ActionInput::None).unwrap();
    assert_eq!(session.text(), "ab  ");

    // A later change of tab width must not affect the recorded inverse.
    session.set_settings(
        EditorSettings::default()
            .with_tab_key_behavior(TabKeyBehavior::Spaces)
            .with_tab_width(8),
    );
    session.undo();
    assert_eq!(session.text(), "ab");
    session.redo();
    assert_eq!(session.text(), "ab  ");
}

#[test]
fn test_indent_history_survives_mixed_whitespace() {
    let mut session = EditSession::with_text("\ta\n  b\nc", EditorSettings::default());
    session.set_selection(Position::new(0, 0), Position::new(2, 1));
    session.execute("unindent", ActionInput::None).unwrap();
    assert_eq!(session.text(), "a\nb\nc");

    session.undo();
    assert_eq!(session.text(), "\ta\n  b\nc");
}

#[test]
fn test_redo_is_cleared_by_new_edit() {
    let mut session = EditSession::default();
    session
        .execute("insertChunk", ActionInput::Text("abc".into()))
        .unwrap();
    session.undo();
    assert_eq!(session.redo_depth(), 1);

    session
        .execute("insertCharacter", ActionInput::Char('z'))
        .unwrap();
    assert_eq!(session.redo_depth(), 0);
    assert!(!session.redo());
}

fn random_text(rng: &mut StdRng) -> String {
    const ALPHABET: &[char] = &['a', 'b', ' ', '\t', '\n', 'é', '字'];
    let len = rng.gen_range(0..12);
    (0..len)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())])
        .collect()
}

fn random_position(rng: &mut StdRng, doc: &Document) -> Position {
    let row = rng.gen_range(0..doc.row_count());
    let col = rng.gen_range(0..=doc.row_length(row));
    Position::new(row, col)
}

#[test]
fn test_randomized_chunk_roundtrip() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let mut engine = ActionEngine::new(
        Document::from_text("alpha\n\tbeta\ngamma delta"),
        CursorPolicy::default(),
    );

    for _ in 0..500 {
        let before = engine.document().text();
        let op = if rng.gen_bool(0.5) {
            EditOp::InsertChunk {
                pos: random_position(&mut rng, engine.document()),
                text: random_text(&mut rng),
            }
        } else {
            EditOp::DeleteChunk {
                start: random_position(&mut rng, engine.document()),
                end: random_position(&mut rng, engine.document()),
                text: String::new(),
            }
        };

        let Some(resolved) = engine.apply(op) else {
            assert_eq!(engine.document().text(), before);
            continue;
        };
        let after = engine.document().text();

        engine.apply(resolved.inverse());
        assert_eq!(engine.document().text(), before);

        engine.apply(resolved);
        assert_eq!(engine.document().text(), after);
    }
}

#[test]
fn test_randomized_session_history() {
    let mut rng = StdRng::seed_from_u64(42);
    let settings = EditorSettings::default().with_undo_capacity(1000);
    let mut session = EditSession::with_text("one\ntwo\nthree", settings);
    let mut history = vec![session.text()];

    let actions = [
        "backspace",
        "deleteKey",
        "newline",
        "insertTab",
        "deleteWordLeft",
        "deleteWordRight",
        "killLine",
        "indent",
        "unindent",
    ];

    for _ in 0..200 {
        let row = rng.gen_range(0..session.document().row_count());
        let col = rng.gen_range(0..=session.document().row_length(row) + 2);
        session.set_cursor_position(Position::new(row, col));

        let key = if rng.gen_bool(0.3) {
            session
                .execute("insertCharacter", ActionInput::Char('q'))
                .unwrap();
            "insertCharacter"
        } else {
            let key = actions[rng.gen_range(0..actions.len())];
            session.execute(key, ActionInput::None).unwrap();
            key
        };

        if session.undo_depth() == history.len() {
            history.push(session.text());
        } else {
            assert_eq!(session.text(), *history.last().unwrap(), "{key} was a no-op");
        }
    }

    while session.undo() {
        history.pop();
        assert_eq!(session.text(), *history.last().unwrap());
    }
    assert_eq!(session.text(), "one\ntwo\nthree");
}
