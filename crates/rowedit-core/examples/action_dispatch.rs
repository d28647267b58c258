//! Action dispatch example
//!
//! Drives an `EditSession` through named actions the way a key-binding layer would.

use std::sync::Arc;

use rowedit_core::{
    ActionContext, ActionInput, ActionResult, EditOp, EditSession, EditorSettings, FnAction,
    Position, Selection,
};

fn main() {
    let mut session = EditSession::with_text(
        "fn main() {\n    println!(\"hi\");\n}",
        EditorSettings::default(),
    );

    println!("1. Caret motion");
    session.execute("gotoLine", ActionInput::Line(2)).unwrap();
    session
        .execute("moveToLineStart", ActionInput::None)
        .unwrap();
    println!("  caret (screen): {:?}", session.cursor_position());
    session
        .execute("moveWordRight", ActionInput::Extend)
        .unwrap();
    println!("  selected: {:?}\n", session.selection_text());

    println!("2. Editing");
    session
        .execute("insertChunk", ActionInput::Text("eprintln".into()))
        .unwrap();
    session.execute("moveToLineEnd", ActionInput::None).unwrap();
    session.execute("newline", ActionInput::None).unwrap();
    session
        .execute("insertChunk", ActionInput::Text("return;".into()))
        .unwrap();
    println!("{}\n", session.text());

    println!("3. Undo / redo");
    session.execute("undo", ActionInput::None).unwrap();
    session.execute("undo", ActionInput::None).unwrap();
    println!("  after two undos:\n{}", session.text());
    session.execute("redo", ActionInput::None).unwrap();
    println!("  undo depth {}, redo depth {}\n", session.undo_depth(), session.redo_depth());

    println!("4. Custom action");
    session.register(Arc::new(FnAction::new(
        "duplicateRow",
        |ctx: &mut ActionContext<'_>, _: &ActionInput| {
            let row = ctx.engine().model_position().row;
            let doc = ctx.engine().document();
            let text = format!("{}\n", doc.row_text(row));
            Ok(ctx.commit(EditOp::InsertChunk {
                pos: Position::new(row, 0),
                text,
            }))
        },
    )));
    let result = session.execute("duplicateRow", ActionInput::None).unwrap();
    assert_eq!(result, ActionResult::Success);
    println!("{}\n", session.text());

    println!("5. Document commands");
    session
        .execute(
            "select",
            ActionInput::Selection(Selection::new(Position::new(0, 0), Position::new(0, 2))),
        )
        .unwrap();
    if let ActionResult::Text(copied) = session.execute("copySelection", ActionInput::None).unwrap()
    {
        println!("  copied {copied:?}");
    }
    session.execute("sort", ActionInput::None).unwrap();
    println!("{}", session.text());
    println!("  dirty rows: {:?}", session.take_dirty_rows());
}
