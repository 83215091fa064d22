use orderlist::OrderError;
use orderlist::batch::{UploadedFile, process_batch_at};
use orderlist::project::StoredProject;
use orderlist::store::{CellKey, CellKind, ReorderOptions, RowPosition};
use orderlist::workspace::Workspace;

// Helper function to load two CSV files into a fresh workspace
fn loaded_workspace() -> Workspace {
    let files = vec![
        UploadedFile::new(
            "a.csv",
            b"Panel No,Material\nBadge 3,Customer: ORD-77\nP2,Fabric\nP3,Webbing\n".to_vec(),
        ),
        UploadedFile::new("b.csv", b"Panel No,Material\nQ1,Strap\nQ2,Buckle\n".to_vec()),
    ];
    let mut ws = Workspace::new();
    ws.apply_batch(process_batch_at(&files, &[], 5));
    ws
}

#[test]
fn test_apply_batch() {
    let ws = loaded_workspace();
    assert_eq!(ws.order_no(), "ORD-77");
    assert_eq!(ws.store().len(), 2);
    assert_eq!(ws.tables().merged.body.len(), 2);
    assert_eq!(ws.tables().webbing.body, vec![vec!["P3", "Webbing"]]);
}

#[test]
fn test_new_batch_clears_highlights() {
    let mut ws = loaded_workspace();
    ws.toggle_highlight(CellKey::new(CellKind::Panel, 0, 0));
    assert_eq!(ws.highlights().len(), 1);

    let files = vec![UploadedFile::new("c.csv", b"Panel No,Material\nZ1,Oak\n".to_vec())];
    ws.apply_batch(process_batch_at(&files, &[], 6));
    assert!(ws.highlights().is_empty());
    assert_eq!(ws.store().len(), 1);
}

#[test]
fn test_reorder_remerges() {
    let mut ws = loaded_workspace();
    let (from, to) = (RowPosition::new(0, 1), RowPosition::new(1, 1));
    let changed = ws.reorder(from, to, ReorderOptions::default());
    assert!(changed);
    assert_eq!(ws.tables().merged.body[1], vec!["Q2", "Buckle", "P2", "Fabric"]);

    assert!(!ws.reorder(RowPosition::new(0, 0), RowPosition::new(0, 0), ReorderOptions::default()));
}

#[test]
fn test_edit_heading_remerges() {
    let mut ws = loaded_workspace();
    ws.edit_heading(1, false, "Item");
    assert_eq!(ws.tables().merged.header, vec!["Panel No", "Material", "Panel No", "Item"]);
}

#[test]
fn test_save_validation() {
    let ws = Workspace::new();
    assert!(matches!(ws.to_project(), Err(OrderError::Validation(_))));

    let mut ws = Workspace::new();
    ws.set_order_info("ORD-1", "");
    match ws.to_project() {
        Err(OrderError::Validation(message)) => assert!(message.contains("at least one")),
        other => panic!("expected validation error, got {:?}", other),
    }

    let mut ws = loaded_workspace();
    ws.set_order_info("   ", "note");
    assert!(ws.to_project().is_err());
}

#[test]
fn test_project_round_trip_through_workspace() {
    let mut ws = loaded_workspace();
    ws.toggle_highlight(CellKey::new(CellKind::Material, 1, 0));
    ws.add_image("/uploads/ORD-77/a.png", (400, 200));
    let project = ws.to_project().unwrap();
    assert_eq!(project.highlighted_cells, vec!["material-1-0".to_string()]);

    let stored = StoredProject {
        id: "p1".to_string(),
        created_at: chrono::Utc::now(),
        updated_at: chrono::Utc::now(),
        project,
    };
    let mut restored = Workspace::new();
    restored.load_project(stored);

    assert!(restored.hide_panel_columns());
    assert_eq!(restored.order_no(), "ORD-77");
    assert_eq!(restored.tables(), ws.tables());
    assert_eq!(restored.images().len(), 1);
    assert_eq!(restored.images()[0].width, 300);
    assert!(restored.highlights().contains(&CellKey::new(CellKind::Material, 1, 0)));
}

#[test]
fn test_report_input() {
    let mut ws = loaded_workspace();
    ws.set_hide_panel_columns(true);
    let input = ws.report_input();
    assert_eq!(input.badge.as_deref(), Some("Badge 3"));
    assert!(input.hide_panel_columns);
    assert_eq!(input.merged, ws.tables().merged);
}

#[test]
fn test_image_operations() {
    let mut ws = loaded_workspace();
    let id = ws.add_image("/uploads/x/a.png", (100, 100)).id;
    assert_eq!(ws.move_image(&id, 40, 60).unwrap().x, 40);
    assert_eq!(ws.resize_image(&id, 20).unwrap().height, 120);
    assert!(matches!(ws.move_image("nope", 0, 0), Err(OrderError::NotFound(_))));
    assert!(ws.remove_image(&id).is_some());
    assert!(ws.images().is_empty());
}
