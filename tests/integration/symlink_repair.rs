use crate::integration::support::{Store, SPACE_ID};
use treemend::store::{Record, StoreArea};
use treemend::symlink::{audit, repair, AuditMode, RepairOutcome, SymlinkAuditor, SymlinkStatus};

#[test]
fn repair_round_trip_over_whole_store() {
    let store = Store::new();
    let docs = store.dir(SPACE_ID, "Docs");
    store.file(&docs.id, "cv.pdf", Some(b"%PDF"));
    store.file(SPACE_ID, "todo.md", None);

    let audit_before = SymlinkAuditor::new(AuditMode::Audit)
        .run(&store.layout(), StoreArea::Data)
        .unwrap();
    assert_eq!(audit_before.tally.theoretical, 3);
    assert_eq!(audit_before.tally.actual, 0);

    let repaired = SymlinkAuditor::new(AuditMode::Repair)
        .run(&store.layout(), StoreArea::Data)
        .unwrap();
    assert_eq!(repaired.tally.fixed, 3);

    let audit_after = SymlinkAuditor::new(AuditMode::Audit)
        .run(&store.layout(), StoreArea::Data)
        .unwrap();
    assert!(audit_after.tally.is_consistent());
    assert_eq!(audit_after.tally.actual, 3);
    assert!(audit_after.findings.is_empty());

    // the links resolve to the node entries
    let link = store.link_location(&docs.id, "cv.pdf");
    assert!(link.is_symlink());
    assert!(link.exists());
    let dir_link = store.link_location(SPACE_ID, "Docs");
    assert_eq!(
        dunce::canonicalize(&dir_link).unwrap(),
        dunce::canonicalize(&docs.record_dir).unwrap()
    );
}

#[test]
fn correct_directory_link_is_left_alone() {
    let store = Store::new();
    let photos = store.dir(SPACE_ID, "Photos");
    let record = Record::decode_file(&photos.record).unwrap();

    let (_, first) = repair(&record, &photos.record_dir).unwrap().unwrap();
    assert!(matches!(first, RepairOutcome::Fixed { .. }));
    let link = store.link_location(SPACE_ID, "Photos");
    let target = std::fs::read_link(&link).unwrap();

    let (report, second) = repair(&record, &photos.record_dir).unwrap().unwrap();
    assert_eq!(report.status(), &SymlinkStatus::Correct);
    assert_eq!(second, RepairOutcome::AlreadyCorrect);
    assert_eq!(std::fs::read_link(&link).unwrap(), target);
}

#[test]
fn sentinel_parent_excluded_from_counts() {
    let store = Store::new();
    let path = store.record(
        "dddddddd00000000000000000000000f",
        &[
            ("user.ocis.name", "stray"),
            ("user.ocis.parentid", "N/A"),
            ("user.ocis.type", "1"),
        ],
    );
    let record = Record::decode_file(&path).unwrap();
    assert!(audit(&record, std::path::Path::new("/unused")).unwrap().is_none());

    let summary = SymlinkAuditor::new(AuditMode::Audit)
        .run(&store.layout(), StoreArea::Data)
        .unwrap();
    assert_eq!(summary.tally.theoretical, 0);
    assert_eq!(summary.tally.actual, 0);
}
