use crate::integration::support::{Store, SPACE_ID};
use treemend::checkpoint::{
    CheckpointKey, CheckpointSource, CheckpointStore, CheckpointTag, FileCheckpointStore,
};
use treemend::store::{Record, SpaceInfo, StoreArea};
use treemend::tree::{find_root_parent, resolve_ancestry, TreeResolver};

#[test]
fn space_info_from_root_record() {
    let store = Store::new();
    let spaces = store.layout().discover_spaces(StoreArea::Data).unwrap();
    assert_eq!(spaces.len(), 1);
    assert_eq!(spaces[0].space_id.as_str(), SPACE_ID);

    let info = SpaceInfo::from_record(&spaces[0].root_record().unwrap()).unwrap();
    assert_eq!(info.user, "marie");
    assert_eq!(info.space_type, "project");
    assert_eq!(info.human_size(), "1.00 MiB");
}

#[test]
fn one_hop_flattening_is_preserved_in_shallow_mapping() {
    let store = Store::new();
    let a = store.dir(SPACE_ID, "a");
    let b = store.dir(&a.id, "b");
    let file = store.file(&b.id, "deep.txt", Some(b"x"));
    let space = store.space();
    let checkpoints = FileCheckpointStore::new(store.path().join("ckpt"));
    let resolver = TreeResolver::new(&space, &checkpoints, "t-", "marie");

    // only the immediate parent's name is used
    let shallow = resolver.resolve_space().unwrap();
    assert_eq!(shallow.mapping["deep.txt"].parent_path, "./b");
    assert_eq!(
        Some(&shallow.mapping["deep.txt"].blob_id),
        file.blob_id.as_ref()
    );

    let deep = resolver.resolve_space_deep().unwrap();
    assert_eq!(deep.mapping["deep.txt"].parent_path, "./a/b");
}

#[test]
fn file_checkpoint_hit_returns_persisted_mapping() {
    let store = Store::new();
    store.file(SPACE_ID, "one.txt", None);
    let space = store.space();
    let checkpoints = FileCheckpointStore::new(store.path().join("ckpt"));

    let first = TreeResolver::new(&space, &checkpoints, "run-", "marie")
        .resolve_space()
        .unwrap();
    assert_eq!(first.mapping_source, CheckpointSource::Computed);
    assert!(store.path().join("ckpt/run-files_marie").is_file());

    // remove the records; a checkpoint hit must not rescan
    std::fs::remove_dir_all(&space.nodes_dir).unwrap();
    let second = TreeResolver::new(&space, &checkpoints, "run-", "marie")
        .resolve_space()
        .unwrap();
    assert_eq!(second.mapping_source, CheckpointSource::Hit);
    assert_eq!(second.mapping, first.mapping);
}

#[test]
fn corrupt_checkpoint_triggers_recompute() {
    let store = Store::new();
    store.file(SPACE_ID, "one.txt", None);
    let space = store.space();
    let checkpoints = FileCheckpointStore::new(store.path().join("ckpt"));
    let key = CheckpointKey::new("run-", CheckpointTag::Files, "marie");
    checkpoints.save(&key, b"\x01").unwrap();

    let resolution = TreeResolver::new(&space, &checkpoints, "run-", "marie")
        .resolve_space()
        .unwrap();
    assert_eq!(resolution.mapping_source, CheckpointSource::Computed);
    assert_eq!(resolution.mapping["one.txt"].parent_path, ".");
}

#[test]
fn root_parent_of_nested_file() {
    let store = Store::new();
    let a = store.dir(SPACE_ID, "a");
    let b = store.dir(&a.id, "b");
    let file = store.file(&b.id, "f.txt", None);
    let space = store.space();
    let record = Record::decode_file(&file.record).unwrap();

    let ancestry = resolve_ancestry(&space, &record).unwrap();
    assert_eq!(ancestry.depth(), 2);
    let top = find_root_parent(&space, &record).unwrap();
    assert_eq!(top.name, "a");
    assert_eq!(top.id.as_str(), a.id);

    let top_level = Record::decode_file(&a.record).unwrap();
    assert_eq!(find_root_parent(&space, &top_level).unwrap().name, "a");
}
