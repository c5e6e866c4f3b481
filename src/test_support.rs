//! Throwaway on-disk stores for unit tests.

use crate::store::record::{fields, fixtures::encode};
use crate::store::{SpaceDir, StoreLayout};
use crate::tree::shard::shard;
use crate::types::NodeKind;
use std::cell::Cell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub(crate) const SPACE_ID: &str = "abcdef0123456789abcdef0123456789";

/// A node written by [`StoreFixture`].
#[derive(Debug, Clone)]
pub(crate) struct FixtureNode {
    pub id: String,
    pub parent_id: String,
    pub name: String,
    pub kind: NodeKind,
    pub blob_id: Option<String>,
    pub record: PathBuf,
    pub record_dir: PathBuf,
}

/// A store with a single personal space `einstein`.
pub(crate) struct StoreFixture {
    _temp: TempDir,
    root: PathBuf,
    nodes: PathBuf,
    counter: Cell<u32>,
}

impl StoreFixture {
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let space_dir = root
            .join("storage/users/spaces")
            .join(&SPACE_ID[..2])
            .join(&SPACE_ID[2..]);
        let nodes = space_dir.join("nodes");
        std::fs::create_dir_all(&nodes).unwrap();
        std::fs::create_dir_all(space_dir.join("blobs")).unwrap();
        std::fs::create_dir_all(root.join("storage/metadata/spaces")).unwrap();

        let fixture = StoreFixture {
            _temp: temp,
            root,
            nodes,
            counter: Cell::new(0),
        };
        fixture.write_record(
            SPACE_ID,
            &[
                (fields::SPACE_NAME, "Albert Einstein"),
                (fields::SPACE_ALIAS, "personal/einstein"),
                (fields::SPACE_TYPE, "personal"),
                (fields::TREE_SIZE, "2048"),
                (fields::TYPE, "2"),
            ],
        );
        fixture
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn nodes_dir(&self) -> &Path {
        &self.nodes
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::open(&self.root).unwrap()
    }

    pub fn space(&self) -> SpaceDir {
        SpaceDir::from_nodes_dir(&self.nodes).unwrap()
    }

    fn next_id(&self, high: u32) -> (String, u32) {
        let n = self.counter.get() + 1;
        self.counter.set(n);
        (format!("{:08x}{:024x}", high + n, n), n)
    }

    /// Record path for `id` (`<nodes>/<shard>.mpk`).
    pub fn record_path(&self, id: &str) -> PathBuf {
        let mut path = self.nodes.join(shard(id).unwrap()).into_os_string();
        path.push(".mpk");
        PathBuf::from(path)
    }

    pub fn write_raw_record(&self, id: &str, bytes: &[u8]) -> PathBuf {
        let path = self.record_path(id);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, bytes).unwrap();
        path
    }

    pub fn write_record(&self, id: &str, pairs: &[(&str, &str)]) -> PathBuf {
        self.write_raw_record(id, &encode(pairs))
    }

    /// A file node with a fresh blob id; its shard entry is an empty file.
    pub fn add_file(&self, parent_id: &str, name: &str) -> FixtureNode {
        let (id, n) = self.next_id(0xa000_0000);
        let blob_id = format!("{:08x}{:024x}", 0xb000_0000 + n, n);
        let record = self.write_record(
            &id,
            &[
                (fields::NAME, name),
                (fields::PARENT_ID, parent_id),
                (fields::TYPE, "1"),
                (fields::BLOB_ID, &blob_id),
            ],
        );
        let record_dir = self.nodes.join(shard(&id).unwrap());
        std::fs::write(&record_dir, b"").unwrap();
        FixtureNode {
            id,
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            kind: NodeKind::File,
            blob_id: Some(blob_id),
            record,
            record_dir,
        }
    }

    /// A directory node; its shard entry is a directory.
    pub fn add_dir(&self, parent_id: &str, name: &str) -> FixtureNode {
        let (id, _) = self.next_id(0xa000_0000);
        let record = self.write_record(
            &id,
            &[
                (fields::NAME, name),
                (fields::PARENT_ID, parent_id),
                (fields::TYPE, "2"),
            ],
        );
        let record_dir = self.nodes.join(shard(&id).unwrap());
        std::fs::create_dir_all(&record_dir).unwrap();
        FixtureNode {
            id,
            parent_id: parent_id.to_string(),
            name: name.to_string(),
            kind: NodeKind::Directory,
            blob_id: None,
            record,
            record_dir,
        }
    }

    /// Write content for a file node's blob.
    pub fn add_blob(&self, node: &FixtureNode, contents: &[u8]) -> PathBuf {
        let blob_id = node.blob_id.as_deref().unwrap();
        let path = self.space().blob_path(blob_id).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Where the node's symlink belongs: `<nodes>/<parent shard>/<name>`.
    pub fn expected_location(&self, node: &FixtureNode) -> PathBuf {
        self.nodes
            .join(shard(&node.parent_id).unwrap())
            .join(&node.name)
    }

    /// Create the node's symlink the way the store itself does.
    pub fn link(&self, node: &FixtureNode) {
        let location = self.expected_location(node);
        std::fs::create_dir_all(location.parent().unwrap()).unwrap();
        let target = Path::new("../../../../..").join(shard(&node.id).unwrap());
        std::os::unix::fs::symlink(target, location).unwrap();
    }
}
