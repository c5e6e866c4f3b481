//! On-disk store fixture built through the public API only.

use rmpv::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use treemend::store::{SpaceDir, StoreLayout};
use treemend::tree::shard;

pub const SPACE_ID: &str = "0123456789abcdef0123456789abcdef";

pub fn encode(pairs: &[(&str, &str)]) -> Vec<u8> {
    let map = pairs
        .iter()
        .map(|(k, v)| {
            (
                Value::Binary(k.as_bytes().to_vec()),
                Value::Binary(v.as_bytes().to_vec()),
            )
        })
        .collect();
    let mut out = Vec::new();
    rmpv::encode::write_value(&mut out, &Value::Map(map)).unwrap();
    out
}

pub struct Node {
    pub id: String,
    pub record: PathBuf,
    pub record_dir: PathBuf,
    pub blob_id: Option<String>,
}

pub struct Store {
    _temp: TempDir,
    pub root: PathBuf,
    pub nodes: PathBuf,
    next: std::cell::Cell<u32>,
}

impl Store {
    /// A store with one project space named `Research` owned by `marie`.
    pub fn new() -> Self {
        let temp = TempDir::new().unwrap();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let space = root
            .join("storage/users/spaces")
            .join(&SPACE_ID[..2])
            .join(&SPACE_ID[2..]);
        std::fs::create_dir_all(space.join("nodes")).unwrap();
        std::fs::create_dir_all(space.join("blobs")).unwrap();
        let store = Store {
            _temp: temp,
            root,
            nodes: space.join("nodes"),
            next: std::cell::Cell::new(0),
        };
        store.record(
            SPACE_ID,
            &[
                ("user.ocis.space.name", "Research"),
                ("user.ocis.space.alias", "project/marie"),
                ("user.ocis.space.type", "project"),
                ("user.ocis.treesize", "1048576"),
            ],
        );
        store
    }

    pub fn layout(&self) -> StoreLayout {
        StoreLayout::open(&self.root).unwrap()
    }

    pub fn space(&self) -> SpaceDir {
        SpaceDir::from_nodes_dir(&self.nodes).unwrap()
    }

    pub fn record(&self, id: &str, pairs: &[(&str, &str)]) -> PathBuf {
        let mut path = self.nodes.join(shard(id).unwrap()).into_os_string();
        path.push(".mpk");
        let path = PathBuf::from(path);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, encode(pairs)).unwrap();
        path
    }

    fn next_id(&self) -> String {
        let n = self.next.get() + 1;
        self.next.set(n);
        format!("{:08x}{:024x}", 0xd000_0000u32 + n, n)
    }

    pub fn dir(&self, parent: &str, name: &str) -> Node {
        let id = self.next_id();
        let record = self.record(
            &id,
            &[
                ("user.ocis.name", name),
                ("user.ocis.parentid", parent),
                ("user.ocis.type", "2"),
            ],
        );
        let record_dir = self.nodes.join(shard(&id).unwrap());
        std::fs::create_dir_all(&record_dir).unwrap();
        Node {
            id,
            record,
            record_dir,
            blob_id: None,
        }
    }

    pub fn file(&self, parent: &str, name: &str, contents: Option<&[u8]>) -> Node {
        let id = self.next_id();
        let blob_id = format!("e{}", &id[1..]);
        let record = self.record(
            &id,
            &[
                ("user.ocis.name", name),
                ("user.ocis.parentid", parent),
                ("user.ocis.type", "1"),
                ("user.ocis.blobid", &blob_id),
            ],
        );
        let record_dir = self.nodes.join(shard(&id).unwrap());
        std::fs::write(&record_dir, b"").unwrap();
        if let Some(contents) = contents {
            let blob = self.space().blob_path(&blob_id).unwrap();
            std::fs::create_dir_all(blob.parent().unwrap()).unwrap();
            std::fs::write(blob, contents).unwrap();
        }
        Node {
            id,
            record,
            record_dir,
            blob_id: Some(blob_id),
        }
    }

    pub fn link_location(&self, parent: &str, name: &str) -> PathBuf {
        self.nodes.join(shard(parent).unwrap()).join(name)
    }

    pub fn path(&self) -> &Path {
        &self.root
    }
}
