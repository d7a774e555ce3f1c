//! Content-addressed radix manifest.
//!
//! A prefix-compressed trie persisted one node per chunk. Forks are loaded
//! lazily on first descent, so partial reads touch only the nodes on the
//! path. Save runs post-order and reuses the stored reference of any
//! subtree that was not modified since it was loaded.
//!
//! Both the key-value store and the access history are thin layers over
//! this structure.

use std::collections::BTreeMap;
use std::future::Future;
use std::ops::ControlFlow;
use std::pin::Pin;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use cellar_core::Reference;

use crate::error::{Result, StoreError};
use crate::traits::{LoadSaver, Loader};

type BoxFut<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A value stored under a manifest key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque payload bytes.
    pub value: Vec<u8>,

    /// String metadata attached to the entry.
    pub metadata: BTreeMap<String, String>,
}

impl Entry {
    /// Create an entry holding only a payload.
    pub fn new(value: Vec<u8>) -> Self {
        Self {
            value,
            metadata: BTreeMap::new(),
        }
    }

    /// Create an entry with payload and metadata.
    pub fn with_metadata(value: Vec<u8>, metadata: BTreeMap<String, String>) -> Self {
        Self { value, metadata }
    }
}

/// Wire format of a persisted node.
#[derive(Serialize, Deserialize)]
struct NodeRepr {
    entry: Option<Entry>,
    forks: Vec<ForkRepr>,
}

#[derive(Serialize, Deserialize)]
struct ForkRepr {
    prefix: Vec<u8>,
    reference: Vec<u8>,
}

struct Node {
    entry: Option<Entry>,
    /// Forks keyed by the first byte of their prefix.
    forks: BTreeMap<u8, Fork>,
    dirty: bool,
    stored_as: Option<Reference>,
}

struct Fork {
    prefix: Vec<u8>,
    node: ForkNode,
}

enum ForkNode {
    Loaded(Box<Node>),
    Stored(Reference),
}

impl Node {
    fn new() -> Self {
        Self {
            entry: None,
            forks: BTreeMap::new(),
            dirty: true,
            stored_as: None,
        }
    }

    fn decode(bytes: &[u8]) -> Result<Self> {
        let repr: NodeRepr =
            ciborium::from_reader(bytes).map_err(|e| StoreError::Codec(e.to_string()))?;

        let mut forks = BTreeMap::new();
        for fork in repr.forks {
            let first = match fork.prefix.first() {
                Some(first) => *first,
                None => return Err(StoreError::Codec("empty fork prefix".into())),
            };
            let reference = Reference::try_from(fork.reference.as_slice())
                .map_err(|e| StoreError::Codec(e.to_string()))?;
            if forks
                .insert(
                    first,
                    Fork {
                        prefix: fork.prefix,
                        node: ForkNode::Stored(reference),
                    },
                )
                .is_some()
            {
                return Err(StoreError::Codec("duplicate fork prefix".into()));
            }
        }

        Ok(Self {
            entry: repr.entry,
            forks,
            dirty: false,
            stored_as: None,
        })
    }
}

impl Fork {
    /// The child node, loading it from storage on first access.
    async fn node_mut<L: Loader + ?Sized>(&mut self, ls: &L) -> Result<&mut Node> {
        let stored = match &self.node {
            ForkNode::Stored(reference) => Some(*reference),
            ForkNode::Loaded(_) => None,
        };
        if let Some(reference) = stored {
            let bytes = ls.load(&reference).await?;
            let mut loaded = Node::decode(&bytes)?;
            loaded.stored_as = Some(reference);
            self.node = ForkNode::Loaded(Box::new(loaded));
        }
        match &mut self.node {
            ForkNode::Loaded(node) => Ok(node),
            ForkNode::Stored(_) => Err(StoreError::Storage("fork load skipped".into())),
        }
    }
}

/// A lazily-loaded manifest bound to a load/save backend.
pub struct Manifest<LS> {
    root: Node,
    ls: LS,
}

impl<LS: LoadSaver> Manifest<LS> {
    /// Create an empty manifest.
    pub fn new(ls: LS) -> Self {
        Self {
            root: Node::new(),
            ls,
        }
    }

    /// Open a manifest from its root reference.
    pub async fn load(ls: LS, reference: Reference) -> Result<Self> {
        let bytes = ls.load(&reference).await?;
        let mut root = Node::decode(&bytes)?;
        root.stored_as = Some(reference);
        Ok(Self { root, ls })
    }

    /// Insert an entry, replacing any existing entry under the same key.
    pub async fn insert(&mut self, key: &[u8], entry: Entry) -> Result<()> {
        use std::collections::btree_map::Entry as MapEntry;

        let ls = &self.ls;
        let mut node = &mut self.root;
        let mut key = key;
        loop {
            node.dirty = true;
            if key.is_empty() {
                node.entry = Some(entry);
                return Ok(());
            }
            let fork = match node.forks.entry(key[0]) {
                MapEntry::Vacant(slot) => {
                    let mut leaf = Node::new();
                    leaf.entry = Some(entry);
                    slot.insert(Fork {
                        prefix: key.to_vec(),
                        node: ForkNode::Loaded(Box::new(leaf)),
                    });
                    return Ok(());
                }
                MapEntry::Occupied(slot) => slot.into_mut(),
            };

            let common = common_prefix_len(&fork.prefix, key);
            if common < fork.prefix.len() {
                // Split the fork: the shared prefix gets a fresh
                // intermediate node and the old subtree hangs below it.
                let child_first = fork.prefix[common];
                let child_prefix = fork.prefix.split_off(common);
                let child_node =
                    std::mem::replace(&mut fork.node, ForkNode::Loaded(Box::new(Node::new())));
                let mid = fork.node_mut(ls).await?;
                mid.forks.insert(
                    child_first,
                    Fork {
                        prefix: child_prefix,
                        node: child_node,
                    },
                );
            }

            let consumed = fork.prefix.len();
            node = fork.node_mut(ls).await?;
            key = &key[consumed..];
        }
    }

    /// Look up the entry stored under `key`.
    pub async fn get(&mut self, key: &[u8]) -> Result<Option<Entry>> {
        let ls = &self.ls;
        let mut node = &mut self.root;
        let mut key = key;
        loop {
            if key.is_empty() {
                return Ok(node.entry.clone());
            }
            let fork = match node.forks.get_mut(&key[0]) {
                None => return Ok(None),
                Some(fork) => fork,
            };
            if !key.starts_with(&fork.prefix) {
                return Ok(None);
            }
            let consumed = fork.prefix.len();
            node = fork.node_mut(ls).await?;
            key = &key[consumed..];
        }
    }

    /// Visit entries in lexicographic key order until the visitor breaks.
    pub async fn walk<F>(&mut self, visit: &mut F) -> Result<()>
    where
        F: FnMut(&[u8], &Entry) -> ControlFlow<()> + Send,
    {
        let mut path = Vec::new();
        walk_node(&mut self.root, &self.ls, &mut path, visit).await?;
        Ok(())
    }

    /// Persist all modified nodes and return the root reference.
    pub async fn save(&mut self) -> Result<Reference> {
        if !self.root.dirty {
            if let Some(reference) = self.root.stored_as {
                return Ok(reference);
            }
        }
        save_node(&mut self.root, &self.ls).await
    }
}

fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

fn walk_node<'a, LS, F>(
    node: &'a mut Node,
    ls: &'a LS,
    path: &'a mut Vec<u8>,
    visit: &'a mut F,
) -> BoxFut<'a, Result<ControlFlow<()>>>
where
    LS: LoadSaver,
    F: FnMut(&[u8], &Entry) -> ControlFlow<()> + Send,
{
    Box::pin(async move {
        if let Some(entry) = &node.entry {
            if visit(path, entry).is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        for fork in node.forks.values_mut() {
            let prefix_len = fork.prefix.len();
            path.extend_from_slice(&fork.prefix);
            let child = fork.node_mut(ls).await?;
            let flow = walk_node(child, ls, path, visit).await?;
            path.truncate(path.len() - prefix_len);
            if flow.is_break() {
                return Ok(ControlFlow::Break(()));
            }
        }
        Ok(ControlFlow::Continue(()))
    })
}

fn save_node<'a, LS: LoadSaver>(node: &'a mut Node, ls: &'a LS) -> BoxFut<'a, Result<Reference>> {
    Box::pin(async move {
        let mut forks = Vec::with_capacity(node.forks.len());
        for fork in node.forks.values_mut() {
            let reference = match &mut fork.node {
                ForkNode::Stored(reference) => *reference,
                ForkNode::Loaded(child) => match child.stored_as {
                    Some(reference) if !child.dirty => reference,
                    _ => save_node(child, ls).await?,
                },
            };
            forks.push(ForkRepr {
                prefix: fork.prefix.clone(),
                reference: reference.as_bytes().to_vec(),
            });
        }

        let repr = NodeRepr {
            entry: node.entry.clone(),
            forks,
        };
        let mut buf = Vec::new();
        ciborium::into_writer(&repr, &mut buf).map_err(|e| StoreError::Codec(e.to_string()))?;

        let reference = ls.save(Bytes::from(buf)).await?;
        node.dirty = false;
        node.stored_as = Some(reference);
        Ok(reference)
    })
}
