//! Live block-document model and its observable store.
//!
//! A [`Document`] is an ordered tree of [`Block`]s. The TOC machinery never
//! owns the document: it reads heading nodes at authoring time and annotates
//! them with identifier attributes at render time. [`DocumentStore`] is the
//! injected handle through which a live document is read, mutated, and
//! observed. [`DocumentStore::watch`] hands out a cancellable
//! [`Subscription`] instead of relying on any ambient global lookup.

use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock, RwLockReadGuard};

use crate::event::DocEvent;

/// Stable identity of a block within one document, assigned at insertion and
/// never reused.
pub type BlockId = u64;

/// Heading level participating in TOC scans. The model carries levels 1-6,
/// but only level-2 headings are collected by [`Document::headings_in`].
pub const TOC_HEADING_LEVEL: u8 = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockKind {
    /// Sectional container; the only block kind that nests children.
    Section,
    Heading { level: u8, text: String },
    Paragraph(String),
    /// Position marker of a TOC instance.
    Toc,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: BlockId,
    pub kind: BlockKind,
    /// Identifier attribute assigned at final render, absent while authoring.
    pub html_id: Option<String>,
    pub children: Vec<Block>,
}

impl Block {
    fn new(id: BlockId, kind: BlockKind) -> Self {
        Block {
            id,
            kind,
            html_id: None,
            children: Vec::new(),
        }
    }

    pub fn is_section(&self) -> bool {
        matches!(self.kind, BlockKind::Section)
    }
}

/// Which part of a document a TOC instance observes and scans.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanScope {
    /// The whole document; the fallback when a TOC block has no enclosing
    /// section.
    Document,
    /// The subtree rooted at one sectional container.
    Section(BlockId),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
    next_id: BlockId,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn roots(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Insert a new block under `parent` (`None` = document root) at `index`
    /// (`None` = append). Returns the new block's id, or `None` when the
    /// parent is missing or is not a sectional container.
    pub fn insert(
        &mut self,
        parent: Option<BlockId>,
        index: Option<usize>,
        kind: BlockKind,
    ) -> Option<BlockId> {
        self.next_id += 1;
        let block = Block::new(self.next_id, kind);
        let id = block.id;
        let siblings = match parent {
            None => &mut self.blocks,
            Some(pid) => {
                let parent_block = find_mut(&mut self.blocks, pid)?;
                if !parent_block.is_section() {
                    return None;
                }
                &mut parent_block.children
            }
        };
        let at = index.unwrap_or(siblings.len()).min(siblings.len());
        siblings.insert(at, block);
        Some(id)
    }

    /// Remove the block `id` and its subtree. Returns the parent it was
    /// detached from on success.
    pub fn remove(&mut self, id: BlockId) -> Option<Option<BlockId>> {
        remove_in(&mut self.blocks, None, id)
    }

    /// Replace the text of the heading block `id`. False when the block is
    /// missing or not a heading.
    pub fn set_heading_text(&mut self, id: BlockId, text: &str) -> bool {
        match find_mut(&mut self.blocks, id) {
            Some(Block {
                kind: BlockKind::Heading { text: current, .. },
                ..
            }) => {
                *current = text.to_string();
                true
            }
            _ => false,
        }
    }

    /// Move a child of `parent` from sibling position `from` to `to`.
    pub fn reorder(&mut self, parent: Option<BlockId>, from: usize, to: usize) -> bool {
        let siblings = match parent {
            None => &mut self.blocks,
            Some(pid) => match find_mut(&mut self.blocks, pid) {
                Some(block) if block.is_section() => &mut block.children,
                _ => return false,
            },
        };
        if from >= siblings.len() || to >= siblings.len() {
            return false;
        }
        let moved = siblings.remove(from);
        siblings.insert(to, moved);
        true
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        find(&self.blocks, id)
    }

    pub fn contains(&self, id: BlockId) -> bool {
        self.block(id).is_some()
    }

    /// Whether `id` lies within the subtree rooted at `ancestor` (inclusive).
    pub fn is_within(&self, ancestor: BlockId, id: BlockId) -> bool {
        match self.block(ancestor) {
            Some(root) => find(std::slice::from_ref(root), id).is_some(),
            None => false,
        }
    }

    /// Resolve the scan scope of the TOC instance at `toc_block`: the nearest
    /// enclosing sectional container, falling back to the whole document.
    /// `None` when the block is not in the tree; callers treat that as a
    /// no-op, not an error.
    pub fn scope_of(&self, toc_block: BlockId) -> Option<ScanScope> {
        let ancestors = path_to(&self.blocks, toc_block)?;
        let nearest_section = ancestors
            .iter()
            .rev()
            .find(|id| self.block(**id).is_some_and(Block::is_section));
        Some(match nearest_section {
            Some(section) => ScanScope::Section(*section),
            None => ScanScope::Document,
        })
    }

    /// Level-2 headings within `scope`, in document order.
    pub fn headings_in(&self, scope: ScanScope) -> Vec<(BlockId, &str)> {
        let mut out = Vec::new();
        let roots: &[Block] = match scope {
            ScanScope::Document => &self.blocks,
            ScanScope::Section(id) => match self.block(id) {
                Some(block) => std::slice::from_ref(block),
                None => return out,
            },
        };
        for root in roots {
            collect_headings(root, &mut out);
        }
        out
    }

    /// Pre-order traversal over every block.
    pub fn walk(&self, f: &mut dyn FnMut(&Block)) {
        for block in &self.blocks {
            walk_in(block, f);
        }
    }

    /// Pre-order mutable traversal. Children may be visited after the parent
    /// was mutated, never the other way around.
    pub fn walk_mut(&mut self, f: &mut dyn FnMut(&mut Block)) {
        for block in &mut self.blocks {
            walk_mut_in(block, f);
        }
    }
}

fn find(blocks: &[Block], id: BlockId) -> Option<&Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(hit) = find(&block.children, id) {
            return Some(hit);
        }
    }
    None
}

fn find_mut(blocks: &mut [Block], id: BlockId) -> Option<&mut Block> {
    for block in blocks {
        if block.id == id {
            return Some(block);
        }
        if let Some(hit) = find_mut(&mut block.children, id) {
            return Some(hit);
        }
    }
    None
}

fn remove_in(
    blocks: &mut Vec<Block>,
    parent: Option<BlockId>,
    id: BlockId,
) -> Option<Option<BlockId>> {
    if let Some(at) = blocks.iter().position(|b| b.id == id) {
        blocks.remove(at);
        return Some(parent);
    }
    for block in blocks {
        let pid = block.id;
        if let Some(found) = remove_in(&mut block.children, Some(pid), id) {
            return Some(found);
        }
    }
    None
}

/// Ancestor chain of `id`, root-most first, excluding `id` itself.
fn path_to(blocks: &[Block], id: BlockId) -> Option<Vec<BlockId>> {
    for block in blocks {
        if block.id == id {
            return Some(Vec::new());
        }
        if let Some(mut tail) = path_to(&block.children, id) {
            tail.insert(0, block.id);
            return Some(tail);
        }
    }
    None
}

fn collect_headings<'a>(block: &'a Block, out: &mut Vec<(BlockId, &'a str)>) {
    if let BlockKind::Heading { level, text } = &block.kind {
        if *level == TOC_HEADING_LEVEL {
            out.push((block.id, text.as_str()));
        }
    }
    for child in &block.children {
        collect_headings(child, out);
    }
}

fn walk_in(block: &Block, f: &mut dyn FnMut(&Block)) {
    f(block);
    for child in &block.children {
        walk_in(child, f);
    }
}

fn walk_mut_in(block: &mut Block, f: &mut dyn FnMut(&mut Block)) {
    f(block);
    for child in &mut block.children {
        walk_mut_in(child, f);
    }
}

type WatchCallback = Box<dyn FnMut(&[DocEvent]) + Send>;

struct WatchEntry {
    id: u64,
    scope: ScanScope,
    /// Taken out for the duration of a delivery so a callback can register
    /// or cancel subscriptions without deadlocking the watcher table.
    callback: Option<WatchCallback>,
}

/// Shared handle to a live, observable document.
///
/// All mutations funnel through [`DocumentStore::commit`], which applies an
/// edit closure under the write lock and then delivers the resulting
/// [`DocEvent`] batch to matching watchers: synchronously, exactly once per
/// commit, with no document lock held. Several edits inside one commit
/// coalesce into a single notification.
pub struct DocumentStore {
    doc: RwLock<Document>,
    watchers: Mutex<Vec<WatchEntry>>,
    next_watch: Mutex<u64>,
    /// Handed to subscriptions so a guard outliving the store unsubscribes
    /// into nothing instead of keeping the store alive.
    self_ref: Weak<DocumentStore>,
}

impl DocumentStore {
    pub fn new(doc: Document) -> Arc<Self> {
        Arc::new_cyclic(|weak| DocumentStore {
            doc: RwLock::new(doc),
            watchers: Mutex::new(Vec::new()),
            next_watch: Mutex::new(0),
            self_ref: weak.clone(),
        })
    }

    /// Read access to the current document state.
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.doc.read()
    }

    /// Subscribe `callback` to change batches touching `scope`. The
    /// subscription lives until the returned guard is cancelled or dropped.
    ///
    /// Callbacks run synchronously inside [`DocumentStore::commit`] and may
    /// re-read the document; they must not commit further edits.
    pub fn watch(
        &self,
        scope: ScanScope,
        callback: impl FnMut(&[DocEvent]) + Send + 'static,
    ) -> Subscription {
        let id = {
            let mut next = self.next_watch.lock();
            *next += 1;
            *next
        };
        self.watchers.lock().push(WatchEntry {
            id,
            scope,
            callback: Some(Box::new(callback)),
        });
        tracing::trace!("Watcher {id} registered for {scope:?}");
        Subscription {
            id,
            store: self.self_ref.clone(),
        }
    }

    /// Apply `edit` to the document and notify watchers with the events it
    /// reports. An empty event list skips notification entirely.
    pub fn commit<F>(&self, edit: F)
    where
        F: FnOnce(&mut Document) -> Vec<DocEvent>,
    {
        let events = {
            let mut doc = self.doc.write();
            edit(&mut doc)
        };
        if events.is_empty() {
            return;
        }
        self.notify(&events);
    }

    /// Insert a block and notify. Returns the new id, or `None` when the
    /// parent cannot hold children.
    pub fn insert_block(
        &self,
        parent: Option<BlockId>,
        index: Option<usize>,
        kind: BlockKind,
    ) -> Option<BlockId> {
        let mut created = None;
        self.commit(|doc| match doc.insert(parent, index, kind) {
            Some(id) => {
                created = Some(id);
                vec![DocEvent::BlockInserted { block: id, parent }]
            }
            None => Vec::new(),
        });
        created
    }

    pub fn remove_block(&self, id: BlockId) -> bool {
        let mut removed = false;
        self.commit(|doc| match doc.remove(id) {
            Some(parent) => {
                removed = true;
                vec![DocEvent::BlockRemoved { block: id, parent }]
            }
            None => Vec::new(),
        });
        removed
    }

    pub fn set_heading_text(&self, id: BlockId, text: &str) -> bool {
        let mut edited = false;
        self.commit(|doc| {
            if doc.set_heading_text(id, text) {
                edited = true;
                vec![DocEvent::TextEdited { block: id }]
            } else {
                Vec::new()
            }
        });
        edited
    }

    pub fn reorder_children(&self, parent: Option<BlockId>, from: usize, to: usize) -> bool {
        let mut moved = false;
        self.commit(|doc| {
            if doc.reorder(parent, from, to) {
                moved = true;
                vec![DocEvent::ChildrenReordered { parent }]
            } else {
                Vec::new()
            }
        });
        moved
    }

    fn unwatch(&self, id: u64) {
        self.watchers.lock().retain(|w| w.id != id);
        tracing::trace!("Watcher {id} released");
    }

    fn notify(&self, events: &[DocEvent]) {
        let matched: Vec<u64> = {
            let doc = self.doc.read();
            let watchers = self.watchers.lock();
            watchers
                .iter()
                .filter(|w| w.callback.is_some() && scope_matches(&doc, w.scope, events))
                .map(|w| w.id)
                .collect()
        };
        for id in matched {
            let taken = {
                let mut watchers = self.watchers.lock();
                watchers
                    .iter_mut()
                    .find(|w| w.id == id)
                    .and_then(|w| w.callback.take())
            };
            let Some(mut callback) = taken else {
                continue;
            };
            callback(events);
            let mut watchers = self.watchers.lock();
            if let Some(entry) = watchers.iter_mut().find(|w| w.id == id) {
                entry.callback = Some(callback);
            }
        }
    }
}

/// Whether a batch touches the watcher's scope. Events whose blocks can no
/// longer be resolved (removals, moved subtrees) are delivered: the watcher
/// recomputes from current state and no-ops when nothing in its scope
/// actually changed.
fn scope_matches(doc: &Document, scope: ScanScope, events: &[DocEvent]) -> bool {
    match scope {
        ScanScope::Document => true,
        ScanScope::Section(root) => events.iter().any(|ev| {
            match (ev.block(), ev.container()) {
                (Some(block), _) if doc.contains(block) => doc.is_within(root, block),
                (_, Some(container)) if doc.contains(container) => {
                    container == root || doc.is_within(root, container)
                }
                // Root-level reorders and unresolvable blocks.
                _ => true,
            }
        }),
    }
}

/// Cancellation guard for a [`DocumentStore::watch`] registration.
///
/// Dropping the guard unsubscribes; [`Subscription::cancel`] is the explicit
/// spelling for session teardown.
#[must_use = "dropping a Subscription immediately unsubscribes its callback"]
pub struct Subscription {
    id: u64,
    store: Weak<DocumentStore>,
}

impl Subscription {
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(store) = self.store.upgrade() {
            store.unwatch(self.id);
        }
    }
}
