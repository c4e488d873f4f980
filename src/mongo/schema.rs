use std::collections::HashSet;

use mongodb::bson::{Bson, Document, doc};
use mongodb::sync::Database;

use crate::mongo::bson_format;

pub type NodeId = usize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Database,
    Collection,
    Object,
    Array,
    Scalar(&'static str),
}

#[derive(Debug, Clone)]
pub struct SchemaNode {
    pub label: String,
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Inferred structure of a database, stored as an arena indexed by `NodeId`.
/// Node 0 is always the database root.
#[derive(Debug, Clone)]
pub struct SchemaTree {
    nodes: Vec<SchemaNode>,
    collapsed: HashSet<NodeId>,
}

pub struct SchemaRow<'a> {
    pub id: NodeId,
    pub depth: usize,
    pub node: &'a SchemaNode,
    pub expanded: bool,
}

/// Where the schema builder gets collection names and sample documents from.
pub trait SchemaSource {
    fn collection_names(&self) -> Result<Vec<String>, String>;
    fn sample_document(&self, collection: &str) -> Result<Option<Document>, String>;
}

impl SchemaSource for Database {
    fn collection_names(&self) -> Result<Vec<String>, String> {
        self.list_collection_names().run().map_err(|err| err.to_string())
    }

    fn sample_document(&self, collection: &str) -> Result<Option<Document>, String> {
        self.collection::<Document>(collection)
            .find_one(doc! {})
            .run()
            .map_err(|err| err.to_string())
    }
}

impl SchemaTree {
    pub const ROOT: NodeId = 0;

    pub fn new(db_name: &str) -> Self {
        let root = SchemaNode {
            label: db_name.to_string(),
            kind: NodeKind::Database,
            parent: None,
            children: Vec::new(),
        };
        Self { nodes: vec![root], collapsed: HashSet::new() }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&SchemaNode> {
        self.nodes.get(id)
    }

    pub fn add_child(&mut self, parent: NodeId, label: String, kind: NodeKind) -> NodeId {
        let id = self.nodes.len();
        self.nodes.push(SchemaNode { label, kind, parent: Some(parent), children: Vec::new() });
        self.nodes[parent].children.push(id);
        id
    }

    /// Adds one child per field of `document` under `parent`.
    ///
    /// Arrays are described by their first element only, and only when that
    /// element is itself a document.
    pub fn add_document(&mut self, parent: NodeId, document: &Document) {
        for (key, value) in document {
            match value {
                Bson::Document(inner) => {
                    let id = self.add_child(parent, format!("{key} (Object)"), NodeKind::Object);
                    self.add_document(id, inner);
                }
                Bson::Array(items) => {
                    let id = self.add_child(parent, format!("{key} (Array)"), NodeKind::Array);
                    if let Some(Bson::Document(first)) = items.first() {
                        self.add_document(id, first);
                    }
                }
                other => {
                    let ty = bson_format::type_name(other);
                    self.add_child(parent, format!("{key}: {ty}"), NodeKind::Scalar(ty));
                }
            }
        }
    }

    pub fn is_expanded(&self, id: NodeId) -> bool {
        !self.collapsed.contains(&id)
    }

    pub fn toggle(&mut self, id: NodeId) {
        let has_children = self.node(id).map(|node| !node.children.is_empty()).unwrap_or(false);
        if !has_children {
            return;
        }
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
    }

    /// Rows in display order, skipping the descendants of collapsed nodes.
    pub fn visible_rows(&self) -> Vec<SchemaRow<'_>> {
        let mut rows = Vec::new();
        self.collect_rows(&mut rows, Self::ROOT);
        rows
    }

    /// Distance from the root, following parent links.
    pub fn depth(&self, id: NodeId) -> usize {
        std::iter::successors(self.node(id).and_then(|node| node.parent), |parent| {
            self.nodes[*parent].parent
        })
        .count()
    }

    fn collect_rows<'a>(&'a self, rows: &mut Vec<SchemaRow<'a>>, id: NodeId) {
        let node = &self.nodes[id];
        let expanded = self.is_expanded(id);
        rows.push(SchemaRow { id, depth: self.depth(id), node, expanded });
        if expanded {
            for child in &node.children {
                self.collect_rows(rows, *child);
            }
        }
    }
}

/// Builds the schema tree for `db_name`. A failure part way through is logged
/// and the nodes added so far are kept.
pub fn build_schema_tree<S: SchemaSource + ?Sized>(db_name: &str, source: &S) -> SchemaTree {
    let mut tree = SchemaTree::new(db_name);
    match populate(&mut tree, source) {
        Ok(()) => log::info!("Schema tree for '{db_name}' built with {} nodes", tree.len()),
        Err(error) => log::error!("Failed to load database structure: {error}"),
    }
    tree
}

fn populate<S: SchemaSource + ?Sized>(tree: &mut SchemaTree, source: &S) -> Result<(), String> {
    for collection in source.collection_names()? {
        let id = tree.add_child(SchemaTree::ROOT, collection.clone(), NodeKind::Collection);
        if let Some(sample) = source.sample_document(&collection)? {
            tree.add_document(id, &sample);
        }
    }
    Ok(())
}
