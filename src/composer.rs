//! Builds [`Document`] node graphs from the scanner's token stream.
//!
//! Nodes are allocated before their children, and an anchor is registered as soon as its
//! node starts. An alias therefore always resolves to the anchored node's id, even from
//! inside that node, which is how cyclic graphs are represented.

use nohash_hasher::{IntMap, IntSet};

use crate::budget::{BudgetBreach, BudgetReport};
use crate::error::Error;
use crate::fingerprint::{Fingerprint, NodeIdentity};
use crate::location::Location;
use crate::node::{Document, Node, NodeId, NodeKind, ScalarStyle};
use crate::options::{DuplicateKeyPolicy, Options};
use crate::scanner::{AnchorId, Scanner, Token};
use crate::schema::{resolve_collection, resolve_scalar};

pub(crate) struct Composer<'a> {
    scanner: Scanner<'a>,
    options: &'a Options,
    doc: Document,
    /// Anchor id to node, for the current document only.
    anchors: IntMap<AnchorId, NodeId>,
    /// Alias uses per anchor, for the current document only.
    expansions: IntMap<AnchorId, usize>,
    /// Collections whose end token has not been seen yet.
    open: IntSet<NodeId>,
    /// Key identities for duplicate detection, shared by every mapping of the document.
    identity: NodeIdentity,
}

impl<'a> Composer<'a> {
    pub(crate) fn new(text: &'a str, options: &'a Options) -> Self {
        Self {
            scanner: Scanner::new(text, options.budget.clone()),
            options,
            doc: Document {
                nodes: Vec::new(),
                root: NodeId(0),
            },
            anchors: IntMap::default(),
            expansions: IntMap::default(),
            open: IntSet::default(),
            identity: NodeIdentity::new(
                options.max_depth,
                options.alias_limits.max_total_expanded_nodes,
            ),
        }
    }

    /// Compose every document in the stream.
    pub(crate) fn compose_all(&mut self) -> Result<Vec<Document>, Error> {
        let mut docs = Vec::new();
        while let Some((token, location)) = self.scanner.next()? {
            match token {
                Token::DocumentStart => docs.push(self.compose_document()?),
                other => {
                    return Err(Error::compose(format!(
                        "expected the start of a document, found {}",
                        describe(&other)
                    ))
                    .with_location(location));
                }
            }
        }
        Ok(docs)
    }

    /// Budget report of the scan, if a budget was configured.
    pub(crate) fn finish(self) -> Option<BudgetReport> {
        self.scanner.finish()
    }

    fn compose_document(&mut self) -> Result<Document, Error> {
        self.anchors.clear();
        self.expansions.clear();
        self.open.clear();
        self.identity.reset();
        self.doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };

        let root = if matches!(self.scanner.peek()?, Some(Token::DocumentEnd)) {
            let location = self.scanner.last_location();
            self.push(
                Node {
                    kind: NodeKind::Scalar {
                        value: String::new(),
                        style: ScalarStyle::Plain,
                    },
                    tag: resolve_scalar("", ScalarStyle::Plain).to_owned(),
                    explicit_tag: false,
                    anchor: None,
                    location,
                },
                0,
            )
        } else {
            self.compose_node(0)?
        };

        match self.scanner.next()? {
            Some((Token::DocumentEnd, _)) => {}
            Some((other, location)) => {
                return Err(Error::compose(format!(
                    "expected the end of the document, found {}",
                    describe(&other)
                ))
                .with_location(location));
            }
            None => return Err(self.unexpected_end()),
        }

        let mut doc = std::mem::replace(
            &mut self.doc,
            Document {
                nodes: Vec::new(),
                root: NodeId(0),
            },
        );
        doc.root = root;
        Ok(doc)
    }

    fn compose_node(&mut self, depth: usize) -> Result<NodeId, Error> {
        let Some((token, location)) = self.scanner.next()? else {
            return Err(self.unexpected_end());
        };
        if depth > self.options.max_depth {
            return Err(Error::depth(self.options.max_depth).with_location(location));
        }
        match token {
            Token::Alias { anchor } => self.resolve_alias(anchor, location),
            Token::Scalar {
                value,
                style,
                anchor,
                tag,
            } => {
                let (tag, explicit_tag) = match tag {
                    Some(tag) => (tag, true),
                    None => (resolve_scalar(&value, style).to_owned(), false),
                };
                let node = Node {
                    kind: NodeKind::Scalar { value, style },
                    tag,
                    explicit_tag,
                    anchor: (anchor != 0).then_some(anchor),
                    location,
                };
                Ok(self.push(node, anchor))
            }
            Token::SequenceStart { anchor, tag } => {
                let id = self.start_collection(true, anchor, tag, location);
                let mut items = Vec::new();
                loop {
                    match self.scanner.peek()? {
                        Some(Token::SequenceEnd) => {
                            self.scanner.next()?;
                            break;
                        }
                        Some(_) => items.push(self.compose_node(depth + 1)?),
                        None => return Err(self.unexpected_end()),
                    }
                }
                self.open.remove(&id);
                self.doc.nodes[id.0].kind = NodeKind::Sequence(items);
                Ok(id)
            }
            Token::MappingStart { anchor, tag } => {
                let id = self.start_collection(false, anchor, tag, location);
                let mut entries = Vec::new();
                loop {
                    match self.scanner.peek()? {
                        Some(Token::MappingEnd) => {
                            self.scanner.next()?;
                            break;
                        }
                        Some(_) => {
                            let key = self.compose_node(depth + 1)?;
                            let value = self.compose_node(depth + 1)?;
                            entries.push((key, value));
                        }
                        None => return Err(self.unexpected_end()),
                    }
                }
                self.check_duplicate_keys(&entries)?;
                self.open.remove(&id);
                self.doc.nodes[id.0].kind = NodeKind::Mapping(entries);
                Ok(id)
            }
            other => Err(Error::compose(format!("unexpected {}", describe(&other)))
                .with_location(location)),
        }
    }

    fn start_collection(
        &mut self,
        is_sequence: bool,
        anchor: AnchorId,
        tag: Option<String>,
        location: Location,
    ) -> NodeId {
        let (tag, explicit_tag) = match tag {
            Some(tag) => (tag, true),
            None => (resolve_collection(is_sequence).to_owned(), false),
        };
        let kind = if is_sequence {
            NodeKind::Sequence(Vec::new())
        } else {
            NodeKind::Mapping(Vec::new())
        };
        let id = self.push(
            Node {
                kind,
                tag,
                explicit_tag,
                anchor: (anchor != 0).then_some(anchor),
                location,
            },
            anchor,
        );
        self.open.insert(id);
        id
    }

    fn push(&mut self, node: Node, anchor: AnchorId) -> NodeId {
        let id = NodeId(self.doc.nodes.len());
        self.doc.nodes.push(node);
        if anchor != 0 {
            self.anchors.insert(anchor, id);
        }
        id
    }

    fn resolve_alias(&mut self, anchor: AnchorId, location: Location) -> Result<NodeId, Error> {
        let Some(&id) = self.anchors.get(&anchor) else {
            return Err(Error::compose("alias refers to an undefined anchor").with_location(location));
        };
        let uses = self.expansions.entry(anchor).or_insert(0);
        *uses += 1;
        if *uses > self.options.alias_limits.max_alias_expansions_per_anchor {
            let breach = BudgetBreach::AnchorExpansions {
                anchor,
                expansions: *uses,
            };
            return Err(Error::budget(breach, self.options.max_depth).with_location(location));
        }
        Ok(id)
    }

    /// Keys equal in the source are rejected under [`DuplicateKeyPolicy::Error`]; other
    /// policies are applied when the mapping is dispatched.
    ///
    /// Keys are compared by digest; full fingerprints are built only for colliding digests.
    fn check_duplicate_keys(&mut self, entries: &[(NodeId, NodeId)]) -> Result<(), Error> {
        if entries.len() < 2 || self.options.duplicate_keys != DuplicateKeyPolicy::Error {
            return Ok(());
        }
        let mut by_digest: IntMap<u64, Vec<usize>> = IntMap::default();
        let mut fingerprints: Vec<Option<Fingerprint>> = vec![None; entries.len()];
        for (index, (key, _)) in entries.iter().enumerate() {
            let digest = self.identity.digest(&self.doc, &self.open, *key)?;
            let earlier = by_digest.entry(digest).or_default();
            for &other in earlier.iter() {
                for i in [other, index] {
                    if fingerprints[i].is_none() {
                        let key = entries[i].0;
                        fingerprints[i] = Some(self.identity.fingerprint(&self.doc, &self.open, key)?);
                    }
                }
                if fingerprints[other] == fingerprints[index] {
                    return Err(Error::compose("duplicate mapping key")
                        .with_location(self.doc.node(*key).location));
                }
            }
            earlier.push(index);
        }
        Ok(())
    }

    fn unexpected_end(&self) -> Error {
        Error::compose("unexpected end of the token stream").with_location(self.scanner.last_location())
    }
}

fn describe(token: &Token) -> &'static str {
    match token {
        Token::DocumentStart => "document start",
        Token::DocumentEnd => "document end",
        Token::Scalar { .. } => "scalar",
        Token::SequenceStart { .. } => "sequence start",
        Token::SequenceEnd => "sequence end",
        Token::MappingStart { .. } => "mapping start",
        Token::MappingEnd => "mapping end",
        Token::Alias { .. } => "alias",
    }
}

/// Compose all documents of `text`, reporting the budget to the configured callback.
///
/// Errors are returned without snippets.
pub(crate) fn compose_stream(text: &str, options: &Options) -> Result<Vec<Document>, Error> {
    let mut composer = Composer::new(text, options);
    let result = composer.compose_all();
    let report = composer.finish();

    if let (Some(report), Some(callback)) = (&report, &options.budget_report) {
        let mut callback = callback.borrow_mut();
        (*callback)(report.clone());
    }
    let docs = result?;
    if let Some(BudgetReport {
        breached: Some(breach),
        ..
    }) = report
    {
        return Err(Error::budget(breach, options.max_depth));
    }
    Ok(docs)
}
