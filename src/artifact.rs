//! Persisted form of a [`HuffmanTree`].
//!
//! The artifact is a snapshot of the node arena plus the root handle. It is
//! written as MessagePack. Loading validates the structure before a tree is
//! handed back, so the decoder never walks a malformed arena.

use log::debug;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::hash::Hash;
use std::io::{Read, Write};

use crate::error::{Error, Result};
use crate::tree::{HuffmanTree, Node, NodeId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeArtifact<Symbol> {
    nodes: Vec<Node<Symbol>>,
    root: NodeId,
}

impl<Symbol> TreeArtifact<Symbol> {
    pub fn nodes(&self) -> &[Node<Symbol>] {
        &self.nodes
    }

    pub fn root(&self) -> NodeId {
        self.root
    }
}

impl<Symbol> HuffmanTree<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    pub fn to_artifact(&self) -> TreeArtifact<Symbol> {
        TreeArtifact {
            nodes: self.nodes().to_vec(),
            root: self.root(),
        }
    }

    /// Rebuilds a tree from an artifact, failing with
    /// [`Error::CorruptArtifact`] if it does not describe a proper prefix tree.
    pub fn from_artifact(artifact: TreeArtifact<Symbol>) -> Result<Self> {
        validate(&artifact)?;
        let TreeArtifact { nodes, root } = artifact;
        Ok(HuffmanTree::from_parts(nodes, root))
    }

    pub fn save<W: Write>(&self, writer: &mut W) -> Result<()>
    where
        Symbol: Serialize,
    {
        save_tree(&self.to_artifact(), writer)
    }

    pub fn load<R: Read>(reader: R) -> Result<Self>
    where
        Symbol: DeserializeOwned,
    {
        HuffmanTree::from_artifact(load_tree(reader)?)
    }
}

pub fn save_tree<Symbol, W>(artifact: &TreeArtifact<Symbol>, writer: &mut W) -> Result<()>
where
    Symbol: Serialize,
    W: Write,
{
    let bytes =
        rmp_serde::to_vec(artifact).map_err(|e| Error::corrupt_artifact(e.to_string()))?;
    writer.write_all(&bytes)?;
    debug!("saved tree artifact with {} nodes", artifact.nodes.len());
    Ok(())
}

pub fn load_tree<Symbol, R>(mut reader: R) -> Result<TreeArtifact<Symbol>>
where
    Symbol: DeserializeOwned,
    R: Read,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    let artifact: TreeArtifact<Symbol> =
        rmp_serde::from_slice(&bytes).map_err(|e| Error::corrupt_artifact(e.to_string()))?;
    debug!("loaded tree artifact with {} nodes", artifact.nodes.len());
    Ok(artifact)
}

fn validate<Symbol: Hash + Eq>(artifact: &TreeArtifact<Symbol>) -> Result<()> {
    let nodes = &artifact.nodes;
    let n = nodes.len();

    if n == 0 {
        return Err(Error::corrupt_artifact("artifact has no nodes"));
    }
    if artifact.root.0 >= n {
        return Err(Error::corrupt_artifact(format!(
            "root {} out of range for {} nodes",
            artifact.root.0, n
        )));
    }

    let mut referenced = vec![false; n];
    let mut symbols = HashSet::new();

    for (i, node) in nodes.iter().enumerate() {
        match node {
            Node::Leaf { symbol, .. } => {
                if !symbols.insert(symbol) {
                    return Err(Error::corrupt_artifact(format!(
                        "leaf {i} repeats a symbol"
                    )));
                }
            }
            Node::Internal {
                weight,
                left,
                right,
            } => {
                let mut sum = 0usize;
                for child in [left, right] {
                    let c = child.0;
                    if c >= n {
                        return Err(Error::corrupt_artifact(format!(
                            "node {i} points at {c}, out of range for {n} nodes"
                        )));
                    }
                    if c == artifact.root.0 || referenced[c] {
                        return Err(Error::corrupt_artifact(format!(
                            "node {c} has more than one parent"
                        )));
                    }
                    referenced[c] = true;
                    sum = sum.saturating_add(nodes[c].weight());
                }
                if sum != *weight {
                    return Err(Error::corrupt_artifact(format!(
                        "node {i} has weight {weight} but its children sum to {sum}"
                    )));
                }
            }
        }
    }

    // every node but the root has exactly one parent; anything not reached
    // from the root is a detached cycle
    let mut reached = 0;
    let mut stack = vec![artifact.root];
    while let Some(id) = stack.pop() {
        reached += 1;
        if let Node::Internal { left, right, .. } = &nodes[id.0] {
            stack.push(*left);
            stack.push(*right);
        }
    }
    if reached != n {
        return Err(Error::corrupt_artifact(format!(
            "{} nodes are unreachable from the root",
            n - reached
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::calculate_frequencies;

    fn tree(text: &[u8]) -> HuffmanTree<u8> {
        HuffmanTree::build(&calculate_frequencies(text)).unwrap()
    }

    fn leaf(symbol: u8, weight: usize) -> Node<u8> {
        Node::Leaf { symbol, weight }
    }

    fn internal(weight: usize, left: usize, right: usize) -> Node<u8> {
        Node::Internal {
            weight,
            left: NodeId(left),
            right: NodeId(right),
        }
    }

    fn artifact(nodes: Vec<Node<u8>>, root: usize) -> TreeArtifact<u8> {
        TreeArtifact {
            nodes,
            root: NodeId(root),
        }
    }

    #[test]
    fn artifact_rebuilds_identical_tree() {
        let original = tree(b"mississippi river");
        let rebuilt = HuffmanTree::from_artifact(original.to_artifact()).unwrap();

        assert_eq!(rebuilt.nodes(), original.nodes());
        assert_eq!(rebuilt.root(), original.root());
        assert_eq!(rebuilt.codes(), original.codes());
    }

    #[test]
    fn save_then_load() {
        let original = tree(b"abracadabra");
        let mut buf = Vec::new();
        original.save(&mut buf).unwrap();

        let loaded = HuffmanTree::<u8>::load(&buf[..]).unwrap();
        assert_eq!(loaded.nodes(), original.nodes());
        assert_eq!(loaded.codes(), original.codes());
    }

    #[test]
    fn garbage_bytes_are_corrupt() {
        let res = HuffmanTree::<u8>::load(&[0xc1, 0x00, 0x13][..]);
        assert!(matches!(res, Err(Error::CorruptArtifact(_))));
    }

    #[test]
    fn truncated_artifact_is_corrupt() {
        let mut buf = Vec::new();
        tree(b"abracadabra").save(&mut buf).unwrap();
        buf.truncate(buf.len() / 2);

        let res = HuffmanTree::<u8>::load(&buf[..]);
        assert!(matches!(res, Err(Error::CorruptArtifact(_))));
    }

    #[test]
    fn lone_leaf_is_valid() {
        let t = HuffmanTree::from_artifact(artifact(vec![leaf(b'x', 3)], 0)).unwrap();
        assert_eq!(t.symbol_count(), 1);
    }

    #[rustfmt::skip]
    #[test]
    fn structural_defects_are_rejected() {
        let cases = vec![
            artifact(vec![], 0),
            artifact(vec![leaf(b'a', 1)], 1),
            artifact(vec![leaf(b'a', 1), leaf(b'b', 1), internal(2, 0, 5)], 2),
            artifact(vec![leaf(b'a', 1), leaf(b'b', 1), internal(3, 0, 1)], 2),
            artifact(vec![leaf(b'a', 1), leaf(b'a', 1), internal(2, 0, 1)], 2),
            artifact(vec![leaf(b'a', 1), internal(2, 0, 0)], 1),
            artifact(vec![leaf(b'a', 1), leaf(b'b', 1), internal(2, 0, 1), leaf(b'c', 1)], 2),
            artifact(vec![leaf(b'a', 1), leaf(b'b', 1), internal(2, 0, 2)], 2),
        ];

        for a in cases {
            let res = HuffmanTree::from_artifact(a.clone());
            assert!(matches!(res, Err(Error::CorruptArtifact(_))), "{a:?} accepted");
        }
    }
}
