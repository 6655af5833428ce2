use bitvec::prelude::*;
use derivative::Derivative;
use log::{debug, trace};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::hash::Hash;

use crate::decoder::Decoder;
use crate::encoder::Encoder;
use crate::error::{Error, Result};
use crate::frequency::FrequencyTable;

/// A code word: the path from the root to a leaf, `false` for left and `true` for right.
pub type Code = BitBox<u8, Msb0>;

/// Handle to a node inside a [`HuffmanTree`]'s arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Node<Symbol> {
    Leaf {
        symbol: Symbol,
        weight: usize,
    },
    Internal {
        weight: usize,
        left: NodeId,
        right: NodeId,
    },
}

impl<Symbol> Node<Symbol> {
    pub fn weight(&self) -> usize {
        match self {
            Node::Leaf { weight, .. } | Node::Internal { weight, .. } => *weight,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf { .. })
    }

    pub fn symbol(&self) -> Option<&Symbol> {
        match self {
            Node::Leaf { symbol, .. } => Some(symbol),
            Node::Internal { .. } => None,
        }
    }

    /// The child selected by `bit`; leaves have none.
    pub fn child(&self, bit: bool) -> Option<NodeId> {
        match self {
            Node::Leaf { .. } => None,
            Node::Internal { left, right, .. } => Some(if bit { *right } else { *left }),
        }
    }
}

// Ordered by weight, then by push order, so equal weights leave the queue FIFO.
#[derive(Debug, Clone, Derivative)]
#[derivative(PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    weight: usize,
    seq: usize,

    #[derivative(PartialEq = "ignore")]
    #[derivative(PartialOrd = "ignore")]
    #[derivative(Ord = "ignore")]
    node: NodeId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeTable<Symbol>
where
    Symbol: Hash + Eq,
{
    codes: HashMap<Symbol, Code>,
}

impl<Symbol> CodeTable<Symbol>
where
    Symbol: Hash + Eq,
{
    pub fn get(&self, symbol: &Symbol) -> Option<&BitSlice<u8, Msb0>> {
        self.codes.get(symbol).map(|c| c.as_bitslice())
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, &BitSlice<u8, Msb0>)> {
        self.codes.iter().map(|(s, c)| (s, c.as_bitslice()))
    }
}

impl<Symbol> FromIterator<(Symbol, Code)> for CodeTable<Symbol>
where
    Symbol: Hash + Eq,
{
    fn from_iter<I: IntoIterator<Item = (Symbol, Code)>>(iter: I) -> Self {
        Self {
            codes: iter.into_iter().collect(),
        }
    }
}

/// A prefix tree built once from a frequency table and immutable afterwards.
///
/// Nodes are stored in an arena and refer to their children by [`NodeId`].
#[derive(Debug, Clone)]
pub struct HuffmanTree<Symbol>
where
    Symbol: Hash + Eq,
{
    nodes: Vec<Node<Symbol>>,
    root: NodeId,
    codes: CodeTable<Symbol>,
}

impl<Symbol> HuffmanTree<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    /// Builds the tree by repeatedly merging the two lightest nodes.
    ///
    /// Leaves enter the queue in the table's iteration order. The first node
    /// removed becomes the left child of the merged node.
    pub fn build(frequencies: &FrequencyTable<Symbol>) -> Result<Self> {
        if frequencies.is_empty() {
            return Err(Error::InvalidInput(
                "cannot build a tree from an empty frequency table",
            ));
        }

        let mut nodes = Vec::with_capacity(2 * frequencies.len() - 1);
        let mut pq = BinaryHeap::with_capacity(frequencies.len());
        let mut seq = 0;

        for (symbol, weight) in frequencies.iter() {
            let node = push_node(
                &mut nodes,
                Node::Leaf {
                    symbol: symbol.clone(),
                    weight,
                },
            );
            pq.push(Reverse(QueueEntry { weight, seq, node }));
            seq += 1;
        }

        let root = loop {
            let Some(Reverse(left)) = pq.pop() else {
                return Err(Error::InvalidInput("no nodes left to form a root"));
            };
            let Some(Reverse(right)) = pq.pop() else {
                break left.node;
            };

            let weight = left.weight + right.weight;
            trace!(
                "merging {:?} ({}) with {:?} ({})",
                left.node,
                left.weight,
                right.node,
                right.weight
            );
            let node = push_node(
                &mut nodes,
                Node::Internal {
                    weight,
                    left: left.node,
                    right: right.node,
                },
            );
            pq.push(Reverse(QueueEntry { weight, seq, node }));
            seq += 1;
        };

        debug!(
            "built tree with {} symbols, {} nodes, total weight {}",
            frequencies.len(),
            nodes.len(),
            nodes[root.0].weight()
        );

        Ok(Self::from_parts(nodes, root))
    }

    /// Assembles a tree from an arena that is already known to be well formed.
    pub(crate) fn from_parts(nodes: Vec<Node<Symbol>>, root: NodeId) -> Self {
        let codes = generate_codes(&nodes, root);
        Self { nodes, root, codes }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// # Panics
    ///
    /// Panics if `id` did not come from this tree.
    pub fn node(&self, id: NodeId) -> &Node<Symbol> {
        &self.nodes[id.0]
    }

    pub fn nodes(&self) -> &[Node<Symbol>] {
        &self.nodes
    }

    pub fn codes(&self) -> &CodeTable<Symbol> {
        &self.codes
    }

    pub fn encoder(&self) -> Encoder<'_, Symbol> {
        Encoder::new(&self.codes)
    }

    pub fn decoder(&self) -> Decoder<'_, Symbol> {
        Decoder::new(self)
    }

    /// Number of nodes in the arena.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn symbol_count(&self) -> usize {
        self.codes.len()
    }

    /// Weight of the root, i.e. the number of symbols the tree was built from.
    pub fn weight(&self) -> usize {
        self.node(self.root).weight()
    }
}

fn push_node<Symbol>(nodes: &mut Vec<Node<Symbol>>, node: Node<Symbol>) -> NodeId {
    nodes.push(node);
    NodeId(nodes.len() - 1)
}

fn generate_codes<Symbol>(nodes: &[Node<Symbol>], root: NodeId) -> CodeTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    fn traverse<Symbol: Hash + Eq + Clone>(
        nodes: &[Node<Symbol>],
        id: NodeId,
        path: &mut BitVec<u8, Msb0>,
        table: &mut HashMap<Symbol, Code>,
    ) {
        match &nodes[id.0] {
            Node::Leaf { symbol, .. } => {
                table.insert(symbol.clone(), path.clone().into_boxed_bitslice());
            }
            Node::Internal { left, right, .. } => {
                path.push(false);
                traverse(nodes, *left, path, table);
                path.pop();

                path.push(true);
                traverse(nodes, *right, path, table);
                path.pop();
            }
        }
    }

    let mut table = HashMap::new();

    // a lone leaf has no path to it, so it gets a fixed one-bit code
    if let Node::Leaf { symbol, .. } = &nodes[root.0] {
        table.insert(symbol.clone(), bitbox![u8, Msb0; 0]);
        return CodeTable { codes: table };
    }

    let mut path = BitVec::new();
    traverse(nodes, root, &mut path, &mut table);
    CodeTable { codes: table }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frequency::calculate_frequencies;

    fn code_str(tree: &HuffmanTree<u8>, s: u8) -> String {
        tree.codes()
            .get(&s)
            .unwrap()
            .iter()
            .map(|b| if *b { '1' } else { '0' })
            .collect()
    }

    #[test]
    fn empty_table_is_rejected() {
        let freq = calculate_frequencies(b"");
        assert!(matches!(
            HuffmanTree::build(&freq),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn single_symbol_is_a_lone_leaf_with_one_bit_code() {
        let tree = HuffmanTree::build(&calculate_frequencies(b"aaaa")).unwrap();

        assert_eq!(tree.len(), 1);
        assert!(tree.node(tree.root()).is_leaf());
        assert_eq!(tree.weight(), 4);
        assert_eq!(code_str(&tree, b'a'), "0");
    }

    #[test]
    fn aaabbc_shape() {
        let tree = HuffmanTree::build(&calculate_frequencies(b"aaabbc")).unwrap();

        // c and b merge first (c removed first, so it goes left), then a joins
        assert_eq!(code_str(&tree, b'a'), "0");
        assert_eq!(code_str(&tree, b'c'), "10");
        assert_eq!(code_str(&tree, b'b'), "11");
        assert_eq!(tree.weight(), 6);
        assert_eq!(tree.len(), 5);
    }

    #[test]
    fn lighter_symbols_never_get_shorter_codes() {
        let tree = HuffmanTree::build(&calculate_frequencies(b"aaabbc")).unwrap();
        let len = |s: u8| tree.codes().get(&s).unwrap().len();

        assert!(len(b'a') <= len(b'b'));
        assert!(len(b'b') <= len(b'c'));
    }

    #[test]
    fn equal_weights_leave_queue_in_insertion_order() {
        let tree = HuffmanTree::build(&calculate_frequencies(b"abcd")).unwrap();

        assert_eq!(code_str(&tree, b'a'), "00");
        assert_eq!(code_str(&tree, b'b'), "01");
        assert_eq!(code_str(&tree, b'c'), "10");
        assert_eq!(code_str(&tree, b'd'), "11");
    }

    #[test]
    fn internal_weights_are_sums_of_children() {
        let tree =
            HuffmanTree::build(&calculate_frequencies(b"the quick brown fox jumps over the lazy dog"))
                .unwrap();

        for node in tree.nodes() {
            if let Node::Internal { weight, left, right } = node {
                assert_eq!(*weight, tree.node(*left).weight() + tree.node(*right).weight());
            }
        }
        assert_eq!(tree.len(), 2 * tree.symbol_count() - 1);
    }

    #[test]
    fn codes_are_prefix_free() {
        let tree = HuffmanTree::build(&calculate_frequencies(
            b"This is a really long message, I sure do hope it encodes and decodes properly.",
        ))
        .unwrap();

        for (a, ca) in tree.codes().iter() {
            assert!(!ca.is_empty());
            for (b, cb) in tree.codes().iter() {
                if a != b {
                    assert!(!cb.starts_with(ca), "{a} is a prefix of {b}");
                }
            }
        }
    }

    #[test]
    fn queue_entry_compare_ignores_node() {
        let a = QueueEntry { weight: 3, seq: 1, node: NodeId(0) };
        let b = QueueEntry { weight: 3, seq: 1, node: NodeId(7) };
        let c = QueueEntry { weight: 3, seq: 2, node: NodeId(0) };
        let d = QueueEntry { weight: 4, seq: 0, node: NodeId(0) };

        assert_eq!(a, b);
        assert!(a < c);
        assert!(c < d);
    }

    #[test]
    fn child_follows_bit() {
        let tree = HuffmanTree::build(&calculate_frequencies(b"ab")).unwrap();
        let root = tree.node(tree.root());

        let left = root.child(false).unwrap();
        let right = root.child(true).unwrap();
        assert_eq!(tree.node(left).symbol(), Some(&b'a'));
        assert_eq!(tree.node(right).symbol(), Some(&b'b'));
        assert_eq!(tree.node(left).child(true), None);
    }
}
