use std::collections::HashMap;
use std::hash::Hash;

/// Occurrence counts for every symbol present in some input.
///
/// Entries are kept in first-occurrence order. That order is what
/// [`HuffmanTree::build`](crate::HuffmanTree::build) feeds into its queue, so
/// two tables built from the same input always produce the same tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrequencyTable<Symbol>
where
    Symbol: Hash + Eq,
{
    index: HashMap<Symbol, usize>,
    entries: Vec<(Symbol, usize)>,
}

impl<Symbol> FrequencyTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    pub fn new() -> Self {
        Self {
            index: HashMap::new(),
            entries: Vec::new(),
        }
    }

    pub fn from_symbols(symbols: impl IntoIterator<Item = Symbol>) -> Self {
        let mut table = Self::new();
        for s in symbols {
            table.add(s);
        }
        table
    }

    pub fn add(&mut self, symbol: Symbol) {
        match self.index.get(&symbol) {
            Some(&i) => self.entries[i].1 += 1,
            None => {
                self.index.insert(symbol.clone(), self.entries.len());
                self.entries.push((symbol, 1));
            }
        }
    }

    pub fn get(&self, symbol: &Symbol) -> Option<usize> {
        self.index.get(symbol).map(|&i| self.entries[i].1)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts, i.e. the length of the input that was counted.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|(_, c)| c).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Symbol, usize)> {
        self.entries.iter().map(|(s, c)| (s, *c))
    }
}

impl<Symbol> Default for FrequencyTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<Symbol> FromIterator<Symbol> for FrequencyTable<Symbol>
where
    Symbol: Hash + Eq + Clone,
{
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self::from_symbols(iter)
    }
}

/// Counts the bytes of `text`.
pub fn calculate_frequencies(text: &[u8]) -> FrequencyTable<u8> {
    FrequencyTable::from_symbols(text.iter().copied())
}
