use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wikifreq_scanner::TokenStream;

/// Word -> occurrence count, ordered by word.
///
/// Serializes as a plain JSON object (`{"cat": 1, "the": 2}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
    counts: BTreeMap<String, u64>,
}

impl FrequencyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, word: &str) {
        self.add_count(word, 1);
    }

    pub fn add_count(&mut self, word: &str, count: u64) {
        if let Some(existing) = self.counts.get_mut(word) {
            *existing += count;
        } else {
            self.counts.insert(word.to_string(), count);
        }
    }

    pub fn get(&self, word: &str) -> u64 {
        self.counts.get(word).copied().unwrap_or(0)
    }

    pub fn contains(&self, word: &str) -> bool {
        self.counts.contains_key(word)
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(word, count)| (word.as_str(), *count))
    }

    pub fn counts(&self) -> impl Iterator<Item = u64> + '_ {
        self.counts.values().copied()
    }

    /// Fold `other` into this table.
    pub fn merge(&mut self, other: &FrequencyTable) {
        for (word, count) in other.iter() {
            self.add_count(word, count);
        }
    }

    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&str, u64) -> bool,
    {
        self.counts.retain(|word, count| keep(word, *count));
    }

    /// Rows ordered by count (highest first), ties broken by word.
    pub fn sorted_rows(&self) -> Vec<(&str, u64)> {
        let mut rows: Vec<_> = self.iter().collect();
        rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        rows
    }

    /// Each word's share of the table total, in percent.
    pub fn percentage(&self, word: &str) -> f64 {
        percentage_of(self.get(word), self.total())
    }
}

/// `count` as a percentage of `total`; zero when `total` is zero.
pub fn percentage_of(count: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

impl<S: Into<String>> FromIterator<(S, u64)> for FrequencyTable {
    fn from_iter<I: IntoIterator<Item = (S, u64)>>(iter: I) -> Self {
        let mut table = FrequencyTable::new();
        for (word, count) in iter {
            let word = word.into();
            table.add_count(&word, count);
        }
        table
    }
}

/// Count every token of every stream.
pub fn aggregate<'a, I>(streams: I) -> FrequencyTable
where
    I: IntoIterator<Item = &'a TokenStream>,
{
    let mut table = FrequencyTable::new();
    for stream in streams {
        for token in &stream.tokens {
            table.add(token);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use wikifreq_scanner::tokenize;

    fn stream(title: &str, text: &str) -> TokenStream {
        TokenStream {
            title: title.to_string(),
            tokens: tokenize(text),
        }
    }

    #[test]
    fn test_aggregate_single_sentence() {
        let table = aggregate(&[stream("A", "The cat sat on the mat.")]);
        let expected: FrequencyTable = [("the", 2), ("cat", 1), ("sat", 1), ("on", 1), ("mat", 1)]
            .into_iter()
            .collect();
        assert_eq!(table, expected);
        assert_eq!(table.total(), 6);
    }

    #[test]
    fn test_aggregate_empty() {
        let streams: Vec<TokenStream> = Vec::new();
        let table = aggregate(&streams);
        assert!(table.is_empty());
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn test_aggregate_is_order_independent() {
        let a = stream("A", "red green blue");
        let b = stream("B", "green green yellow");
        let c = stream("C", "blue red red");

        let forward = aggregate(&[a.clone(), b.clone(), c.clone()]);
        let backward = aggregate(&[c, a, b]);

        assert_eq!(forward, backward);
        assert_eq!(forward.get("red"), 3);
        assert_eq!(forward.get("green"), 3);
    }

    #[test]
    fn test_merge_matches_aggregate() {
        let a = stream("A", "one two two");
        let b = stream("B", "two three");

        let mut merged = aggregate(&[a.clone()]);
        merged.merge(&aggregate(&[b.clone()]));

        assert_eq!(merged, aggregate(&[a, b]));
        assert_eq!(merged.total(), 5);
    }

    #[test]
    fn test_sorted_rows_breaks_ties_by_word() {
        let table: FrequencyTable = [("b", 2), ("a", 2), ("c", 5), ("d", 1)].into_iter().collect();
        assert_eq!(
            table.sorted_rows(),
            vec![("c", 5), ("a", 2), ("b", 2), ("d", 1)]
        );
    }

    #[test]
    fn test_percentage() {
        let table: FrequencyTable = [("a", 3), ("b", 1)].into_iter().collect();
        assert_eq!(table.percentage("a"), 75.0);
        assert_eq!(table.percentage("missing"), 0.0);
        assert_eq!(FrequencyTable::new().percentage("a"), 0.0);
    }

    #[test]
    fn test_percentage_of() {
        assert_eq!(percentage_of(1, 4), 25.0);
        assert_eq!(percentage_of(0, 4), 0.0);
        assert_eq!(percentage_of(3, 0), 0.0);
    }

    #[test]
    fn test_serializes_as_sorted_object() {
        let table: FrequencyTable = [("the", 2), ("cat", 1)].into_iter().collect();
        assert_eq!(
            serde_json::to_string(&table).unwrap(),
            r#"{"cat":1,"the":2}"#
        );
    }
}
