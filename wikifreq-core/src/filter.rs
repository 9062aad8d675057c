use crate::error::FilterError;
use crate::frequency::FrequencyTable;
use std::collections::HashSet;
use tracing::debug;

/// Words to drop from a table, compared in lowercase.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IgnoreList {
    words: HashSet<String>,
}

impl IgnoreList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, word: &str) {
        let word = word.trim().to_lowercase();
        if !word.is_empty() {
            self.words.insert(word);
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(&word.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for IgnoreList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut list = IgnoreList::new();
        for word in iter {
            list.insert(word.as_ref());
        }
        list
    }
}

/// A percentile in `0..=100`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Percentile(u8);

impl Percentile {
    pub fn value(self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Percentile {
    type Error = FilterError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match u8::try_from(value) {
            Ok(p) if p <= 100 => Ok(Percentile(p)),
            _ => Err(FilterError::InvalidPercentile(value)),
        }
    }
}

/// Linear-interpolation percentile of `counts`.
///
/// Sorts ascending and interpolates between the two ranks around
/// `p / 100 * (n - 1)`. Returns `None` for an empty slice.
pub fn percentile_threshold(counts: &[u64], percentile: Percentile) -> Option<f64> {
    if counts.is_empty() {
        return None;
    }

    let mut sorted = counts.to_vec();
    sorted.sort_unstable();

    // Rank in hundredths, kept integral so exact ranks never drift upward.
    let scaled = u64::from(percentile.value()) * (sorted.len() - 1) as u64;
    let lower = (scaled / 100) as usize;
    let remainder = scaled % 100;
    let low = sorted[lower] as f64;
    if remainder == 0 {
        return Some(low);
    }

    let high = sorted[lower + 1] as f64;
    Some(low + (high - low) * (remainder as f64 / 100.0))
}

/// Ignore-list removal followed by a percentile cutoff.
#[derive(Debug, Clone)]
pub struct KeywordFilter {
    ignore_list: IgnoreList,
    percentile: Percentile,
}

impl KeywordFilter {
    pub fn new(ignore_list: IgnoreList, percentile: i64) -> Result<Self, FilterError> {
        Ok(Self::with_percentile(
            ignore_list,
            Percentile::try_from(percentile)?,
        ))
    }

    pub fn with_percentile(ignore_list: IgnoreList, percentile: Percentile) -> Self {
        Self {
            ignore_list,
            percentile,
        }
    }

    pub fn percentile(&self) -> Percentile {
        self.percentile
    }

    pub fn ignore_list(&self) -> &IgnoreList {
        &self.ignore_list
    }

    pub fn apply(&self, table: &FrequencyTable) -> FrequencyTable {
        let mut filtered = table.clone();
        filtered.retain(|word, _| !self.ignore_list.contains(word));

        let counts: Vec<u64> = filtered.counts().collect();
        let Some(threshold) = percentile_threshold(&counts, self.percentile) else {
            return filtered;
        };

        debug!(
            "Percentile {} of {} entries is {:.2}",
            self.percentile.value(),
            counts.len(),
            threshold
        );
        filtered.retain(|_, count| count as f64 >= threshold);
        filtered
    }
}

/// Drop ignore-listed words, then keep entries at or above the given
/// percentile of the remaining counts.
pub fn filter(
    table: &FrequencyTable,
    ignore_list: &IgnoreList,
    percentile: i64,
) -> Result<FrequencyTable, FilterError> {
    let filter = KeywordFilter::new(ignore_list.clone(), percentile)?;
    Ok(filter.apply(table))
}
