/// Splits article text into lowercase word tokens.
///
/// Tokens are maximal runs of alphanumeric characters; everything else
/// (whitespace, punctuation, symbols) is a boundary.
#[derive(Debug, Clone, Copy, Default)]
pub struct Tokenizer {
    skip_numeric: bool,
}

impl Tokenizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop tokens made only of digits ("1998", "42").
    pub fn with_skip_numeric(mut self, skip_numeric: bool) -> Self {
        self.skip_numeric = skip_numeric;
        self
    }

    pub fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
            .filter(|word| !(self.skip_numeric && word.chars().all(|c| c.is_numeric())))
            .map(str::to_lowercase)
            .collect()
    }
}

/// Tokenize with the default options.
pub fn tokenize(text: &str) -> Vec<String> {
    Tokenizer::default().tokenize(text)
}
