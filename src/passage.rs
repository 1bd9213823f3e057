/// The paragraph shown to the reader. Embedded so a run needs no files or
/// network; swapping the text is deliberately not supported.
pub const DEFAULT_PASSAGE: &str = "The sun was shining brightly in the blue sky. \
Birds were singing, and a gentle breeze moved the trees. People walked around \
the park, smiling and enjoying the day. A small dog ran after a ball, happily \
wagging its tail. Children played on the swings, laughing with their friends. \
The flowers in the garden bloomed in many colors, making the air smell sweet. \
It was a perfect day to be outside, to relax, and to feel happy. Everyone \
seemed peaceful and full of joy, enjoying the simple beauty of a sunny day in \
the park.";

/// A fixed text split once into tappable words.
#[derive(Debug, Clone)]
pub struct Passage {
    words: Vec<String>,
}

impl Passage {
    /// Split `text` into words, collapsing whitespace runs and dropping empty
    /// tokens. The word list is immutable for the life of the process.
    pub fn new(text: &str) -> Self {
        let words = text.split_whitespace().map(str::to_owned).collect();
        Self { words }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    /// Bounds-checked word lookup; an out-of-range index is a silent `None`.
    pub fn word(&self, index: usize) -> Option<&str> {
        self.words.get(index).map(String::as_str)
    }
}

impl Default for Passage {
    fn default() -> Self {
        Self::new(DEFAULT_PASSAGE)
    }
}
