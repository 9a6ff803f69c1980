use super::document::Document;

/// Splits text into chunks sized by estimated token count, breaking on word
/// boundaries. Token counts use the ~4 characters per token approximation;
/// exact tokenizer parity is not a goal.
#[derive(Debug, Clone)]
pub struct TextSplitter {
    chunk_tokens: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    pub fn new(chunk_tokens: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_tokens: chunk_tokens.max(1),
            chunk_overlap,
        }
    }

    /// Re-emits each document as one document per chunk, carrying the parent
    /// metadata. Input order is preserved.
    pub fn split_documents(&self, documents: &[Document]) -> Vec<Document> {
        let mut out = Vec::new();
        for doc in documents {
            for chunk in self.split(&doc.page_content) {
                out.push(Document {
                    page_content: chunk,
                    metadata: doc.metadata.clone(),
                });
            }
        }
        out
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if words.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current: Vec<&str> = Vec::new();
        let mut current_tokens = 0usize;

        for word in words {
            let word_tokens = estimate_tokens(word).max(1);

            if !current.is_empty() && current_tokens + word_tokens > self.chunk_tokens {
                chunks.push(current.join(" "));

                if self.chunk_overlap > 0 {
                    let (kept, kept_tokens) = tail_within(&current, self.chunk_overlap);
                    current = kept;
                    current_tokens = kept_tokens;
                } else {
                    current.clear();
                    current_tokens = 0;
                }
            }

            current.push(word);
            current_tokens += word_tokens;
        }

        if !current.is_empty() {
            chunks.push(current.join(" "));
        }

        chunks
    }
}

/// Longest suffix of `words` that fits in `budget` tokens.
fn tail_within<'a>(words: &[&'a str], budget: usize) -> (Vec<&'a str>, usize) {
    let mut kept = Vec::new();
    let mut total = 0usize;
    for word in words.iter().rev() {
        let tokens = estimate_tokens(word).max(1);
        if total + tokens > budget {
            break;
        }
        total += tokens;
        kept.push(*word);
    }
    kept.reverse();
    (kept, total)
}

/// Rough approximation: ~4 characters per token for English text.
pub fn estimate_tokens(text: &str) -> usize {
    (text.len() + 3) / 4
}
