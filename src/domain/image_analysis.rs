/// Stage-one output of the analysis provider.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ImageAnalysis {
    pub tags: Vec<String>,
}

impl ImageAnalysis {
    pub fn new(tags: Vec<String>) -> Self {
        Self { tags }
    }

    /// Trimmed, lowercased, de-duplicated tags in provider order.
    pub fn normalized_tags(&self) -> Vec<String> {
        let mut seen = Vec::with_capacity(self.tags.len());
        for tag in &self.tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !seen.contains(&tag) {
                seen.push(tag);
            }
        }
        seen
    }

    pub fn top_tags(&self, n: usize) -> Vec<String> {
        self.normalized_tags().into_iter().take(n).collect()
    }
}
