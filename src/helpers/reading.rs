//! Reading-time estimation

use crate::content::ContentBlock;

/// Number of whitespace-separated words
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Words in every heading and every body fragment of a post
pub fn total_words(blocks: &[ContentBlock]) -> usize {
    blocks
        .iter()
        .map(|block| {
            let body: usize = block.body.iter().map(|node| count_words(&node.text)).sum();
            count_words(&block.heading) + body
        })
        .sum()
}

/// Estimated reading time in whole minutes, rounded up
pub fn reading_time(blocks: &[ContentBlock], words_per_minute: u32) -> usize {
    let words_per_minute = words_per_minute.max(1) as usize;
    total_words(blocks).div_ceil(words_per_minute)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::RichTextNode;

    fn block(heading: &str, paragraphs: &[&str]) -> ContentBlock {
        ContentBlock {
            heading: heading.to_string(),
            body: paragraphs.iter().map(|p| RichTextNode::paragraph(p)).collect(),
        }
    }

    #[test]
    fn test_count_words() {
        assert_eq!(count_words(""), 0);
        assert_eq!(count_words("  Lorem   ipsum\ndolor\tsit "), 4);
    }

    #[test]
    fn test_empty_body() {
        assert_eq!(reading_time(&[], 200), 0);
        assert_eq!(reading_time(&[block("", &[])], 200), 0);
    }

    #[test]
    fn test_one_word() {
        assert_eq!(reading_time(&[block("Olá", &[])], 200), 1);
    }

    #[test]
    fn test_rounds_up() {
        let text = vec!["word"; 199].join(" ");
        let blocks = vec![block("Two words", &[text.as_str()])];
        assert_eq!(total_words(&blocks), 201);
        assert_eq!(reading_time(&blocks, 200), 2);

        let long = vec!["word"; 400].join(" ");
        let exact = vec![block("", &[long.as_str()])];
        assert_eq!(reading_time(&exact, 200), 2);
    }

    #[test]
    fn test_zero_words_per_minute() {
        assert_eq!(reading_time(&[block("a b c", &[])], 0), 3);
    }
}
