//! Rich text fragments as delivered by the content API, and their HTML form
//!
//! A rich text field is a flat list of blocks. Inline formatting is expressed
//! as spans over the block text, addressed in UTF-16 code units.

use serde::{Deserialize, Serialize};

use crate::helpers::escape_html;

/// Block type of a rich text node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "paragraph")]
    Paragraph,
    #[serde(rename = "preformatted")]
    Preformatted,
    #[serde(rename = "heading1")]
    Heading1,
    #[serde(rename = "heading2")]
    Heading2,
    #[serde(rename = "heading3")]
    Heading3,
    #[serde(rename = "heading4")]
    Heading4,
    #[serde(rename = "heading5")]
    Heading5,
    #[serde(rename = "heading6")]
    Heading6,
    #[serde(rename = "list-item")]
    ListItem,
    #[serde(rename = "o-list-item")]
    OrderedListItem,
    #[serde(rename = "image")]
    Image,
    #[serde(rename = "embed")]
    Embed,
    #[serde(other)]
    Unknown,
}

/// Inline span type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpanKind {
    #[serde(rename = "strong")]
    Strong,
    #[serde(rename = "em")]
    Em,
    #[serde(rename = "hyperlink")]
    Hyperlink,
    #[serde(rename = "label")]
    Label,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpanData {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub label: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
    #[serde(default)]
    pub data: Option<SpanData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Oembed {
    #[serde(default)]
    pub embed_url: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub provider_name: Option<String>,
    #[serde(default)]
    pub html: Option<String>,
}

/// One block of a rich text field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RichTextNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
    // image blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
    // embed blocks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oembed: Option<Oembed>,
}

impl RichTextNode {
    pub fn paragraph(text: &str) -> Self {
        Self {
            kind: NodeKind::Paragraph,
            text: text.to_string(),
            spans: Vec::new(),
            url: None,
            alt: None,
            oembed: None,
        }
    }
}

/// Plain text of all blocks, one block per line
pub fn as_text(nodes: &[RichTextNode]) -> String {
    nodes
        .iter()
        .map(|n| n.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Serialize rich text blocks to HTML
pub fn as_html(nodes: &[RichTextNode]) -> String {
    let mut html = String::new();
    let mut open_list: Option<NodeKind> = None;

    for node in nodes {
        let list_kind = match node.kind {
            NodeKind::ListItem | NodeKind::OrderedListItem => Some(node.kind),
            _ => None,
        };

        if open_list != list_kind {
            if let Some(kind) = open_list.take() {
                html.push_str(list_close(kind));
            }
            if let Some(kind) = list_kind {
                html.push_str(list_open(kind));
                open_list = Some(kind);
            }
        }

        html.push_str(&block_html(node));
    }

    if let Some(kind) = open_list {
        html.push_str(list_close(kind));
    }

    html
}

fn list_open(kind: NodeKind) -> &'static str {
    if kind == NodeKind::OrderedListItem {
        "<ol>"
    } else {
        "<ul>"
    }
}

fn list_close(kind: NodeKind) -> &'static str {
    if kind == NodeKind::OrderedListItem {
        "</ol>"
    } else {
        "</ul>"
    }
}

fn block_html(node: &RichTextNode) -> String {
    let inline = || serialize_spans(&node.text, &node.spans);
    match node.kind {
        NodeKind::Paragraph => format!("<p>{}</p>", inline()),
        NodeKind::Preformatted => format!("<pre>{}</pre>", inline()),
        NodeKind::Heading1 => format!("<h1>{}</h1>", inline()),
        NodeKind::Heading2 => format!("<h2>{}</h2>", inline()),
        NodeKind::Heading3 => format!("<h3>{}</h3>", inline()),
        NodeKind::Heading4 => format!("<h4>{}</h4>", inline()),
        NodeKind::Heading5 => format!("<h5>{}</h5>", inline()),
        NodeKind::Heading6 => format!("<h6>{}</h6>", inline()),
        NodeKind::ListItem | NodeKind::OrderedListItem => format!("<li>{}</li>", inline()),
        NodeKind::Image => match node.url {
            Some(ref url) => format!(
                r#"<p class="block-img"><img src="{}" alt="{}" /></p>"#,
                escape_html(url),
                escape_html(node.alt.as_deref().unwrap_or(""))
            ),
            None => String::new(),
        },
        NodeKind::Embed => match node.oembed {
            Some(ref oembed) => format!(
                r#"<div data-oembed="{}" data-oembed-type="{}" data-oembed-provider="{}">{}</div>"#,
                escape_html(oembed.embed_url.as_deref().unwrap_or("")),
                escape_html(oembed.kind.as_deref().unwrap_or("")),
                escape_html(oembed.provider_name.as_deref().unwrap_or("")),
                oembed.html.as_deref().unwrap_or("")
            ),
            None => String::new(),
        },
        NodeKind::Unknown => String::new(),
    }
}

fn open_tag(span: &Span) -> String {
    let data = span.data.clone().unwrap_or_default();
    match span.kind {
        SpanKind::Strong => "<strong>".to_string(),
        SpanKind::Em => "<em>".to_string(),
        SpanKind::Hyperlink => {
            let href = escape_html(data.url.as_deref().unwrap_or("#"));
            match data.target {
                Some(target) => format!(
                    r#"<a href="{}" target="{}" rel="noopener">"#,
                    href,
                    escape_html(&target)
                ),
                None => format!(r#"<a href="{}">"#, href),
            }
        }
        SpanKind::Label => format!(
            r#"<span class="{}">"#,
            escape_html(data.label.as_deref().unwrap_or(""))
        ),
        SpanKind::Unknown => String::new(),
    }
}

fn close_tag(span: &Span) -> &'static str {
    match span.kind {
        SpanKind::Strong => "</strong>",
        SpanKind::Em => "</em>",
        SpanKind::Hyperlink => "</a>",
        SpanKind::Label => "</span>",
        SpanKind::Unknown => "",
    }
}

/// Apply spans to `text`. Offsets are UTF-16 positions; spans that overlap
/// without nesting are closed and re-opened at the boundary.
fn serialize_spans(text: &str, spans: &[Span]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut open: Vec<&Span> = Vec::new();
    let mut pos = 0usize;
    let mut chars = text.chars();

    loop {
        if open.iter().any(|s| s.end <= pos) {
            let mut reopen = Vec::new();
            while let Some(span) = open.pop() {
                out.push_str(close_tag(span));
                if span.end > pos {
                    reopen.push(span);
                }
                if !open.iter().any(|s| s.end <= pos) {
                    break;
                }
            }
            for span in reopen.into_iter().rev() {
                out.push_str(&open_tag(span));
                open.push(span);
            }
        }

        let mut starting: Vec<&Span> = spans
            .iter()
            .filter(|s| s.start == pos && s.end > s.start)
            .collect();
        starting.sort_by(|a, b| b.end.cmp(&a.end));
        for span in starting {
            out.push_str(&open_tag(span));
            open.push(span);
        }

        match chars.next() {
            Some('\n') => {
                out.push_str("<br />");
                pos += 1;
            }
            Some(c) => {
                let mut buf = [0u8; 4];
                out.push_str(&escape_html(c.encode_utf8(&mut buf)));
                pos += c.len_utf16();
            }
            None => break,
        }
    }

    while let Some(span) = open.pop() {
        out.push_str(close_tag(span));
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn span(start: usize, end: usize, kind: SpanKind) -> Span {
        Span {
            start,
            end,
            kind,
            data: None,
        }
    }

    fn node(kind: NodeKind, text: &str, spans: Vec<Span>) -> RichTextNode {
        RichTextNode {
            kind,
            text: text.to_string(),
            spans,
            url: None,
            alt: None,
            oembed: None,
        }
    }

    #[test]
    fn test_paragraph_and_heading() {
        let nodes = vec![
            node(NodeKind::Heading2, "Intro", vec![]),
            RichTextNode::paragraph("Hello world"),
        ];
        assert_eq!(as_html(&nodes), "<h2>Intro</h2><p>Hello world</p>");
    }

    #[test]
    fn test_escapes_text() {
        let nodes = vec![RichTextNode::paragraph("a < b & \"c\"")];
        assert_eq!(as_html(&nodes), "<p>a &lt; b &amp; &quot;c&quot;</p>");
    }

    #[test]
    fn test_strong_and_em() {
        let nodes = vec![node(
            NodeKind::Paragraph,
            "bold and italic",
            vec![span(0, 4, SpanKind::Strong), span(9, 15, SpanKind::Em)],
        )];
        assert_eq!(
            as_html(&nodes),
            "<p><strong>bold</strong> and <em>italic</em></p>"
        );
    }

    #[test]
    fn test_nested_spans() {
        let nodes = vec![node(
            NodeKind::Paragraph,
            "abcdef",
            vec![span(0, 6, SpanKind::Strong), span(2, 4, SpanKind::Em)],
        )];
        assert_eq!(
            as_html(&nodes),
            "<p><strong>ab<em>cd</em>ef</strong></p>"
        );
    }

    #[test]
    fn test_overlapping_spans() {
        let nodes = vec![node(
            NodeKind::Paragraph,
            "abcdef",
            vec![span(0, 4, SpanKind::Strong), span(2, 6, SpanKind::Em)],
        )];
        assert_eq!(
            as_html(&nodes),
            "<p><strong>ab<em>cd</em></strong><em>ef</em></p>"
        );
    }

    #[test]
    fn test_hyperlink() {
        let mut link = span(4, 8, SpanKind::Hyperlink);
        link.data = Some(SpanData {
            url: Some("https://rocketseat.com.br".to_string()),
            target: Some("_blank".to_string()),
            label: None,
        });
        let nodes = vec![node(NodeKind::Paragraph, "see docs", vec![link])];
        assert_eq!(
            as_html(&nodes),
            r#"<p>see <a href="https://rocketseat.com.br" target="_blank" rel="noopener">docs</a></p>"#
        );
    }

    #[test]
    fn test_utf16_offsets() {
        // The rocket is two UTF-16 code units
        let nodes = vec![node(
            NodeKind::Paragraph,
            "🚀 go",
            vec![span(3, 5, SpanKind::Strong)],
        )];
        assert_eq!(as_html(&nodes), "<p>🚀 <strong>go</strong></p>");
    }

    #[test]
    fn test_line_breaks() {
        let nodes = vec![RichTextNode::paragraph("one\ntwo")];
        assert_eq!(as_html(&nodes), "<p>one<br />two</p>");
    }

    #[test]
    fn test_list_grouping() {
        let nodes = vec![
            node(NodeKind::ListItem, "a", vec![]),
            node(NodeKind::ListItem, "b", vec![]),
            node(NodeKind::OrderedListItem, "c", vec![]),
            RichTextNode::paragraph("d"),
            node(NodeKind::ListItem, "e", vec![]),
        ];
        assert_eq!(
            as_html(&nodes),
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>d</p><ul><li>e</li></ul>"
        );
    }

    #[test]
    fn test_image_and_unknown() {
        let mut image = node(NodeKind::Image, "", vec![]);
        image.url = Some("https://images.prismic.io/x.png".to_string());
        image.alt = Some("a \"rocket\"".to_string());
        let nodes = vec![image, node(NodeKind::Unknown, "ignored", vec![])];
        assert_eq!(
            as_html(&nodes),
            r#"<p class="block-img"><img src="https://images.prismic.io/x.png" alt="a &quot;rocket&quot;" /></p>"#
        );
    }

    #[test]
    fn test_deserialize_api_shape() {
        let json = r#"[
            {"type": "paragraph", "text": "Hello", "spans": [{"start": 0, "end": 5, "type": "strong"}]},
            {"type": "list-item", "text": "item", "spans": []},
            {"type": "some-new-block", "text": "x", "spans": []}
        ]"#;
        let nodes: Vec<RichTextNode> = serde_json::from_str(json).unwrap();
        assert_eq!(nodes[0].kind, NodeKind::Paragraph);
        assert_eq!(nodes[0].spans[0].kind, SpanKind::Strong);
        assert_eq!(nodes[1].kind, NodeKind::ListItem);
        assert_eq!(nodes[2].kind, NodeKind::Unknown);
        assert_eq!(as_text(&nodes), "Hello\nitem\nx");
    }
}
