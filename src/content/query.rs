//! Search query builder for the content API

use std::fmt;

/// A search predicate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// `[at(path, "value")]`
    At { path: String, value: String },
}

impl Predicate {
    pub fn at(path: &str, value: &str) -> Self {
        Predicate::At {
            path: path.to_string(),
            value: value.to_string(),
        }
    }

    /// Match documents of a custom type
    pub fn document_type(doc_type: &str) -> Self {
        Self::at("document.type", doc_type)
    }

    /// Match a document by uid within a custom type
    pub fn uid(doc_type: &str, uid: &str) -> Self {
        Self::at(&format!("my.{}.uid", doc_type), uid)
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::At { path, value } => {
                let value = value.replace('\\', "\\\\").replace('"', "\\\"");
                write!(f, "[at({}, \"{}\")]", path, value)
            }
        }
    }
}

/// Result ordering on one field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ordering {
    pub field: String,
    pub descending: bool,
}

impl Ordering {
    pub fn asc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: false,
        }
    }

    pub fn desc(field: &str) -> Self {
        Self {
            field: field.to_string(),
            descending: true,
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "{} desc", self.field)
        } else {
            write!(f, "{}", self.field)
        }
    }
}

pub const FIRST_PUBLICATION_DATE: &str = "document.first_publication_date";

/// A search against the documents endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    pub predicates: Vec<Predicate>,
    pub page_size: Option<u32>,
    pub page: Option<u32>,
    pub orderings: Vec<Ordering>,
    /// Only return documents after this document id in the ordering
    pub after: Option<String>,
    /// Ref to query; the master ref when unset
    pub reference: Option<String>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn predicate(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    pub fn ordering(mut self, ordering: Ordering) -> Self {
        self.orderings.push(ordering);
        self
    }

    pub fn after(mut self, id: &str) -> Self {
        self.after = Some(id.to_string());
        self
    }

    pub fn reference(mut self, reference: Option<&str>) -> Self {
        self.reference = reference.map(str::to_string);
        self
    }

    /// The `q` parameter, or `None` without predicates
    pub fn q(&self) -> Option<String> {
        if self.predicates.is_empty() {
            return None;
        }
        let inner: String = self.predicates.iter().map(|p| p.to_string()).collect();
        Some(format!("[{}]", inner))
    }

    /// The `orderings` parameter, or `None` for the default ordering
    pub fn orderings_param(&self) -> Option<String> {
        if self.orderings.is_empty() {
            return None;
        }
        let inner: Vec<String> = self.orderings.iter().map(|o| o.to_string()).collect();
        Some(format!("[{}]", inner.join(",")))
    }

    /// Query parameters except `ref` and `access_token`
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(q) = self.q() {
            params.push(("q", q));
        }
        if let Some(page_size) = self.page_size {
            params.push(("pageSize", page_size.to_string()));
        }
        if let Some(page) = self.page {
            params.push(("page", page.to_string()));
        }
        if let Some(orderings) = self.orderings_param() {
            params.push(("orderings", orderings));
        }
        if let Some(ref after) = self.after {
            params.push(("after", after.clone()));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_predicates() {
        assert_eq!(
            Predicate::document_type("posts").to_string(),
            r#"[at(document.type, "posts")]"#
        );
        assert_eq!(
            Predicate::uid("posts", "como-utilizar-hooks").to_string(),
            r#"[at(my.posts.uid, "como-utilizar-hooks")]"#
        );
        assert_eq!(
            Predicate::at("my.posts.title", r#"say "hi""#).to_string(),
            r#"[at(my.posts.title, "say \"hi\"")]"#
        );
    }

    #[test]
    fn test_params() {
        let query = Query::new()
            .predicate(Predicate::document_type("posts"))
            .page_size(1)
            .ordering(Ordering::desc(FIRST_PUBLICATION_DATE))
            .after("YF1");
        assert_eq!(
            query.params(),
            vec![
                ("q", r#"[[at(document.type, "posts")]]"#.to_string()),
                ("pageSize", "1".to_string()),
                ("orderings", "[document.first_publication_date desc]".to_string()),
                ("after", "YF1".to_string()),
            ]
        );
    }

    #[test]
    fn test_empty_query() {
        let query = Query::new();
        assert_eq!(query.q(), None);
        assert_eq!(query.orderings_param(), None);
        assert!(query.params().is_empty());
    }

    #[test]
    fn test_multiple_orderings() {
        let query = Query::new()
            .ordering(Ordering::asc(FIRST_PUBLICATION_DATE))
            .ordering(Ordering::desc("my.posts.title"))
            .page(3);
        assert_eq!(
            query.orderings_param().as_deref(),
            Some("[document.first_publication_date,my.posts.title desc]")
        );
        assert_eq!(query.page, Some(3));
    }
}
