use crate::models::object::ObjectKind;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A find query against the bucket: type discriminator, field filters,
/// projection and pagination.
#[derive(Debug, Clone)]
pub struct ObjectQuery {
    kind: ObjectKind,
    filters: Map<String, Value>,
    props: Vec<&'static str>,
    limit: Option<u32>,
    skip: Option<u32>,
    sort: Option<(String, Direction)>,
}

/// Metadata field path as the bucket API expects it.
pub fn meta(field: &str) -> String {
    format!("metadata.{field}")
}

impl ObjectQuery {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            filters: Map::new(),
            props: Vec::new(),
            limit: None,
            skip: None,
            sort: None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(field.into(), value.into());
        self
    }

    /// Matches objects whose field (scalar or array) contains any of `values`.
    pub fn any_of(mut self, field: impl Into<String>, values: &[String]) -> Self {
        if !values.is_empty() {
            self.filters.insert(field.into(), json!({ "$in": values }));
        }
        self
    }

    /// Case-insensitive substring match over any of `fields`.
    pub fn text(mut self, fields: &[&str], needle: &str) -> Self {
        if needle.is_empty() {
            return self;
        }
        let pattern = regex::escape(needle);
        let clauses: Vec<Value> = fields
            .iter()
            .map(|field| {
                let mut clause = Map::new();
                clause.insert(
                    (*field).to_string(),
                    json!({ "$regex": pattern, "$options": "i" }),
                );
                Value::Object(clause)
            })
            .collect();
        self.filters.insert("$or".to_string(), Value::Array(clauses));
        self
    }

    /// Inclusive range; either bound may be absent.
    pub fn between(
        mut self,
        field: impl Into<String>,
        from: Option<&str>,
        to: Option<&str>,
    ) -> Self {
        let mut range = Map::new();
        if let Some(from) = from {
            range.insert("$gte".to_string(), Value::from(from));
        }
        if let Some(to) = to {
            range.insert("$lte".to_string(), Value::from(to));
        }
        if !range.is_empty() {
            self.filters.insert(field.into(), Value::Object(range));
        }
        self
    }

    pub fn props(mut self, props: &[&'static str]) -> Self {
        self.props = props.to_vec();
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn skip(mut self, skip: u32) -> Self {
        self.skip = Some(skip);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some((field.into(), direction));
        self
    }

    /// The `query` parameter: type plus filters as one JSON object.
    pub fn filter_json(&self) -> Value {
        let mut query = Map::new();
        query.insert("type".to_string(), Value::from(self.kind.as_str()));
        for (field, value) in &self.filters {
            query.insert(field.clone(), value.clone());
        }
        Value::Object(query)
    }

    /// Query string pairs, excluding credentials.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![("query", self.filter_json().to_string())];
        if !self.props.is_empty() {
            params.push(("props", self.props.join(",")));
        }
        if let Some(limit) = self.limit {
            params.push(("limit", limit.to_string()));
        }
        if let Some(skip) = self.skip {
            params.push(("skip", skip.to_string()));
        }
        if let Some((field, direction)) = &self.sort {
            let sort = match direction {
                Direction::Ascending => field.clone(),
                Direction::Descending => format!("-{field}"),
            };
            params.push(("sort", sort));
        }
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn param<'a>(params: &'a [(&'static str, String)], key: &str) -> Option<&'a str> {
        params.iter().find(|(k, _)| *k == key).map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_filter_json_includes_type_and_fields() {
        let query = ObjectQuery::new(ObjectKind::Articles)
            .eq(meta("user_id"), "u1")
            .eq(meta("status"), "scheduled");

        assert_eq!(
            query.filter_json(),
            json!({"type": "articles", "metadata.user_id": "u1", "metadata.status": "scheduled"})
        );
    }

    #[test]
    fn test_params_pagination_and_sort() {
        let params = ObjectQuery::new(ObjectKind::Articles)
            .props(&["id", "title"])
            .limit(20)
            .skip(40)
            .sort("created_at", Direction::Descending)
            .to_params();

        assert_eq!(param(&params, "props"), Some("id,title"));
        assert_eq!(param(&params, "limit"), Some("20"));
        assert_eq!(param(&params, "skip"), Some("40"));
        assert_eq!(param(&params, "sort"), Some("-created_at"));
    }

    #[test]
    fn test_text_escapes_regex_metacharacters() {
        let query = ObjectQuery::new(ObjectKind::Articles).text(&["title"], "c++ (intro)");
        let filter = query.filter_json();
        assert_eq!(filter["$or"][0]["title"]["$regex"], json!(r"c\+\+ \(intro\)"));
        assert_eq!(filter["$or"][0]["title"]["$options"], json!("i"));
    }

    #[test]
    fn test_empty_filters_are_not_emitted() {
        let query = ObjectQuery::new(ObjectKind::Articles)
            .any_of(meta("tags"), &[])
            .text(&["title"], "")
            .between(meta("date_added"), None, None);
        assert_eq!(query.filter_json(), json!({"type": "articles"}));
    }

    #[test]
    fn test_between_with_single_bound() {
        let query = ObjectQuery::new(ObjectKind::Articles).between(
            meta("date_added"),
            Some("2024-01-01"),
            None,
        );
        assert_eq!(
            query.filter_json()["metadata.date_added"],
            json!({"$gte": "2024-01-01"})
        );
    }
}
