//! Query parameter building
//!
//! Request types declare their parameters explicitly through [`ToQuery`]
//! instead of having their fields discovered at runtime. Values render the
//! same way regardless of locale: dates as `YYYY-MM-DD`, floats with a `.`
//! decimal separator and booleans in lower case.

use chrono::NaiveDate;
use url::form_urlencoded;

/// A value that can be written as one or more query parameters.
pub trait QueryValue {
    /// Append `name=value` pairs for this value. Writing nothing is allowed.
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>);
}

impl QueryValue for str {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        if !self.is_empty() {
            pairs.push((name.to_string(), self.to_string()));
        }
    }
}

impl QueryValue for String {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        self.as_str().append_to(name, pairs);
    }
}

impl QueryValue for NaiveDate {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        pairs.push((name.to_string(), self.format("%Y-%m-%d").to_string()));
    }
}

impl QueryValue for bool {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        pairs.push((name.to_string(), self.to_string()));
    }
}

macro_rules! display_query_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl QueryValue for $ty {
                fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
                    pairs.push((name.to_string(), self.to_string()));
                }
            }
        )*
    };
}

// Display for floats never uses a locale-specific separator
display_query_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize, isize, f32, f64);

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        (**self).append_to(name, pairs);
    }
}

impl<T: QueryValue> QueryValue for Option<T> {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        if let Some(value) = self {
            value.append_to(name, pairs);
        }
    }
}

/// Lists repeat the parameter name once per element.
impl<T: QueryValue> QueryValue for [T] {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        for value in self {
            value.append_to(name, pairs);
        }
    }
}

impl<T: QueryValue> QueryValue for Vec<T> {
    fn append_to(&self, name: &str, pairs: &mut Vec<(String, String)>) {
        self.as_slice().append_to(name, pairs);
    }
}

/// Ordered query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a parameter; empty strings and `None` add nothing.
    pub fn param(mut self, name: &str, value: impl QueryValue) -> Self {
        value.append_to(name, &mut self.pairs);
        self
    }

    pub fn push(&mut self, name: &str, value: impl QueryValue) {
        value.append_to(name, &mut self.pairs);
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Form-urlencoded query string without the leading `?`.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .finish()
    }
}

/// Statically declared mapping from a request type to its query parameters.
pub trait ToQuery {
    fn to_query(&self) -> QueryParams;
}

impl ToQuery for QueryParams {
    fn to_query(&self) -> QueryParams {
        self.clone()
    }
}

impl ToQuery for () {
    fn to_query(&self) -> QueryParams {
        QueryParams::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Search {
        term: String,
        since: NaiveDate,
        ids: Vec<i64>,
        ratio: f64,
        active: bool,
        cursor: Option<u32>,
    }

    impl ToQuery for Search {
        fn to_query(&self) -> QueryParams {
            QueryParams::new()
                .param("term", &self.term)
                .param("since", self.since)
                .param("ids", &self.ids)
                .param("ratio", self.ratio)
                .param("active", self.active)
                .param("cursor", self.cursor)
        }
    }

    #[test]
    fn test_declared_mapping_renders_in_order() {
        let search = Search {
            term: "rust".to_string(),
            since: NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
            ids: vec![1, 2],
            ratio: 0.5,
            active: true,
            cursor: None,
        };

        assert_eq!(
            search.to_query().encode(),
            "term=rust&since=2024-03-09&ids=1&ids=2&ratio=0.5&active=true"
        );
    }

    #[test]
    fn test_empty_string_is_skipped() {
        let query = QueryParams::new().param("q", "").param("page", 3u32);
        assert_eq!(query.encode(), "page=3");
    }

    #[test]
    fn test_values_are_percent_encoded() {
        let query = QueryParams::new().param("name", "a&b=c");
        assert_eq!(query.encode(), "name=a%26b%3Dc");
    }

    #[test]
    fn test_empty_params() {
        assert!(().to_query().is_empty());
        assert_eq!(QueryParams::new().encode(), "");
    }
}
