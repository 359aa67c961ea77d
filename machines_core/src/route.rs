//! Front-end routes and their query parameters.

use url::form_urlencoded;

/// Decoded query string. Keeps insertion order; the first occurrence of a key wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `a=1&b=x%20y`, with or without a leading `?`.
    pub fn from_query(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        Self(
            form_urlencoded::parse(query.as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((key.into(), value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Like `get`, but an empty or whitespace-only value counts as absent.
    pub fn non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.trim().is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_query(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.0.iter())
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Machines,
    Machine(QueryParams),
    FinishSession(QueryParams),
}

impl Route {
    /// `None` for paths the front-end does not serve.
    pub fn parse(input: &str) -> Option<Self> {
        let (path, query) = match input.split_once('?') {
            Some((p, q)) => (p, q),
            None => (input, ""),
        };
        let path = match path.trim_end_matches('/') {
            "" => "/",
            p => p,
        };
        let params = QueryParams::from_query(query);
        match path {
            "/" => Some(Route::Home),
            "/login" => Some(Route::Login),
            "/machines" => Some(Route::Machines),
            "/machine" => Some(Route::Machine(params)),
            "/finish_session" => Some(Route::FinishSession(params)),
            _ => None,
        }
    }

    pub fn machine(id: &str) -> Self {
        Route::Machine(QueryParams::new().with("id", id))
    }

    /// Path plus encoded query, suitable for `parse` again.
    pub fn path(&self) -> String {
        let (base, params) = match self {
            Route::Home => return "/".to_string(),
            Route::Login => return "/login".to_string(),
            Route::Machines => return "/machines".to_string(),
            Route::Machine(p) => ("/machine", p),
            Route::FinishSession(p) => ("/finish_session", p),
        };
        if params.is_empty() {
            base.to_string()
        } else {
            format!("{base}?{}", params.to_query())
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path())
    }
}
