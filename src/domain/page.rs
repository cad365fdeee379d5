/// Marker identifying the single resource a page is about, e.g. one
/// question. Pages without a marker (lists, tag index) never join
/// resource-scoped groups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMarker {
    kind: String,
    id: Option<String>,
}

impl ResourceMarker {
    pub fn new(kind: impl Into<String>, id: Option<String>) -> Self {
        Self {
            kind: kind.into(),
            id,
        }
    }

    pub fn question(id: Option<String>) -> Self {
        Self::new("question", id)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }
}

/// Explicit page context: the marker plus the page's query parameters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PageContext {
    marker: Option<ResourceMarker>,
    params: Vec<(String, String)>,
}

impl PageContext {
    pub fn new(marker: Option<ResourceMarker>, params: Vec<(String, String)>) -> Self {
        Self { marker, params }
    }

    pub fn marker(&self) -> Option<&ResourceMarker> {
        self.marker.as_ref()
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .map(|(_, value)| value.as_str())
    }

    /// Resolves the resource id: the marker's own id wins, then the `id`
    /// page parameter. `None` means resource-scoped wiring must not run.
    pub fn resource_id(&self) -> Option<&str> {
        self.marker
            .as_ref()
            .and_then(|marker| marker.id())
            .or_else(|| self.param("id"))
    }
}

#[derive(Debug, PartialEq, Eq)]
pub struct PageParamParseError {
    pub raw: String,
}

impl std::fmt::Display for PageParamParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "page parameter must look like key=value, got {:?}", self.raw)
    }
}

impl std::error::Error for PageParamParseError {}

pub fn parse_page_param(raw: &str) -> Result<(String, String), PageParamParseError> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_owned(), value.to_owned())),
        _ => Err(PageParamParseError {
            raw: raw.to_owned(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn marker_id_wins_over_page_parameter() {
        let page = PageContext::new(
            Some(ResourceMarker::question(Some("17".to_owned()))),
            vec![("id".to_owned(), "99".to_owned())],
        );

        assert_eq!(page.resource_id(), Some("17"));
    }

    #[test]
    fn falls_back_to_the_id_page_parameter() {
        let page = PageContext::new(
            Some(ResourceMarker::question(None)),
            vec![("id".to_owned(), "99".to_owned())],
        );

        assert_eq!(page.resource_id(), Some("99"));
    }

    #[test]
    fn resolves_nothing_without_marker_id_or_parameter() {
        let page = PageContext::new(Some(ResourceMarker::question(None)), vec![]);

        assert_eq!(page.resource_id(), None);
    }

    #[test]
    fn parses_key_value_parameters() {
        assert_eq!(
            parse_page_param("id=42"),
            Ok(("id".to_owned(), "42".to_owned()))
        );
        assert_eq!(
            parse_page_param("sort="),
            Ok(("sort".to_owned(), String::new()))
        );
    }

    #[test]
    fn rejects_parameters_without_a_key_or_separator() {
        assert!(parse_page_param("id").is_err());
        assert!(parse_page_param("=42").is_err());
    }
}
