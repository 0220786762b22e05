//! Route lookup.
//!
//! # Responsibilities
//! - Build the route table for one invocation
//! - Look up the inbound path by exact match
//! - Compute the route-specific upstream query parameters
//!
//! # Design Decisions
//! - The program id is interpolated into the table before lookup, so matching
//!   is plain string equality (no wildcards, no regex)
//! - Explicit UnsupportedRoute rather than a silent default

use crate::config::UpstreamConfig;
use crate::error::{ProxyError, ProxyResult};
use crate::invocation::event::{unescape, InboundRequest};

/// Caller-facing routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Programmes,
    Program,
    Schedule,
}

impl Route {
    /// Upstream endpoint, relative to the configured base URL.
    pub fn upstream_path(self) -> &'static str {
        match self {
            Route::Programmes => "/programme/GetProgrammesList",
            Route::Program => "/programme/GetProgramme",
            Route::Schedule => "/timetable/getTimetable",
        }
    }

    /// Short label for logs and metrics.
    pub fn name(self) -> &'static str {
        match self {
            Route::Programmes => "programmes",
            Route::Program => "program",
            Route::Schedule => "schedule",
        }
    }
}

/// The exact path keys accepted for one invocation, in lookup order.
#[derive(Debug, Clone)]
pub struct RouteTable {
    entries: [(String, Route); 3],
}

impl RouteTable {
    /// Build the table, interpolating the escaped program id when present.
    pub fn new(program_id: Option<&str>) -> Self {
        Self {
            entries: [
                ("/programmes".to_string(), Route::Programmes),
                (format!("/program/{}", program_id.unwrap_or("")), Route::Program),
                ("/schedule".to_string(), Route::Schedule),
            ],
        }
    }

    /// Exact-match lookup.
    pub fn lookup(&self, path: &str) -> Option<Route> {
        self.entries
            .iter()
            .find(|(key, _)| key == path)
            .map(|(_, route)| *route)
    }
}

/// A fully resolved upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute {
    pub route: Route,
    pub url: String,
    pub query: Vec<(String, String)>,
}

/// Resolve an inbound request to its upstream URL and query parameters.
pub fn resolve(request: &InboundRequest, upstream: &UpstreamConfig) -> ProxyResult<ResolvedRoute> {
    let table = RouteTable::new(request.program_id.as_deref());
    let route = table
        .lookup(&request.path)
        .ok_or_else(|| ProxyError::UnsupportedRoute(request.path.clone()))?;

    let mut query = Vec::with_capacity(2);
    match (route, request.program_id.as_deref()) {
        (Route::Schedule, _) => query.push(("slideIndex".to_string(), "0".to_string())),
        (Route::Program, Some(id)) => query.push(("urlname".to_string(), unescape(id)?)),
        _ => {}
    }
    query.push(("rootId".to_string(), upstream.root_id.clone()));

    let url = format!(
        "{}{}",
        upstream.base_url.trim_end_matches('/'),
        route.upstream_path()
    );

    Ok(ResolvedRoute { route, url, query })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(path: &str, program_id: Option<&str>) -> InboundRequest {
        InboundRequest {
            path: path.to_string(),
            program_id: program_id.map(str::to_string),
        }
    }

    fn pairs(query: &[(String, String)]) -> Vec<(&str, &str)> {
        query.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
    }

    #[test]
    fn test_programmes() {
        let resolved = resolve(&request("/programmes", None), &UpstreamConfig::default()).unwrap();
        assert_eq!(resolved.route, Route::Programmes);
        assert_eq!(
            resolved.url,
            "https://glz.co.il/umbraco/api/programme/GetProgrammesList"
        );
        assert_eq!(pairs(&resolved.query), vec![("rootId", "1051")]);
    }

    #[test]
    fn test_schedule_adds_slide_index() {
        let resolved = resolve(&request("/schedule", None), &UpstreamConfig::default()).unwrap();
        assert_eq!(resolved.url, "https://glz.co.il/umbraco/api/timetable/getTimetable");
        assert_eq!(
            pairs(&resolved.query),
            vec![("slideIndex", "0"), ("rootId", "1051")]
        );
    }

    #[test]
    fn test_program_uses_unescaped_id() {
        let resolved = resolve(
            &request("/program/%D7%A9%D7%9C%D7%95%D7%9D%20x", Some("%D7%A9%D7%9C%D7%95%D7%9D%20x")),
            &UpstreamConfig::default(),
        )
        .unwrap();
        assert_eq!(resolved.route, Route::Program);
        assert_eq!(resolved.url, "https://glz.co.il/umbraco/api/programme/GetProgramme");
        assert_eq!(
            pairs(&resolved.query),
            vec![("urlname", "שלום x"), ("rootId", "1051")]
        );
    }

    #[test]
    fn test_program_path_must_match_id() {
        let err = resolve(&request("/program/other", Some("mine")), &UpstreamConfig::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Route /program/other isn't supported by this API");
    }

    #[test]
    fn test_program_without_id_collapses() {
        let resolved = resolve(&request("/program/", None), &UpstreamConfig::default()).unwrap();
        assert_eq!(resolved.route, Route::Program);
        assert_eq!(pairs(&resolved.query), vec![("rootId", "1051")]);

        assert!(resolve(&request("/program/abc", None), &UpstreamConfig::default()).is_err());
    }

    #[test]
    fn test_unsupported_routes() {
        for path in ["/", "/programmes/", "/Schedule", "/schedule?x=1", ""] {
            let err = resolve(&request(path, None), &UpstreamConfig::default()).unwrap_err();
            assert_eq!(err.status_code(), 400);
            assert_eq!(err.to_string(), format!("Route {path} isn't supported by this API"));
        }
    }

    #[test]
    fn test_base_url_and_root_id_from_config() {
        let upstream = UpstreamConfig {
            base_url: "http://127.0.0.1:9000/api/".into(),
            root_id: "7".into(),
            ..UpstreamConfig::default()
        };
        let resolved = resolve(&request("/programmes", None), &upstream).unwrap();
        assert_eq!(resolved.url, "http://127.0.0.1:9000/api/programme/GetProgrammesList");
        assert_eq!(pairs(&resolved.query), vec![("rootId", "7")]);
    }
}
