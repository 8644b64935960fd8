// File reference normalization for caller locations

use crate::config::ResolverOptions;
use url::Url;

/// Rewrites bundler, dev-server and build-machine file references into
/// portable project-relative paths.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    loader_prefixes: Vec<String>,
    asset_prefixes: Vec<String>,
    source_roots: Vec<String>,
}

impl PathNormalizer {
    pub fn new(options: &ResolverOptions) -> Self {
        Self {
            loader_prefixes: options.loader_prefixes.clone(),
            asset_prefixes: options.asset_prefixes.clone(),
            source_roots: options.source_roots.clone(),
        }
    }

    /// Normalize a raw file reference.
    ///
    /// Rewrites apply in order: module-loader prefix, then URL path and
    /// static-asset prefix for `http(s)` references, then the suffix starting
    /// at the first known source root. References matching no source root
    /// keep whatever the earlier steps left.
    pub fn normalize(&self, raw: &str) -> String {
        let mut path = raw.trim();

        if let Some(rest) = self
            .loader_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
        {
            path = rest;
        }

        let path = if is_http_url(path) {
            self.served_path(path)
        } else {
            path.to_string()
        };

        match self.project_suffix(&path) {
            Some(suffix) => suffix,
            None => path,
        }
    }

    /// Path component of a served URL, minus any static-asset prefix
    fn served_path(&self, url: &str) -> String {
        let parsed = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => return url.to_string(),
        };

        let path = parsed.path();
        self.asset_prefixes
            .iter()
            .find_map(|prefix| path.strip_prefix(prefix.as_str()))
            .unwrap_or(path)
            .to_string()
    }

    /// Suffix of `path` starting at the first segment naming a source root
    fn project_suffix(&self, path: &str) -> Option<String> {
        let mut offset = 0;
        for segment in path.split(['/', '\\']) {
            if self.source_roots.iter().any(|root| root == segment) {
                return Some(path[offset..].replace('\\', "/"));
            }
            offset += segment.len() + 1;
        }
        None
    }
}

impl Default for PathNormalizer {
    fn default() -> Self {
        Self::new(&ResolverOptions::default())
    }
}

fn is_http_url(path: &str) -> bool {
    path.starts_with("http://") || path.starts_with("https://")
}
