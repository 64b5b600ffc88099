use std::fmt;

use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// Rendered between breadcrumb labels; non-breaking so the gaps survive HTML collapsing.
pub const BREADCRUMB_SEPARATOR: &str = "\u{a0}\u{a0}\u{a0}>\u{a0}\u{a0}\u{a0}";

/// One node of the navigation tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteEntry {
    pub label: String,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub children: IndexMap<String, RouteEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub machine_name: Option<String>,
}

/// Nested path-segment → entry mapping, in config order. Passed around as configuration, never global.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    entries: IndexMap<String, RouteEntry>,
}

/// The machine a leaf route points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Machine {
    pub machine_name: String,
    pub label: String,
}

/// A navigable machine route, for the sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MachineLink {
    pub path: String,
    pub label: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Breadcrumb {
    pub labels: Vec<String>,
}

impl fmt::Display for Breadcrumb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.labels.join(BREADCRUMB_SEPARATOR))
    }
}

/// Strip `{root}/` and split the rest into non-empty segments.
pub fn path_segments<'a>(pathname: &'a str, root: &str) -> Vec<&'a str> {
    let root = root.trim_end_matches('/');
    let rest = match pathname.strip_prefix(root) {
        Some(r) if r.is_empty() || r.starts_with('/') => r,
        _ => pathname,
    };
    rest.split('/').filter(|s| !s.is_empty()).collect()
}

impl RouteTable {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Walk the tree segment by segment; every step after the first descends into `children`.
    pub fn trail<'a>(&'a self, segments: &[&str]) -> Option<Vec<&'a RouteEntry>> {
        let mut level = &self.entries;
        let mut trail = Vec::with_capacity(segments.len());
        for segment in segments {
            let Some(entry) = level.get(*segment) else {
                debug!("route segment {segment:?} not in route table");
                return None;
            };
            trail.push(entry);
            level = &entry.children;
        }
        Some(trail)
    }

    pub fn get(&self, segments: &[&str]) -> Option<&RouteEntry> {
        self.trail(segments).and_then(|t| t.last().copied())
    }

    /// Labels along the path; `None` when the path is empty or any segment is unknown.
    pub fn breadcrumb(&self, segments: &[&str]) -> Option<Breadcrumb> {
        if segments.is_empty() {
            return None;
        }
        let trail = self.trail(segments)?;
        Some(Breadcrumb {
            labels: trail.iter().map(|e| e.label.clone()).collect(),
        })
    }

    pub fn machine(&self, segments: &[&str]) -> Option<Machine> {
        let entry = self.get(segments)?;
        let machine_name = entry.machine_name.clone()?;
        Some(Machine {
            machine_name,
            label: entry.label.clone(),
        })
    }

    /// Every route that carries a machine, depth-first in config order.
    pub fn machines(&self) -> Vec<MachineLink> {
        fn walk(prefix: &str, level: &IndexMap<String, RouteEntry>, out: &mut Vec<MachineLink>) {
            for (segment, entry) in level {
                let path = if prefix.is_empty() {
                    segment.clone()
                } else {
                    format!("{prefix}/{segment}")
                };
                if entry.machine_name.is_some() {
                    out.push(MachineLink {
                        path: path.clone(),
                        label: entry.label.clone(),
                    });
                }
                walk(&path, &entry.children, out);
            }
        }
        let mut out = Vec::new();
        walk("", &self.entries, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RouteTable {
        serde_json::from_str(
            r#"{
                "a": {"label": "A", "children": {"b": {"label": "B", "machine_name": "host-b"}}},
                "z": {"label": "Z"}
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn breadcrumb_joins_labels() {
        let crumb = table().breadcrumb(&["a", "b"]).unwrap();
        assert_eq!(crumb.labels, vec!["A", "B"]);
        assert_eq!(crumb.to_string(), format!("A{BREADCRUMB_SEPARATOR}B"));
        assert_eq!(crumb.to_string().replace('\u{a0}', " "), "A   >   B");
    }

    #[test]
    fn missing_segment_gives_no_breadcrumb() {
        assert!(table().breadcrumb(&["a", "nope"]).is_none());
        assert!(table().breadcrumb(&["b"]).is_none());
        assert!(table().breadcrumb(&[]).is_none());
    }

    #[test]
    fn segments_strip_root_prefix() {
        assert_eq!(path_segments("/statistics/a/b", "/statistics"), vec!["a", "b"]);
        assert_eq!(path_segments("/statistics/a/b/", "/statistics/"), vec!["a", "b"]);
        assert_eq!(path_segments("/a", "/statistics"), vec!["a"]);
        assert!(path_segments("/statistics", "/statistics").is_empty());
    }

    #[test]
    fn machine_comes_from_full_path() {
        let t = table();
        let m = t.machine(&["a", "b"]).unwrap();
        assert_eq!(m.machine_name, "host-b");
        assert!(t.machine(&["a"]).is_none());
        assert!(t.machine(&["z"]).is_none());
    }

    #[test]
    fn machines_keep_config_order() {
        let t: RouteTable = serde_json::from_str(
            r#"{
                "web": {"label": "Web", "children": {
                    "web-02": {"label": "web-02", "machine_name": "web-02"},
                    "web-01": {"label": "web-01", "machine_name": "web-01"}
                }},
                "db": {"label": "DB", "machine_name": "db-01"}
            }"#,
        )
        .unwrap();
        let paths: Vec<String> = t.machines().into_iter().map(|l| l.path).collect();
        assert_eq!(paths, vec!["web/web-02", "web/web-01", "db"]);
    }

    #[test]
    fn machines_lists_leaf_routes() {
        let links = table().machines();
        assert_eq!(
            links,
            vec![MachineLink {
                path: "a/b".into(),
                label: "B".into()
            }]
        );
    }
}
