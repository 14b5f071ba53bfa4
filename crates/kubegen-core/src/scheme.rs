//! Registry of schema versions and media types

use std::fmt;

use crate::format::SerializerInfo;
use crate::model::Kind;

/// API group and version, written as `group/version` (or just `version`
/// for the core group).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersion {
    pub group: String,
    pub version: String,
}

impl GroupVersion {
    pub fn new(group: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
        }
    }

    /// Parse an `apiVersion` value.
    pub fn parse(api_version: &str) -> Self {
        match api_version.split_once('/') {
            Some((group, version)) => Self::new(group, version),
            None => Self::new("", api_version),
        }
    }
}

impl fmt::Display for GroupVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.group.is_empty() {
            f.write_str(&self.version)
        } else {
            write!(f, "{}/{}", self.group, self.version)
        }
    }
}

/// Built-in versions in priority order, with the kinds each one serves.
const BUILTIN_VERSIONS: &[(&str, &str, &[Kind])] = &[
    ("", "v1", &[Kind::Service]),
    (
        "extensions",
        "v1beta1",
        &[Kind::Deployment, Kind::ReplicaSet, Kind::DaemonSet],
    ),
    ("apps", "v1beta1", &[Kind::Deployment, Kind::StatefulSet]),
];

/// Explicit registry of schema versions and media types.
///
/// Built once, then only read. [`Scheme::new`] carries the built-in
/// tables; [`Scheme::empty`] is a starting point for custom registries.
#[derive(Debug, Clone)]
pub struct Scheme {
    known_types: Vec<(GroupVersion, Vec<Kind>)>,
    priority: Vec<GroupVersion>,
    media_types: Vec<SerializerInfo>,
}

impl Scheme {
    /// Scheme with the built-in versions and the YAML and JSON serializers.
    pub fn new() -> Self {
        let mut scheme = Self::empty();
        for (group, version, kinds) in BUILTIN_VERSIONS {
            scheme.add_known_types(GroupVersion::new(*group, *version), kinds);
        }
        scheme.add_media_type(SerializerInfo::yaml());
        scheme.add_media_type(SerializerInfo::json());
        scheme
    }

    pub fn empty() -> Self {
        Self {
            known_types: Vec::new(),
            priority: Vec::new(),
            media_types: Vec::new(),
        }
    }

    /// Register kinds under a version. A version seen for the first time is
    /// appended to the priority list.
    pub fn add_known_types(&mut self, version: GroupVersion, kinds: &[Kind]) -> &mut Self {
        if !self.priority.contains(&version) {
            self.priority.push(version.clone());
        }
        match self.known_types.iter_mut().find(|(v, _)| *v == version) {
            Some((_, known)) => {
                for kind in kinds {
                    if !known.contains(kind) {
                        known.push(*kind);
                    }
                }
            }
            None => self.known_types.push((version, kinds.to_vec())),
        }
        self
    }

    /// Replace the version priority list. Versions not listed are never
    /// chosen for encoding.
    pub fn set_version_priority(&mut self, priority: Vec<GroupVersion>) -> &mut Self {
        self.priority = priority;
        self
    }

    pub fn add_media_type(&mut self, info: SerializerInfo) -> &mut Self {
        self.media_types.retain(|existing| existing.media_type != info.media_type);
        self.media_types.push(info);
        self
    }

    pub fn supported_media_types(&self) -> &[SerializerInfo] {
        &self.media_types
    }

    /// Find the serializer for a content type. Parameters such as
    /// `; charset=utf-8` are ignored and the comparison is case-insensitive.
    pub fn serializer_info(&self, content_type: &str) -> Option<&SerializerInfo> {
        let essence = content_type.split(';').next().unwrap_or_default().trim();
        self.media_types
            .iter()
            .find(|info| info.media_type.eq_ignore_ascii_case(essence))
    }

    pub fn version_priority(&self) -> &[GroupVersion] {
        &self.priority
    }

    pub fn recognizes(&self, version: &GroupVersion, kind: Kind) -> bool {
        self.known_types
            .iter()
            .any(|(v, kinds)| v == version && kinds.contains(&kind))
    }

    /// First version in priority order that serves `kind`.
    pub fn preferred_version(&self, kind: Kind) -> Option<&GroupVersion> {
        self.priority
            .iter()
            .find(|version| self.recognizes(version, kind))
    }
}

impl Default for Scheme {
    fn default() -> Self {
        Self::new()
    }
}
