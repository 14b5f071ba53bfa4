//! Splitting a collection of objects into one artifact per object

use std::collections::HashMap;
use std::io;
use std::path::{Component, Path};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::format::{Format, resolve};
use crate::io::write_atomic;
use crate::model::{Kind, Object};
use crate::normalize::normalize_format;
use crate::scheme::Scheme;
use crate::GENERATOR;

/// Filename suffix per kind: `<name>-<suffix>.<ext>`.
const FILENAME_RULES: &[(Kind, &str)] = &[
    (Kind::Service, "svc"),
    (Kind::Deployment, "dpl"),
    (Kind::ReplicaSet, "rs"),
    (Kind::DaemonSet, "ds"),
    (Kind::StatefulSet, "ss"),
];

/// Filename suffix for a kind, if it has one.
pub fn filename_suffix(kind: &str) -> Option<&'static str> {
    let kind = Kind::parse(kind)?;
    FILENAME_RULES
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, suffix)| *suffix)
}

/// Check that an object name can be used as part of a filename.
fn validate_name(name: &str) -> std::result::Result<(), &'static str> {
    if name.is_empty() {
        return Err("name is empty");
    }
    if name.contains('/') || name.contains('\\') {
        return Err("name contains a path separator");
    }
    if name.contains("..") {
        return Err("name contains '..'");
    }
    Ok(())
}

/// How the extension of generated files is chosen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionPolicy {
    /// Extension of the requested content type (`yaml`, `json`).
    #[default]
    ByContentType,
    /// Always the YAML extension, whatever the content type.
    AlwaysStructured,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PartitionOptions {
    pub extension: ExtensionPolicy,
}

/// One generated file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content: Vec<u8>,
}

/// An object that could not be turned into an artifact
#[derive(Debug)]
pub struct Rejected {
    /// Position of the object in the input.
    pub index: usize,
    pub error: Error,
}

/// Result of partitioning: artifacts in input order plus rejected objects.
#[derive(Debug, Default)]
pub struct Partition {
    pub artifacts: Vec<Artifact>,
    pub rejected: Vec<Rejected>,
}

impl Partition {
    pub fn filenames(&self) -> impl Iterator<Item = &str> {
        self.artifacts.iter().map(|a| a.filename.as_str())
    }

    /// Whether every object produced an artifact.
    pub fn is_complete(&self) -> bool {
        self.rejected.is_empty()
    }
}

/// Outcome of [`Partitioner::dump_to_files`]
#[derive(Debug, Default)]
pub struct DumpReport {
    /// Files written, in input order.
    pub written: Vec<String>,
    pub rejected: Vec<Rejected>,
}

pub struct Partitioner<'s> {
    scheme: &'s Scheme,
    options: PartitionOptions,
}

impl<'s> Partitioner<'s> {
    pub fn new(scheme: &'s Scheme) -> Self {
        Self::with_options(scheme, PartitionOptions::default())
    }

    pub fn with_options(scheme: &'s Scheme, options: PartitionOptions) -> Self {
        Self { scheme, options }
    }

    fn extension(&self, format: Format) -> &'static str {
        match self.options.extension {
            ExtensionPolicy::ByContentType => format.extension(),
            ExtensionPolicy::AlwaysStructured => {
                if format != Format::Yaml {
                    warn!(
                        media_type = format.content_type(),
                        "writing {} files with the {} extension",
                        format.extension(),
                        Format::Yaml.extension()
                    );
                }
                Format::Yaml.extension()
            }
        }
    }

    /// Filename of the artifact for `object`, or the reason it gets none.
    fn filename(object: &Object, extension: &str) -> Result<String> {
        let Some(suffix) = filename_suffix(object.kind()) else {
            return Err(Error::UnknownDiscriminator {
                kind: object.kind().to_string(),
                name: object.name().to_string(),
            });
        };
        validate_name(object.name()).map_err(|reason| Error::InvalidName {
            kind: object.kind().to_string(),
            name: object.name().to_string(),
            reason,
        })?;
        Ok(format!("{}-{}.{}", object.name(), suffix, extension))
    }

    /// Encode every object on its own, pretty-printed and normalized.
    ///
    /// Objects that cannot be given a filename of their own (unknown kind,
    /// unusable name, or a filename already taken by an earlier object) are
    /// collected in [`Partition::rejected`]; encoding failures abort the
    /// whole call.
    pub fn partition(&self, items: &[Object], content_type: &str) -> Result<Partition> {
        let codec = resolve(self.scheme, content_type, true)?;
        let format = codec.format();
        let extension = self.extension(format);
        let mut partition = Partition::default();
        let mut taken: HashMap<String, usize> = HashMap::new();

        for (index, object) in items.iter().enumerate() {
            let filename = Self::filename(object, extension).and_then(|filename| {
                match taken.get(&filename) {
                    Some(&first) => Err(Error::DuplicateFilename { filename, first }),
                    None => Ok(filename),
                }
            });
            let filename = match filename {
                Ok(filename) => filename,
                Err(error) => {
                    warn!(
                        index,
                        kind = object.kind(),
                        name = object.name(),
                        %error,
                        "skipping object"
                    );
                    partition.rejected.push(Rejected { index, error });
                    continue;
                }
            };
            taken.insert(filename.clone(), index);

            let data = codec.encode(object)?;
            let data = normalize_format(format, codec.media_type(), &data)?;

            let content = match format.comment_style().banner(GENERATOR, &filename) {
                Some(banner) => [banner.into_bytes(), data].concat(),
                None => data,
            };

            debug!(%filename, bytes = content.len(), "built artifact");
            partition.artifacts.push(Artifact { filename, content });
        }

        Ok(partition)
    }

    /// Partition `items` and write each artifact into `dir`.
    ///
    /// Stops at the first failed write. Files written before the failure
    /// are left in place.
    pub fn dump_to_files(
        &self,
        items: &[Object],
        content_type: &str,
        dir: &Path,
    ) -> Result<DumpReport> {
        let partition = self.partition(items, content_type)?;
        let written = write_artifacts(dir, &partition.artifacts)?;
        Ok(DumpReport {
            written,
            rejected: partition.rejected,
        })
    }
}

/// Write artifacts into `dir` in order, returning their filenames.
///
/// Every filename must be a plain file name; anything that would resolve
/// outside `dir` fails like any other write.
pub fn write_artifacts(dir: &Path, artifacts: &[Artifact]) -> Result<Vec<String>> {
    let mut written = Vec::with_capacity(artifacts.len());
    for artifact in artifacts {
        let path = dir.join(&artifact.filename);
        let mut components = Path::new(&artifact.filename).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(Error::write(
                path,
                io::Error::new(io::ErrorKind::InvalidInput, "not a plain file name"),
            ));
        }
        write_atomic(&path, &artifact.content)?;
        info!(filename = %artifact.filename, "wrote artifact");
        written.push(artifact.filename.clone());
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{JSON_CONTENT_TYPE, YAML_CONTENT_TYPE};
    use crate::model::{DaemonSet, ObjectMeta, RawObject, ReplicaSet, Service};
    use rstest::rstest;

    #[rstest]
    #[case("Service", Some("svc"))]
    #[case("Deployment", Some("dpl"))]
    #[case("ReplicaSet", Some("rs"))]
    #[case("DaemonSet", Some("ds"))]
    #[case("StatefulSet", Some("ss"))]
    #[case("ConfigMap", None)]
    #[case("", None)]
    fn test_filename_suffix(#[case] kind: &str, #[case] expected: Option<&str>) {
        assert_eq!(filename_suffix(kind), expected);
    }

    #[test]
    fn test_json_extension_follows_policy() {
        let scheme = Scheme::new();
        let items: Vec<Object> = vec![
            ReplicaSet {
                metadata: ObjectMeta::named("web"),
                ..ReplicaSet::default()
            }
            .into(),
        ];

        let partition = Partitioner::new(&scheme)
            .partition(&items, JSON_CONTENT_TYPE)
            .unwrap();
        assert_eq!(partition.filenames().collect::<Vec<_>>(), ["web-rs.json"]);
        assert!(partition.artifacts[0].content.starts_with(b"{\n"));

        let legacy = Partitioner::with_options(
            &scheme,
            PartitionOptions {
                extension: ExtensionPolicy::AlwaysStructured,
            },
        )
        .partition(&items, JSON_CONTENT_TYPE)
        .unwrap();
        assert_eq!(legacy.filenames().collect::<Vec<_>>(), ["web-rs.yaml"]);
    }

    #[test]
    fn test_unknown_kind_is_rejected_and_others_continue() {
        let scheme = Scheme::new();
        let items = vec![
            Object::Other(RawObject {
                api_version: "v1".into(),
                kind: "ConfigMap".into(),
                fields: serde_yaml::from_str("metadata:\n  name: settings\n").unwrap(),
            }),
            DaemonSet {
                metadata: ObjectMeta::named("agent"),
                ..DaemonSet::default()
            }
            .into(),
        ];

        let partition = Partitioner::new(&scheme)
            .partition(&items, YAML_CONTENT_TYPE)
            .unwrap();
        assert!(!partition.is_complete());
        assert_eq!(partition.filenames().collect::<Vec<_>>(), ["agent-ds.yaml"]);
        assert_eq!(partition.rejected.len(), 1);
        assert_eq!(partition.rejected[0].index, 0);
        assert!(matches!(
            &partition.rejected[0].error,
            Error::UnknownDiscriminator { kind, name } if kind == "ConfigMap" && name == "settings"
        ));
    }

    fn service(name: &str) -> Object {
        Service {
            metadata: ObjectMeta::named(name),
            ..Service::default()
        }
        .into()
    }

    #[rstest]
    #[case("", "name is empty")]
    #[case("../escaped", "name contains a path separator")]
    #[case("nested/api", "name contains a path separator")]
    #[case("nested\\api", "name contains a path separator")]
    #[case("..", "name contains '..'")]
    #[case("api..v2", "name contains '..'")]
    fn test_unusable_names_are_rejected(#[case] name: &str, #[case] expected: &str) {
        let scheme = Scheme::new();
        let items = vec![service(name), service("api")];

        let partition = Partitioner::new(&scheme)
            .partition(&items, YAML_CONTENT_TYPE)
            .unwrap();
        assert_eq!(partition.filenames().collect::<Vec<_>>(), ["api-svc.yaml"]);
        assert_eq!(partition.rejected.len(), 1);
        assert_eq!(partition.rejected[0].index, 0);
        assert!(matches!(
            &partition.rejected[0].error,
            Error::InvalidName { name: n, reason, .. } if n == name && *reason == expected
        ));
    }

    #[test]
    fn test_duplicate_filename_is_rejected() {
        let scheme = Scheme::new();
        let items = vec![service("api"), service("web"), service("api")];

        let partition = Partitioner::new(&scheme)
            .partition(&items, YAML_CONTENT_TYPE)
            .unwrap();
        assert_eq!(
            partition.filenames().collect::<Vec<_>>(),
            ["api-svc.yaml", "web-svc.yaml"]
        );
        assert_eq!(partition.rejected.len(), 1);
        assert_eq!(partition.rejected[0].index, 2);
        assert!(matches!(
            &partition.rejected[0].error,
            Error::DuplicateFilename { filename, first: 0 } if filename == "api-svc.yaml"
        ));
    }

    #[test]
    fn test_same_name_different_kind_is_not_a_duplicate() {
        let scheme = Scheme::new();
        let items = vec![
            service("api"),
            DaemonSet {
                metadata: ObjectMeta::named("api"),
                ..DaemonSet::default()
            }
            .into(),
        ];

        let partition = Partitioner::new(&scheme)
            .partition(&items, YAML_CONTENT_TYPE)
            .unwrap();
        assert!(partition.is_complete());
        assert_eq!(
            partition.filenames().collect::<Vec<_>>(),
            ["api-svc.yaml", "api-ds.yaml"]
        );
    }

    #[rstest]
    #[case("../escaped-svc.yaml")]
    #[case("nested/api-svc.yaml")]
    #[case("/tmp/api-svc.yaml")]
    fn test_write_artifacts_refuses_paths(#[case] filename: &str) {
        let root = tempfile::TempDir::new().unwrap();
        let dir = root.path().join("out");
        let artifacts = vec![Artifact {
            filename: filename.to_string(),
            content: b"kind: Service\n".to_vec(),
        }];

        let err = write_artifacts(&dir, &artifacts).unwrap_err();
        assert!(matches!(err, Error::Write { .. }));
        assert!(!root.path().join("escaped-svc.yaml").exists());
        assert!(!dir.exists());
    }
}
