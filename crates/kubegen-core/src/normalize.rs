//! Removal of encoder noise from YAML documents
//!
//! The encoder writes unset fields as `null` or `{}`. Only a fixed set of
//! paths is cleaned, and only when the value there is null (for
//! `creationTimestamp`) or an empty mapping (everything else). Rules run in
//! a fixed order: a parent emptied by one rule is removed before the next
//! rule looks at the item.

use serde_yaml::{Mapping, Value};
use tracing::trace;

use crate::document::{
    ShapeError, ShapeResult, delete_if_empty_mapping, delete_nested_if_empty_mapping,
    delete_nested_if_null, join, mapping_mut, sequence_mut, type_name,
};
use crate::error::{Error, Result};
use crate::format::Format;

const COMPONENT: &str = "normalize";

/// Normalize encoded bytes. Only YAML is rewritten; every other content
/// type is returned unchanged.
pub fn normalize(content_type: &str, input: &[u8]) -> Result<Vec<u8>> {
    match Format::from_content_type(content_type) {
        Some(format) => normalize_format(format, content_type, input),
        None => Ok(input.to_vec()),
    }
}

/// Normalize bytes whose format is already resolved, e.g. by a [`Codec`]
/// for a media type registered on a custom scheme. `content_type` is only
/// used in error messages.
///
/// [`Codec`]: crate::format::Codec
pub fn normalize_format(format: Format, content_type: &str, input: &[u8]) -> Result<Vec<u8>> {
    if format != Format::Yaml {
        return Ok(input.to_vec());
    }

    let value: Value =
        serde_yaml::from_slice(input).map_err(|e| Error::decode(COMPONENT, content_type, e))?;

    let mut document = match value {
        Value::Mapping(mapping) => mapping,
        Value::Null => Mapping::new(),
        other => {
            return Err(Error::shape(
                COMPONENT,
                content_type,
                ShapeError::new("document", "mapping", type_name(&other)),
            ));
        }
    };

    strip_noise(&mut document).map_err(|e| Error::shape(COMPONENT, content_type, e))?;

    serde_yaml::to_string(&document)
        .map(String::into_bytes)
        .map_err(|e| Error::encode(COMPONENT, "document", content_type, e))
}

/// Apply the noise rules to a decoded document in place.
pub fn strip_noise(document: &mut Mapping) -> ShapeResult<()> {
    delete_if_empty_mapping(document, "metadata", "")?;

    let Some(items) = sequence_mut(document, "items", "")? else {
        return Ok(());
    };

    for (i, item) in items.iter_mut().enumerate() {
        let path = format!("items[{i}]");
        let item = expect_mapping(item, &path)?;
        if !item.is_empty() {
            strip_item(item, &path)?;
        }
    }
    Ok(())
}

fn expect_mapping<'a>(value: &'a mut Value, path: &str) -> ShapeResult<&'a mut Mapping> {
    match value {
        Value::Mapping(mapping) => Ok(mapping),
        other => Err(ShapeError::new(path, "mapping", type_name(other))),
    }
}

fn strip_item(item: &mut Mapping, path: &str) -> ShapeResult<()> {
    trace!(%path, "stripping item");
    delete_nested_if_null(item, "metadata", "creationTimestamp", path)?;
    delete_nested_if_empty_mapping(item, "status", "loadBalancer", path)?;
    delete_nested_if_empty_mapping(item, "spec", "strategy", path)?;

    let spec_path = join(path, "spec");
    let Some(spec) = mapping_mut(item, "spec", path)? else {
        return Ok(());
    };
    if spec.is_empty() {
        return Ok(());
    }

    let template_path = join(&spec_path, "template");
    let Some(template) = mapping_mut(spec, "template", &spec_path)? else {
        return Ok(());
    };
    if template.is_empty() {
        return Ok(());
    }

    strip_containers(template, &template_path)?;
    delete_nested_if_null(template, "metadata", "creationTimestamp", &template_path)
}

fn strip_containers(template: &mut Mapping, path: &str) -> ShapeResult<()> {
    let pod_path = join(path, "spec");
    let Some(pod_spec) = mapping_mut(template, "spec", path)? else {
        return Ok(());
    };
    if pod_spec.is_empty() {
        return Ok(());
    }

    let Some(containers) = sequence_mut(pod_spec, "containers", &pod_path)? else {
        return Ok(());
    };

    for (i, container) in containers.iter_mut().enumerate() {
        let path = format!("{pod_path}.containers[{i}]");
        let container = expect_mapping(container, &path)?;
        if container.is_empty() {
            continue;
        }
        // empty-mapping check only; a null here is left alone
        delete_if_empty_mapping(container, "resources", &path)?;
        delete_if_empty_mapping(container, "securityContext", &path)?;
    }
    Ok(())
}
