//! Attribute access shared by tags, tables and table cells.

use std::ops::Range;

use wikispan_syntax::attrs;

use crate::{EditError, WikiText};

/// Where the attributes of a construct live, in its own offsets.
#[derive(Debug, Clone)]
pub struct AttrRegion {
    pub(crate) text: String,
    pub(crate) shadow: String,
    pub(crate) range: Range<usize>,
    /// The construct has no attribute part yet; `range` is the empty range
    /// where one would start.
    pub(crate) missing: bool,
}

/// HTML-style attributes (`name="value"`) of a construct.
pub trait HasAttributes {
    fn attr_owner(&self) -> &WikiText;

    fn attr_region(&self) -> AttrRegion;

    /// Create an empty attribute part at `region.range`.
    fn open_attrs(&self, region: &AttrRegion) -> Result<(), EditError> {
        let _ = region;
        Ok(())
    }

    /// Every attribute in order, bare names with an empty value.
    fn attrs(&self) -> Vec<(String, String)> {
        let region = self.attr_region();
        attrs::parse(&region.shadow, region.range.clone())
            .into_iter()
            .map(|attr| {
                let value = attr
                    .value
                    .map(|v| region.text[v].to_owned())
                    .unwrap_or_default();
                (region.text[attr.name].to_owned(), value)
            })
            .collect()
    }

    /// The value of the last attribute named `name`.
    fn get_attr(&self, name: &str) -> Option<String> {
        let region = self.attr_region();
        let parsed = attrs::parse(&region.shadow, region.range.clone());
        let attr = attrs::find(&region.shadow, &parsed, name)?;
        Some(
            attr.value
                .clone()
                .map(|v| region.text[v].to_owned())
                .unwrap_or_default(),
        )
    }

    fn has_attr(&self, name: &str) -> bool {
        self.get_attr(name).is_some()
    }

    fn set_attr(&self, name: &str, value: &str) -> Result<(), EditError> {
        let mut region = self.attr_region();
        if region.missing {
            self.open_attrs(&region)?;
            region = self.attr_region();
        }
        let splice = attrs::set(&region.shadow, region.range, name, value);
        self.attr_owner().splice_local(splice.range, &splice.text)
    }

    fn del_attr(&self, name: &str) -> Result<(), EditError> {
        let region = self.attr_region();
        for splice in attrs::delete(&region.shadow, region.range, name) {
            self.attr_owner().splice_local(splice.range, &splice.text)?;
        }
        Ok(())
    }
}
