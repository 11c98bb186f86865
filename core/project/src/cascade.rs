//! Tag mutations applied to a single asset's metadata.
//!
//! The project service fans these out over every asset of a project; this
//! module holds the per-record rules.

use labelkit_common::AssetMetadata;

/// A change to a tag that must reach every region referencing it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TagChange<'a> {
    /// Remove the tag; regions left without tags are removed.
    Delete(&'a str),
    /// Replace `from` by `to`; regions are never removed.
    Rename { from: &'a str, to: &'a str },
}

impl TagChange<'_> {
    /// Apply the change to one asset's regions.
    ///
    /// Returns whether any region changed. When it did, the asset state is
    /// recomputed from the remaining regions.
    pub fn apply(&self, metadata: &mut AssetMetadata) -> bool {
        let changed = match *self {
            TagChange::Delete(tag) => {
                let mut changed = false;
                metadata.regions.retain_mut(|region| {
                    if !region.remove_tag(tag) {
                        return true;
                    }
                    changed = true;
                    !region.tags.is_empty()
                });
                changed
            }
            TagChange::Rename { from, to } => metadata
                .regions
                .iter_mut()
                .fold(false, |changed, region| region.rename_tag(from, to) || changed),
        };

        if changed {
            metadata.refresh_state();
        }
        changed
    }
}
