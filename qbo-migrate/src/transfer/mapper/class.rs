//! Class references: name variants from most to least specific

use super::{ReferenceMapper, mapped_target};
use crate::config::IdMappingStore;
use crate::transfer::catalog::Catalog;
use crate::transfer::types::{Class, Entity, Reference, path_segments};

/// Names to try for a class, in order
///
/// Leaf segment, full path, two-segment windows walking back from the end,
/// then the plain name. Duplicates are dropped.
pub fn class_name_candidates(fully_qualified_name: &str, name: &str) -> Vec<String> {
    let segments = path_segments(fully_qualified_name);
    let mut candidates: Vec<String> = Vec::new();
    let mut push = |candidate: String| {
        if !candidate.is_empty() && !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(last) = segments.last() {
        push(last.to_string());
        push(segments.join(":"));
        for end in (0..segments.len()).rev() {
            let start = end.saturating_sub(1);
            push(segments[start..=end].join(":"));
        }
    }
    push(name.trim().to_string());

    candidates
}

impl ReferenceMapper<'_> {
    /// Map a class reference; `None` is a soft failure
    pub fn map_class(&self, reference: &Reference, id_mapping: &IdMappingStore) -> Option<Reference> {
        log::debug!("Attempting to map class: {}", reference);

        let Some(source_class) = self.source_classes.find_by_id(&reference.value) else {
            return self.map_class_by_id(reference, id_mapping, "source class not in cache");
        };

        let candidates = class_name_candidates(
            source_class.fully_qualified_name.as_deref().unwrap_or_default(),
            source_class.name.as_deref().unwrap_or_default(),
        );

        for candidate in &candidates {
            let found = self
                .target_classes
                .resolve(candidate)
                .or_else(|| by_leaf_name(&self.target_classes, candidate));
            match found {
                Some(target_class) => {
                    log::info!(
                        "Mapped class '{}' to target class '{}' using variation '{}'",
                        reference.hint(),
                        target_class.name.as_deref().unwrap_or_default(),
                        candidate
                    );
                    return class_reference(target_class);
                }
                None => log::debug!("No match found for variation: {}", candidate),
            }
        }

        let mapped = self.map_class_by_id(reference, id_mapping, "no name variation matched");
        if mapped.is_none() {
            log::warn!("Tried the following variations: {}", candidates.join(", "));
        }
        mapped
    }

    /// Id-based fallbacks: a recorded mapping, then a shared target identity
    fn map_class_by_id(
        &self,
        reference: &Reference,
        id_mapping: &IdMappingStore,
        reason: &str,
    ) -> Option<Reference> {
        if let Some(found) =
            mapped_target(Class::TYPE, &reference.value, id_mapping, &self.target_classes)
        {
            log::info!("Class {} resolved through id mapping", reference);
            return class_reference(found);
        }

        if id_mapping.is_identity(Class::TYPE, &reference.value) {
            if let Some(found) = self.target_classes.find_by_id(&reference.value) {
                log::info!("Class {} exists in target under the same id", reference);
                return class_reference(found);
            }
        }

        log::warn!(
            "Failed to map class {} ({}) - continuing without class",
            reference,
            reason
        );
        None
    }
}

/// First target class whose own `Name` equals the candidate, at any depth
fn by_leaf_name<'c>(classes: &'c Catalog<Class>, name: &str) -> Option<&'c Class> {
    classes
        .records()
        .iter()
        .find(|c| c.name.as_deref().map(str::trim) == Some(name))
}

fn class_reference(class: &Class) -> Option<Reference> {
    Some(Reference::new(class.id()?, class.name.clone()))
}
