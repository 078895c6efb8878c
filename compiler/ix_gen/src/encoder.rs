//! Annotation payload encoding.
//!
//! The encoder is a black box to the rest of the generator: it receives
//! annotation data and hands back a reference into the static data section.

use rustc_hash::FxHashMap;

use ix_ir::{AnnotationData, AnnotationRef, StaticData};

/// Serializes annotation data into an artifact's static data section.
pub trait AnnotationEncoder {
    /// Encode `data`, returning `None` when there is nothing to store.
    fn encode(&mut self, data: &AnnotationData, section: &mut StaticData) -> Option<AnnotationRef>;
}

/// Stores each distinct payload once; equal payloads share an entry.
#[derive(Debug, Default)]
pub struct PooledAnnotationEncoder {
    pool: FxHashMap<AnnotationData, AnnotationRef>,
}

impl AnnotationEncoder for PooledAnnotationEncoder {
    fn encode(&mut self, data: &AnnotationData, section: &mut StaticData) -> Option<AnnotationRef> {
        if data.is_empty() {
            return None;
        }
        if let Some(existing) = self.pool.get(data) {
            return Some(*existing);
        }
        let id = section.push_annotation(data.clone());
        self.pool.insert(data.clone(), id);
        Some(id)
    }
}
