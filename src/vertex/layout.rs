// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Vertex buffer layout descriptions.
//!
//! A [`VertexLayout`] describes one vertex record: which fields it holds, where each field
//! lives in the record and how it is stored, and how many bytes separate consecutive records.
//!
//! Each layout also owns the [`BindingCache`] for the programs it is drawn with, so the slot
//! resolution for a (layout, program) pair is computed once and replayed on every later draw.
//!
//! # Example
//!
//! ```
//! use vertex_attrib_binding::vertex::{VertexFormat, VertexLayout, VertexUsage};
//!
//! let mut layout = VertexLayout::new();
//! layout.add_field(VertexUsage::Position, 0, VertexFormat::Vector3);
//! layout.add_field(VertexUsage::Color, 0, VertexFormat::Color);
//! assert_eq!(layout.stride(), 16);
//! assert_eq!(layout.fields()[1].offset(), 12);
//! ```

use std::sync::Arc;

use crate::bindings::cache::BindingCache;
use crate::bindings::resolver::ResolveError;
use crate::bindings::ResolvedBinding;
use crate::device::DeviceCaps;
use crate::program::ShaderProgram;
use crate::vertex::{VertexFormat, VertexUsage};

/// One element of a vertex record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VertexField {
    offset: usize,
    format: VertexFormat,
    usage: VertexUsage,
    usage_index: u8,
}

impl VertexField {
    pub fn new(offset: usize, format: VertexFormat, usage: VertexUsage, usage_index: u8) -> Self {
        Self {
            offset,
            format,
            usage,
            usage_index,
        }
    }

    /// Byte offset of this field within the vertex record.
    pub fn offset(&self) -> usize {
        self.offset
    }
    pub fn format(&self) -> VertexFormat {
        self.format
    }
    pub fn usage(&self) -> VertexUsage {
        self.usage
    }
    /// Disambiguates repeated usages, e.g. `TEXCOORD0` and `TEXCOORD1`.
    pub fn usage_index(&self) -> u8 {
        self.usage_index
    }

    fn end(&self) -> usize {
        self.offset + self.format.byte_size()
    }
}

/// Describes the layout of a vertex buffer.
///
/// Fields are kept in declaration order. The stride is either set explicitly with
/// [`with_stride`](Self::with_stride) or derived as the end of the furthest field.
///
/// Cloning a layout produces a distinct layout with an empty cache.
#[derive(Debug)]
pub struct VertexLayout {
    fields: Vec<VertexField>,
    stride: Option<usize>,
    cache: Arc<BindingCache>,
}

impl VertexLayout {
    /// Creates a new, empty vertex layout.
    pub fn new() -> Self {
        Self {
            fields: Vec::new(),
            stride: None,
            cache: Arc::new(BindingCache::new()),
        }
    }

    /// Creates a layout from an existing list of fields.
    pub fn from_fields(fields: impl IntoIterator<Item = VertexField>) -> Self {
        let mut layout = Self::new();
        layout.fields.extend(fields);
        layout
    }

    /// Overrides the derived stride, for records with trailing padding.
    pub fn with_stride(mut self, stride: usize) -> Self {
        self.stride = Some(stride);
        self.cache.clear();
        self
    }

    /// Appends a field packed directly after the current end of the record.
    ///
    /// Fields are added in the order they appear in memory.
    pub fn add_field(&mut self, usage: VertexUsage, usage_index: u8, format: VertexFormat) {
        let offset = self.packed_end();
        self.add_field_at(offset, usage, usage_index, format);
    }

    /// Appends a field at an explicit byte offset.
    pub fn add_field_at(
        &mut self,
        offset: usize,
        usage: VertexUsage,
        usage_index: u8,
        format: VertexFormat,
    ) {
        self.fields
            .push(VertexField::new(offset, format, usage, usage_index));
        //resolutions computed for the old field list no longer describe this record
        self.cache.clear();
    }

    pub fn fields(&self) -> &[VertexField] {
        &self.fields
    }

    /// Bytes per vertex record.
    pub fn stride(&self) -> usize {
        self.stride.unwrap_or_else(|| self.packed_end())
    }

    fn packed_end(&self) -> usize {
        self.fields.iter().map(VertexField::end).max().unwrap_or(0)
    }

    /// Returns the cached slot resolution for `program`, resolving it on first use.
    ///
    /// A second call with the same program returns the same `Arc` instance.
    pub fn get_or_resolve<P: ShaderProgram + ?Sized>(
        &self,
        program: &P,
        caps: &DeviceCaps,
    ) -> Result<Arc<ResolvedBinding>, ResolveError> {
        self.cache.get_or_resolve(self, program, caps)
    }

    /// The per-program resolution cache owned by this layout.
    pub fn binding_cache(&self) -> &Arc<BindingCache> {
        &self.cache
    }
}

impl Default for VertexLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl Clone for VertexLayout {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
            stride: self.stride,
            cache: Arc::new(BindingCache::new()),
        }
    }
}
