// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Element formats for vertex fields.
//!
//! A [`VertexFormat`] names how one field is stored in the vertex record. Graphics APIs
//! want that decomposed into a component count, a component type and a normalization flag,
//! which is what the accessors here provide.

/// Scalar type of each component of a vertex field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ComponentType {
    /// 32-bit IEEE float.
    Float,
    /// 16-bit IEEE float.
    HalfFloat,
    /// 8-bit unsigned integer.
    UnsignedByte,
    /// 16-bit signed integer.
    Short,
}

impl ComponentType {
    /// Size of one component in bytes.
    pub fn byte_size(&self) -> usize {
        match self {
            ComponentType::Float => std::mem::size_of::<f32>(),
            ComponentType::HalfFloat => std::mem::size_of::<half::f16>(),
            ComponentType::UnsignedByte => std::mem::size_of::<u8>(),
            ComponentType::Short => std::mem::size_of::<i16>(),
        }
    }
}

/// Storage format of a vertex field.
///
/// # Example
///
/// ```
/// use vertex_attrib_binding::vertex::{ComponentType, VertexFormat};
///
/// let color = VertexFormat::Color;
/// assert_eq!(color.component_count(), 4);
/// assert_eq!(color.component_type(), ComponentType::UnsignedByte);
/// assert!(color.normalized());
/// assert_eq!(color.byte_size(), 4);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum VertexFormat {
    Single,
    Vector2,
    Vector3,
    Vector4,
    /// Packed RGBA, four normalized unsigned bytes.
    Color,
    Byte4,
    Short2,
    Short4,
    NormalizedShort2,
    NormalizedShort4,
    HalfVector2,
    HalfVector4,
}

impl VertexFormat {
    pub fn component_count(&self) -> u8 {
        match self {
            VertexFormat::Single => 1,
            VertexFormat::Vector2
            | VertexFormat::Short2
            | VertexFormat::NormalizedShort2
            | VertexFormat::HalfVector2 => 2,
            VertexFormat::Vector3 => 3,
            VertexFormat::Vector4
            | VertexFormat::Color
            | VertexFormat::Byte4
            | VertexFormat::Short4
            | VertexFormat::NormalizedShort4
            | VertexFormat::HalfVector4 => 4,
        }
    }

    pub fn component_type(&self) -> ComponentType {
        match self {
            VertexFormat::Single
            | VertexFormat::Vector2
            | VertexFormat::Vector3
            | VertexFormat::Vector4 => ComponentType::Float,
            VertexFormat::Color | VertexFormat::Byte4 => ComponentType::UnsignedByte,
            VertexFormat::Short2
            | VertexFormat::Short4
            | VertexFormat::NormalizedShort2
            | VertexFormat::NormalizedShort4 => ComponentType::Short,
            VertexFormat::HalfVector2 | VertexFormat::HalfVector4 => ComponentType::HalfFloat,
        }
    }

    /// Whether integer components are mapped into `[0,1]` / `[-1,1]` when read.
    pub fn normalized(&self) -> bool {
        matches!(
            self,
            VertexFormat::Color | VertexFormat::NormalizedShort2 | VertexFormat::NormalizedShort4
        )
    }

    /// Bytes this field occupies in the vertex record.
    pub fn byte_size(&self) -> usize {
        self.component_count() as usize * self.component_type().byte_size()
    }
}
