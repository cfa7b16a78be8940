// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
use std::fmt;

/// The semantic meaning of a vertex field.
///
/// A program declares its inputs by usage and usage index (`TEXCOORD1`, `BLENDWEIGHT0`, ...),
/// and a layout declares its fields the same way. Matching the two is what the
/// [resolver](crate::bindings::resolver) does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexUsage {
    Position,
    Color,
    TextureCoordinate,
    Normal,
    Binormal,
    Tangent,
    BlendIndices,
    BlendWeight,
    Depth,
    Fog,
    PointSize,
    Sample,
    TessellateFactor,
}

impl fmt::Display for VertexUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VertexUsage::Position => "POSITION",
            VertexUsage::Color => "COLOR",
            VertexUsage::TextureCoordinate => "TEXCOORD",
            VertexUsage::Normal => "NORMAL",
            VertexUsage::Binormal => "BINORMAL",
            VertexUsage::Tangent => "TANGENT",
            VertexUsage::BlendIndices => "BLENDINDICES",
            VertexUsage::BlendWeight => "BLENDWEIGHT",
            VertexUsage::Depth => "DEPTH",
            VertexUsage::Fog => "FOG",
            VertexUsage::PointSize => "PSIZE",
            VertexUsage::Sample => "SAMPLE",
            VertexUsage::TessellateFactor => "TESSFACTOR",
        };
        f.write_str(s)
    }
}
