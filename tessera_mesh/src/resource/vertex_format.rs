//! Vertex format descriptor.
//!
//! A vertex format is an ordered list of typed attributes terminated by
//! `Attribute::End`, at most `MAX_ATTRIBUTES` entries including the
//! terminator. Attributes are tightly packed in declaration order.

use bitflags::bitflags;
use crate::error::Result;
use crate::engine_bail;

/// Maximum number of entries in a format, terminator included
pub const MAX_ATTRIBUTES: usize = 8;

// ============================================================================
// ATTRIBUTE
// ============================================================================

/// Semantic tag of one vertex attribute
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Attribute {
    /// Terminator, every format ends with one
    End = 0,
    /// 3 x f32 position
    Position3f,
    /// 3 x f32 normal
    Normal3f,
    /// 4 x f32 tangent, w = handedness
    Tangent4f,
    /// 2 x f32 texture coordinate
    TexCoord2f,
    /// 4 x u8 RGBA color
    Color4ub,
    /// 4 x u8 bone indices
    BoneIndices4ub,
    /// 4 x u8 bone weights
    BoneWeights4ub,
}

impl Attribute {
    /// Byte width of this attribute (0 for `End`)
    pub const fn size_bytes(self) -> usize {
        match self {
            Attribute::End => 0,
            Attribute::Position3f => 12,
            Attribute::Normal3f => 12,
            Attribute::Tangent4f => 16,
            Attribute::TexCoord2f => 8,
            Attribute::Color4ub => 4,
            Attribute::BoneIndices4ub => 4,
            Attribute::BoneWeights4ub => 4,
        }
    }

    /// Mask bit for this attribute (empty for `End`)
    pub fn mask(self) -> AttributeMask {
        match self {
            Attribute::End => AttributeMask::empty(),
            Attribute::Position3f => AttributeMask::POSITION,
            Attribute::Normal3f => AttributeMask::NORMAL,
            Attribute::Tangent4f => AttributeMask::TANGENT,
            Attribute::TexCoord2f => AttributeMask::TEX_COORD,
            Attribute::Color4ub => AttributeMask::COLOR,
            Attribute::BoneIndices4ub => AttributeMask::BONE_INDICES,
            Attribute::BoneWeights4ub => AttributeMask::BONE_WEIGHTS,
        }
    }
}

bitflags! {
    /// Set of attributes present in a format
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AttributeMask: u8 {
        const POSITION     = 1 << 0;
        const NORMAL       = 1 << 1;
        const TANGENT      = 1 << 2;
        const TEX_COORD    = 1 << 3;
        const COLOR        = 1 << 4;
        const BONE_INDICES = 1 << 5;
        const BONE_WEIGHTS = 1 << 6;
    }
}

/// Byte size of the attributes in `attributes` before the first `end`.
///
/// Stops at `Attribute::End` as well, so with `end = Attribute::End` this is
/// the size of one vertex, and with any other `end` it is the byte offset of
/// that attribute.
pub fn vertex_size(attributes: &[Attribute], end: Attribute) -> usize {
    attributes
        .iter()
        .take_while(|&&attribute| attribute != Attribute::End && attribute != end)
        .map(|attribute| attribute.size_bytes())
        .sum()
}

// ============================================================================
// VERTEX FORMAT
// ============================================================================

/// Validated, terminated vertex format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexFormat {
    /// Attributes followed by `End` padding
    attributes: [Attribute; MAX_ATTRIBUTES],
}

impl VertexFormat {
    /// Build a format from an `End`-terminated attribute list
    ///
    /// # Errors
    ///
    /// `InvalidVertexFormat` if no `End` appears in the first
    /// `MAX_ATTRIBUTES` entries.
    pub fn new(format: &[Attribute]) -> Result<Self> {
        let Some(end) = format
            .iter()
            .take(MAX_ATTRIBUTES)
            .position(|&attribute| attribute == Attribute::End)
        else {
            if format.len() >= MAX_ATTRIBUTES {
                engine_bail!(InvalidVertexFormat, "tessera::VertexFormat",
                    "Format has no End within the first {} entries", MAX_ATTRIBUTES);
            }
            engine_bail!(InvalidVertexFormat, "tessera::VertexFormat",
                "Format of {} attributes is not terminated by End", format.len());
        };

        let mut attributes = [Attribute::End; MAX_ATTRIBUTES];
        attributes[..end].copy_from_slice(&format[..end]);
        Ok(Self { attributes })
    }

    /// Attributes in declaration order, terminator excluded
    pub fn attributes(&self) -> &[Attribute] {
        let len = self
            .attributes
            .iter()
            .position(|&attribute| attribute == Attribute::End)
            .unwrap_or(MAX_ATTRIBUTES);
        &self.attributes[..len]
    }

    /// Number of attributes, terminator excluded
    pub fn len(&self) -> usize {
        self.attributes().len()
    }

    /// True for a format holding only the terminator
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Packed byte size of one vertex
    pub fn vertex_size(&self) -> usize {
        vertex_size(&self.attributes, Attribute::End)
    }

    /// Whether `attribute` is part of this format
    pub fn contains(&self, attribute: Attribute) -> bool {
        attribute != Attribute::End && self.attributes().contains(&attribute)
    }

    /// Byte offset of `attribute` within a vertex, if present
    pub fn offset_of(&self, attribute: Attribute) -> Option<usize> {
        self.contains(attribute)
            .then(|| vertex_size(&self.attributes, attribute))
    }

    /// Set of attributes present in this format
    pub fn mask(&self) -> AttributeMask {
        self.attributes()
            .iter()
            .fold(AttributeMask::empty(), |mask, attribute| mask | attribute.mask())
    }
}

#[cfg(test)]
#[path = "vertex_format_tests.rs"]
mod tests;
