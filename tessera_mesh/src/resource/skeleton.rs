//! Bone hierarchy of an animated mesh.
//!
//! Bones are stored in index order with a parent index each. A parent must
//! precede its children, so global transforms are resolved in one forward
//! pass. Only bones with vertices weighted to them are sent to the shader;
//! `shader_bone_indices` maps each shader slot to its skeleton bone.

use glam::Affine3A;
use rustc_hash::FxHashMap;
use crate::error::Result;
use crate::{engine_bail, engine_debug};

/// Parent index of a root bone
pub const INVALID_BONE_INDEX: u8 = 0xFF;

/// Largest bone count addressable with `u8` indices (0xFF is reserved)
pub const MAX_BONES: usize = INVALID_BONE_INDEX as usize;

/// Bone hierarchy with local and derived global transforms
///
/// Both transform arrays have one entry per bone. Global transforms are
/// recomputed from scratch whenever local transforms change.
#[derive(Debug, Clone, Default)]
pub struct Skeleton {
    /// Parent-relative transforms
    local_transforms: Vec<Affine3A>,
    /// Root-relative transforms, derived from `local_transforms`
    global_transforms: Vec<Affine3A>,
    /// Parent of each bone, `INVALID_BONE_INDEX` for roots
    parents: Vec<u8>,
    /// Debug names (empty when none were given)
    names: Vec<String>,
    /// Name to bone index
    name_lookup: FxHashMap<String, usize>,
    /// Skeleton bone for each shader slot
    shader_bone_indices: Vec<u8>,
}

impl Skeleton {
    /// Build a skeleton and resolve its global transforms
    ///
    /// # Arguments
    ///
    /// * `local_transforms` - Parent-relative transform of each bone
    /// * `parents` - Parent index of each bone (`INVALID_BONE_INDEX` for roots)
    /// * `names` - Optional debug name of each bone
    /// * `shader_bone_indices` - Bones sampled by the shader, in shader slot order
    ///
    /// # Errors
    ///
    /// `InvalidBoneHierarchy` when the arrays disagree in length, there are
    /// more than `MAX_BONES` bones, a parent does not precede its child, or a
    /// shader bone index is out of range.
    pub fn new(
        local_transforms: &[Affine3A],
        parents: &[u8],
        names: Option<&[&str]>,
        shader_bone_indices: &[u8],
    ) -> Result<Self> {
        let bone_count = parents.len();

        if bone_count > MAX_BONES {
            engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                "{} bones exceed the maximum of {}", bone_count, MAX_BONES);
        }
        if local_transforms.len() != bone_count {
            engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                "{} local transforms for {} bones", local_transforms.len(), bone_count);
        }
        if let Some(names) = names {
            if names.len() != bone_count {
                engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                    "{} bone names for {} bones", names.len(), bone_count);
            }
        }

        for (bone, &parent) in parents.iter().enumerate() {
            if parent != INVALID_BONE_INDEX && parent as usize >= bone {
                engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                    "Bone {} has parent {}, parents must precede their children", bone, parent);
            }
        }

        if let Some(&index) = shader_bone_indices.iter().find(|&&index| index as usize >= bone_count) {
            engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                "Shader bone index {} out of range for {} bones", index, bone_count);
        }

        let names: Vec<String> = names
            .map(|names| names.iter().map(|name| name.to_string()).collect())
            .unwrap_or_default();

        let mut name_lookup = FxHashMap::default();
        for (bone, name) in names.iter().enumerate() {
            name_lookup.entry(name.clone()).or_insert(bone);
        }

        let mut skeleton = Self {
            local_transforms: local_transforms.to_vec(),
            global_transforms: vec![Affine3A::IDENTITY; bone_count],
            parents: parents.to_vec(),
            names,
            name_lookup,
            shader_bone_indices: shader_bone_indices.to_vec(),
        };
        skeleton.compute_global_transforms();

        engine_debug!("tessera::Skeleton", "Created skeleton with {} bones ({} sampled by shader)",
            bone_count, skeleton.shader_bone_indices.len());

        Ok(skeleton)
    }

    /// Replace all local transforms and recompute the global ones
    pub fn set_local_transforms(&mut self, local_transforms: &[Affine3A]) -> Result<()> {
        if local_transforms.len() != self.num_bones() {
            engine_bail!(InvalidBoneHierarchy, "tessera::Skeleton",
                "{} local transforms for {} bones", local_transforms.len(), self.num_bones());
        }
        self.local_transforms.copy_from_slice(local_transforms);
        self.compute_global_transforms();
        Ok(())
    }

    /// Copy `bone_transforms[shader_bone_indices[i]]` into `shader_transforms[i]`
    ///
    /// # Arguments
    ///
    /// * `bone_transforms` - One transform per skeleton bone
    /// * `shader_transforms` - One slot per shader bone
    pub fn gather_shader_transforms(
        &self,
        bone_transforms: &[Affine3A],
        shader_transforms: &mut [Affine3A],
    ) -> Result<()> {
        if bone_transforms.len() != self.num_bones() {
            engine_bail!("tessera::Skeleton",
                "Gather input has {} transforms, skeleton has {} bones",
                bone_transforms.len(), self.num_bones());
        }
        if shader_transforms.len() != self.num_shader_bones() {
            engine_bail!("tessera::Skeleton",
                "Gather output has {} slots, shader samples {} bones",
                shader_transforms.len(), self.num_shader_bones());
        }

        for (slot, &bone) in shader_transforms.iter_mut().zip(&self.shader_bone_indices) {
            *slot = bone_transforms[bone as usize];
        }
        Ok(())
    }

    // ===== ACCESSORS =====

    /// Number of bones
    pub fn num_bones(&self) -> usize {
        self.parents.len()
    }

    /// Number of bones sampled by the shader
    pub fn num_shader_bones(&self) -> usize {
        self.shader_bone_indices.len()
    }

    /// Parent-relative transforms
    pub fn local_transforms(&self) -> &[Affine3A] {
        &self.local_transforms
    }

    /// Root-relative transforms
    pub fn global_transforms(&self) -> &[Affine3A] {
        &self.global_transforms
    }

    /// Raw parent indices (`INVALID_BONE_INDEX` for roots)
    pub fn parents(&self) -> &[u8] {
        &self.parents
    }

    /// Parent of `bone`, `None` for roots and unknown bones
    pub fn parent(&self, bone: usize) -> Option<usize> {
        match self.parents.get(bone) {
            Some(&parent) if parent != INVALID_BONE_INDEX => Some(parent as usize),
            _ => None,
        }
    }

    /// Debug name of `bone`
    pub fn name(&self, bone: usize) -> Option<&str> {
        self.names.get(bone).map(String::as_str)
    }

    /// First bone called `name`
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_lookup.get(name).copied()
    }

    /// Skeleton bone of each shader slot
    pub fn shader_bone_indices(&self) -> &[u8] {
        &self.shader_bone_indices
    }

    // ===== INTERNAL HELPERS =====

    /// Forward pass: global = parent global * local
    fn compute_global_transforms(&mut self) {
        for bone in 0..self.num_bones() {
            let local = self.local_transforms[bone];
            self.global_transforms[bone] = match self.parent(bone) {
                Some(parent) => self.global_transforms[parent] * local,
                None => local,
            };
        }
    }
}

#[cfg(test)]
#[path = "skeleton_tests.rs"]
mod tests;
