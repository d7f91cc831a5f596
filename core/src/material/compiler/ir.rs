//! Intermediate shading representation.
//!
//! The material compiler translates scene-description BSDF trees into a
//! [`ShadingIr`]: a flat arena of [`IrNode`]s addressed by [`NodeHandle`].
//! The IR is the hand-off point between format-specific frontends and
//! shader-generation backends — backends walk the arena, frontends only
//! append to it. One arena can hold the trees of many materials; each
//! compiled tree is registered as a root.

use nalgebra::Vector3;

use crate::material::types::TextureRef;

/// Handle to a node inside a [`ShadingIr`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeHandle(u32);

impl NodeHandle {
    /// Get the arena index of this handle.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// A spectral or scalar input to a shading node.
#[derive(Debug, Clone, PartialEq)]
pub enum IrValue {
    /// Constant RGB value.
    Constant(Vector3<f32>),
    /// Constant scalar, splatted across components where needed.
    Scalar(f32),
    /// Value sampled from a texture.
    Texture(TextureRef),
}

impl IrValue {
    /// Constant gray value.
    pub fn gray(value: f32) -> Self {
        Self::Constant(Vector3::repeat(value))
    }

    /// Check whether the value is constant (not texture-driven).
    pub fn is_constant(&self) -> bool {
        !matches!(self, Self::Texture(_))
    }
}

/// One node of the shading tree.
#[derive(Debug, Clone, PartialEq)]
pub enum IrNode {
    /// Diffuse reflection (Lambert, or Oren-Nayar when roughness > 0).
    Diffuse {
        /// Reflectance color.
        reflectance: IrValue,
        /// Surface roughness.
        roughness: IrValue,
    },
    /// Metallic reflection with complex index of refraction.
    Conductor {
        /// Real part of the index of refraction, per channel.
        eta: IrValue,
        /// Imaginary part (extinction), per channel.
        extinction: IrValue,
        /// Microfacet roughness.
        roughness: IrValue,
    },
    /// Smooth or rough dielectric boundary.
    Dielectric {
        /// Index of refraction inside the boundary.
        interior_ior: f32,
        /// Index of refraction outside the boundary.
        exterior_ior: f32,
        /// Microfacet roughness.
        roughness: IrValue,
        /// Thin-walled approximation (no refraction offset).
        thin: bool,
    },
    /// Dielectric coating layered over another node.
    Coating {
        /// Index of refraction of the coating layer.
        ior: f32,
        /// Microfacet roughness of the coating.
        roughness: IrValue,
        /// The coated node.
        base: NodeHandle,
    },
    /// Weighted combination of two nodes.
    Blend {
        /// Contribution of `rhs`; `lhs` contributes `1 - weight`.
        weight: IrValue,
        /// First combined node.
        lhs: NodeHandle,
        /// Second combined node.
        rhs: NodeHandle,
    },
    /// Light emission.
    Emission {
        /// Emitted radiance.
        radiance: IrValue,
    },
    /// Opacity mask over another node.
    OpacityMask {
        /// Opacity; 0 = fully masked out.
        opacity: IrValue,
        /// The masked node.
        base: NodeHandle,
    },
}

impl IrNode {
    /// Get the child handles of this node in a fixed order.
    pub fn children(&self) -> Vec<NodeHandle> {
        match self {
            Self::Diffuse { .. } | Self::Conductor { .. } | Self::Dielectric { .. } => Vec::new(),
            Self::Emission { .. } => Vec::new(),
            Self::Coating { base, .. } | Self::OpacityMask { base, .. } => vec![*base],
            Self::Blend { lhs, rhs, .. } => vec![*lhs, *rhs],
        }
    }
}

/// A compiled material tree registered in the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShadingRoot {
    /// Root node of the tree.
    pub node: NodeHandle,
    /// Whether the material shades both sides of a surface.
    pub double_sided: bool,
}

/// Arena of shading nodes plus the roots of compiled material trees.
#[derive(Debug, Clone, Default)]
pub struct ShadingIr {
    nodes: Vec<IrNode>,
    roots: Vec<ShadingRoot>,
}

impl ShadingIr {
    /// Create an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a node and return its handle.
    pub fn add_node(&mut self, node: IrNode) -> NodeHandle {
        let handle = NodeHandle(self.nodes.len() as u32);
        self.nodes.push(node);
        handle
    }

    /// Get a node by handle.
    pub fn node(&self, handle: NodeHandle) -> &IrNode {
        &self.nodes[handle.index()]
    }

    /// Register a compiled tree root.
    pub fn add_root(&mut self, node: NodeHandle, double_sided: bool) {
        self.roots.push(ShadingRoot { node, double_sided });
    }

    /// Get the registered roots.
    pub fn roots(&self) -> &[ShadingRoot] {
        &self.roots
    }

    /// Get the total number of nodes in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Check whether the arena holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Count the nodes reachable from `root`, including `root` itself.
    pub fn subtree_size(&self, root: NodeHandle) -> usize {
        let mut stack = vec![root];
        let mut count = 0;
        while let Some(handle) = stack.pop() {
            count += 1;
            stack.extend(self.node(handle).children());
        }
        count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arena_append_and_lookup() {
        let mut ir = ShadingIr::new();
        let diffuse = ir.add_node(IrNode::Diffuse {
            reflectance: IrValue::gray(0.5),
            roughness: IrValue::Scalar(0.0),
        });
        let emission = ir.add_node(IrNode::Emission {
            radiance: IrValue::Constant(Vector3::new(1.0, 0.5, 0.25)),
        });

        assert_eq!(ir.node_count(), 2);
        assert!(matches!(ir.node(diffuse), IrNode::Diffuse { .. }));
        assert!(matches!(ir.node(emission), IrNode::Emission { .. }));
    }

    #[test]
    fn test_subtree_size() {
        let mut ir = ShadingIr::new();
        let a = ir.add_node(IrNode::Diffuse {
            reflectance: IrValue::gray(0.2),
            roughness: IrValue::Scalar(0.0),
        });
        let b = ir.add_node(IrNode::Conductor {
            eta: IrValue::gray(0.15),
            extinction: IrValue::gray(3.9),
            roughness: IrValue::Scalar(0.1),
        });
        let blend = ir.add_node(IrNode::Blend {
            weight: IrValue::Scalar(0.5),
            lhs: a,
            rhs: b,
        });
        let masked = ir.add_node(IrNode::OpacityMask {
            opacity: IrValue::Scalar(0.8),
            base: blend,
        });

        assert_eq!(ir.subtree_size(a), 1);
        assert_eq!(ir.subtree_size(blend), 3);
        assert_eq!(ir.subtree_size(masked), 4);
    }

    #[test]
    fn test_roots() {
        let mut ir = ShadingIr::new();
        let node = ir.add_node(IrNode::Diffuse {
            reflectance: IrValue::gray(1.0),
            roughness: IrValue::Scalar(0.0),
        });
        ir.add_root(node, true);

        assert_eq!(ir.roots().len(), 1);
        assert_eq!(ir.roots()[0].node, node);
        assert!(ir.roots()[0].double_sided);
    }
}
