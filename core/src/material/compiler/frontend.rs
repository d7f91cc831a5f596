//! Scene-description BSDF tree to shading-IR translation.
//!
//! The frontend consumes an already-parsed [`BsdfElement`] tree (the
//! interchange scene format's BSDF description — parsing the format
//! itself is out of scope) and appends an equivalent node tree to a
//! [`ShadingIr`]. Translation is structural: each element maps onto one
//! or more IR nodes with no hidden state, so identical inputs always
//! produce identical trees.

use nalgebra::Vector3;
use thiserror::Error;

use crate::material::types::{
    AlphaMode, CpuMaterial, MaterialSemantic, MaterialValue, TextureRef,
};

use super::ir::{IrNode, IrValue, NodeHandle, ShadingIr};

/// A color/scalar input of a scene-description element.
#[derive(Debug, Clone, PartialEq)]
pub enum SpectrumValue {
    /// Constant RGB value.
    Constant(Vector3<f32>),
    /// Constant gray value.
    Uniform(f32),
    /// Value sampled from a texture.
    Texture(TextureRef),
}

impl From<&SpectrumValue> for IrValue {
    fn from(value: &SpectrumValue) -> Self {
        match value {
            SpectrumValue::Constant(c) => IrValue::Constant(*c),
            SpectrumValue::Uniform(v) => IrValue::Scalar(*v),
            SpectrumValue::Texture(t) => IrValue::Texture(*t),
        }
    }
}

/// One element of a scene-description BSDF tree.
#[derive(Debug, Clone, PartialEq)]
pub enum BsdfElement {
    /// Diffuse reflection.
    Diffuse {
        /// Reflectance color.
        reflectance: SpectrumValue,
        /// Oren-Nayar roughness; 0 = Lambertian.
        roughness: f32,
    },
    /// Metallic reflection.
    Conductor {
        /// Real part of the index of refraction, per channel.
        eta: Vector3<f32>,
        /// Imaginary part (extinction), per channel.
        extinction: Vector3<f32>,
        /// Microfacet roughness.
        roughness: f32,
    },
    /// Smooth or rough dielectric boundary.
    Dielectric {
        /// Interior index of refraction.
        interior_ior: f32,
        /// Exterior index of refraction.
        exterior_ior: f32,
        /// Microfacet roughness.
        roughness: f32,
        /// Thin-walled approximation.
        thin: bool,
    },
    /// Diffuse base under a dielectric coating.
    Plastic {
        /// Reflectance of the diffuse base.
        diffuse_reflectance: SpectrumValue,
        /// Index of refraction of the coating.
        interior_ior: f32,
        /// Microfacet roughness of the coating.
        roughness: f32,
    },
    /// Area light emission.
    AreaEmitter {
        /// Emitted radiance.
        radiance: SpectrumValue,
    },
    /// Weighted mixture of child elements.
    Mix {
        /// Per-child weights; normalized during compilation.
        weights: Vec<f32>,
        /// Child elements.
        elements: Vec<BsdfElement>,
    },
    /// Shade both sides of the surface. Only valid at the tree root.
    TwoSided {
        /// The wrapped element.
        inner: Box<BsdfElement>,
    },
    /// Opacity mask over a child element.
    Mask {
        /// Opacity; 0 = fully masked out.
        opacity: SpectrumValue,
        /// The masked element.
        inner: Box<BsdfElement>,
    },
}

/// Errors produced while compiling a BSDF tree.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MaterialCompileError {
    /// A mixture's weight and element counts differ.
    #[error("mixture has {weights} weights for {elements} elements")]
    MixtureArityMismatch {
        /// Number of weights supplied.
        weights: usize,
        /// Number of child elements supplied.
        elements: usize,
    },
    /// A mixture has no children or its weights sum to zero.
    #[error("mixture weights are degenerate")]
    DegenerateMixture,
    /// A two-sided element appears below the tree root.
    #[error("two-sided element nested below the tree root")]
    NestedTwoSided,
    /// An index of refraction is zero or negative.
    #[error("non-positive index of refraction {0}")]
    InvalidIor(f32),
}

/// Translates [`BsdfElement`] trees into [`ShadingIr`] nodes.
///
/// # Example
///
/// ```
/// use cinnabar_core::material::compiler::{
///     BsdfElement, MaterialCompilerFrontend, ShadingIr, SpectrumValue,
/// };
///
/// let element = BsdfElement::Diffuse {
///     reflectance: SpectrumValue::Uniform(0.5),
///     roughness: 0.0,
/// };
///
/// let mut ir = ShadingIr::new();
/// let frontend = MaterialCompilerFrontend;
/// let root = frontend.compile_to_ir(&mut ir, &element).unwrap();
/// assert_eq!(ir.subtree_size(root), 1);
/// ```
#[derive(Debug, Default)]
pub struct MaterialCompilerFrontend;

impl MaterialCompilerFrontend {
    /// Compile an element tree, register it as a root, and return the
    /// root handle.
    ///
    /// A top-level [`BsdfElement::TwoSided`] wrapper marks the root
    /// double-sided; anywhere deeper it is an error.
    pub fn compile_to_ir(
        &self,
        ir: &mut ShadingIr,
        element: &BsdfElement,
    ) -> Result<NodeHandle, MaterialCompileError> {
        let (double_sided, inner) = match element {
            BsdfElement::TwoSided { inner } => (true, inner.as_ref()),
            other => (false, other),
        };

        let node = self.compile_node(ir, inner)?;
        ir.add_root(node, double_sided);
        Ok(node)
    }

    fn compile_node(
        &self,
        ir: &mut ShadingIr,
        element: &BsdfElement,
    ) -> Result<NodeHandle, MaterialCompileError> {
        let node = match element {
            BsdfElement::Diffuse {
                reflectance,
                roughness,
            } => IrNode::Diffuse {
                reflectance: reflectance.into(),
                roughness: IrValue::Scalar(*roughness),
            },

            BsdfElement::Conductor {
                eta,
                extinction,
                roughness,
            } => IrNode::Conductor {
                eta: IrValue::Constant(*eta),
                extinction: IrValue::Constant(*extinction),
                roughness: IrValue::Scalar(*roughness),
            },

            BsdfElement::Dielectric {
                interior_ior,
                exterior_ior,
                roughness,
                thin,
            } => {
                check_ior(*interior_ior)?;
                check_ior(*exterior_ior)?;
                IrNode::Dielectric {
                    interior_ior: *interior_ior,
                    exterior_ior: *exterior_ior,
                    roughness: IrValue::Scalar(*roughness),
                    thin: *thin,
                }
            }

            BsdfElement::Plastic {
                diffuse_reflectance,
                interior_ior,
                roughness,
            } => {
                check_ior(*interior_ior)?;
                let base = ir.add_node(IrNode::Diffuse {
                    reflectance: diffuse_reflectance.into(),
                    roughness: IrValue::Scalar(0.0),
                });
                IrNode::Coating {
                    ior: *interior_ior,
                    roughness: IrValue::Scalar(*roughness),
                    base,
                }
            }

            BsdfElement::AreaEmitter { radiance } => IrNode::Emission {
                radiance: radiance.into(),
            },

            BsdfElement::Mix { weights, elements } => {
                return self.compile_mixture(ir, weights, elements);
            }

            BsdfElement::TwoSided { .. } => return Err(MaterialCompileError::NestedTwoSided),

            BsdfElement::Mask { opacity, inner } => {
                let base = self.compile_node(ir, inner)?;
                IrNode::OpacityMask {
                    opacity: opacity.into(),
                    base,
                }
            }
        };

        Ok(ir.add_node(node))
    }

    /// Fold an N-way mixture into nested binary [`IrNode::Blend`] nodes.
    ///
    /// Weights are normalized so the blend weights express each child's
    /// share of the remaining total; the fold is left-associative, so the
    /// tree shape is deterministic for a given input order.
    fn compile_mixture(
        &self,
        ir: &mut ShadingIr,
        weights: &[f32],
        elements: &[BsdfElement],
    ) -> Result<NodeHandle, MaterialCompileError> {
        if weights.len() != elements.len() {
            return Err(MaterialCompileError::MixtureArityMismatch {
                weights: weights.len(),
                elements: elements.len(),
            });
        }

        let total: f32 = weights.iter().sum();
        if elements.is_empty() || total <= 0.0 || weights.iter().any(|w| *w < 0.0) {
            return Err(MaterialCompileError::DegenerateMixture);
        }

        let mut acc = self.compile_node(ir, &elements[0])?;
        let mut acc_weight = weights[0];

        for (element, weight) in elements.iter().zip(weights).skip(1) {
            let rhs = self.compile_node(ir, element)?;
            let combined = acc_weight + weight;
            acc = ir.add_node(IrNode::Blend {
                weight: IrValue::Scalar(weight / combined),
                lhs: acc,
                rhs,
            });
            acc_weight = combined;
        }

        Ok(acc)
    }

    /// Lower a compiled tree onto the standard [`CpuMaterial`] properties.
    ///
    /// Only the representable subset is extracted: diffuse reflectance
    /// becomes base color, conductors become metallic, coatings contribute
    /// an IOR, opacity masks switch the alpha mode, emission becomes the
    /// emissive factor. Blends are lowered through their dominant branch.
    pub fn extract_material(&self, ir: &ShadingIr, root: NodeHandle) -> CpuMaterial {
        let mut material = CpuMaterial::new();
        self.extract_node(ir, root, &mut material);
        material
    }

    fn extract_node(&self, ir: &ShadingIr, handle: NodeHandle, material: &mut CpuMaterial) {
        match ir.node(handle) {
            IrNode::Diffuse {
                reflectance,
                roughness,
            } => {
                match reflectance {
                    IrValue::Constant(c) => material.set(
                        MaterialSemantic::BaseColorFactor,
                        MaterialValue::Vec4([c.x, c.y, c.z, 1.0]),
                    ),
                    IrValue::Scalar(v) => material.set(
                        MaterialSemantic::BaseColorFactor,
                        MaterialValue::Vec4([*v, *v, *v, 1.0]),
                    ),
                    IrValue::Texture(t) => {
                        material.set(MaterialSemantic::BaseColorTexture, MaterialValue::Texture(*t))
                    }
                }
                self.extract_roughness(roughness, material);
            }

            IrNode::Conductor { roughness, .. } => {
                material.set(MaterialSemantic::MetallicFactor, MaterialValue::Float(1.0));
                self.extract_roughness(roughness, material);
            }

            IrNode::Dielectric { interior_ior, .. } => {
                material.set(
                    MaterialSemantic::IndexOfRefraction,
                    MaterialValue::Float(*interior_ior),
                );
                material.alpha_mode = AlphaMode::Blend;
            }

            IrNode::Coating { ior, base, .. } => {
                material.set(
                    MaterialSemantic::IndexOfRefraction,
                    MaterialValue::Float(*ior),
                );
                self.extract_node(ir, *base, material);
            }

            IrNode::Blend { weight, lhs, rhs } => {
                // Texture-driven weights have no dominant branch; fall
                // back to the first child.
                let dominant = match weight {
                    IrValue::Scalar(w) if *w > 0.5 => *rhs,
                    IrValue::Constant(c) if c.mean() > 0.5 => *rhs,
                    _ => *lhs,
                };
                self.extract_node(ir, dominant, material);
            }

            IrNode::Emission { radiance } => match radiance {
                IrValue::Constant(c) => material.set(
                    MaterialSemantic::EmissiveFactor,
                    MaterialValue::Vec3([c.x, c.y, c.z]),
                ),
                IrValue::Scalar(v) => material.set(
                    MaterialSemantic::EmissiveFactor,
                    MaterialValue::Vec3([*v, *v, *v]),
                ),
                IrValue::Texture(_) => {}
            },

            IrNode::OpacityMask { opacity, base } => {
                material.alpha_mode = AlphaMode::Mask;
                match opacity {
                    IrValue::Scalar(v) => {
                        material.set(MaterialSemantic::OpacityFactor, MaterialValue::Float(*v))
                    }
                    IrValue::Constant(c) => material.set(
                        MaterialSemantic::OpacityFactor,
                        MaterialValue::Float(c.mean()),
                    ),
                    IrValue::Texture(t) => {
                        material.set(MaterialSemantic::OpacityTexture, MaterialValue::Texture(*t))
                    }
                }
                self.extract_node(ir, *base, material);
            }
        }
    }

    fn extract_roughness(&self, roughness: &IrValue, material: &mut CpuMaterial) {
        match roughness {
            IrValue::Scalar(v) if *v > 0.0 => {
                material.set(MaterialSemantic::RoughnessFactor, MaterialValue::Float(*v))
            }
            IrValue::Constant(c) if c.mean() > 0.0 => material.set(
                MaterialSemantic::RoughnessFactor,
                MaterialValue::Float(c.mean()),
            ),
            IrValue::Texture(t) => {
                material.set(MaterialSemantic::RoughnessTexture, MaterialValue::Texture(*t))
            }
            _ => {}
        }
    }
}

fn check_ior(ior: f32) -> Result<(), MaterialCompileError> {
    if ior <= 0.0 {
        return Err(MaterialCompileError::InvalidIor(ior));
    }
    Ok(())
}
