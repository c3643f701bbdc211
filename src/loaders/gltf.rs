use anyhow::{Context, Result};
use futures::channel::oneshot;
use glam::{Quat, Vec3, Vec4};
use std::future::Future;
use std::path::{Path, PathBuf};

use crate::error::AssetError;
use crate::scene::{Geometry, Transform};

/// One node of an imported model
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: Option<String>,
    pub transform: Transform,
    /// One entry per mesh primitive: (geometry index, authored material index)
    pub primitives: Vec<(usize, Option<usize>)>,
    pub children: Vec<usize>,
}

/// Material as authored in the asset
#[derive(Debug, Clone)]
pub struct AuthoredMaterial {
    pub name: Option<String>,
    pub base_color: Vec4,
}

/// Model hierarchy and geometry, ready to attach to a scene graph
#[derive(Debug, Clone)]
pub struct LoadedModel {
    pub source: PathBuf,
    pub nodes: Vec<ModelNode>,
    pub roots: Vec<usize>,
    pub geometries: Vec<Geometry>,
    pub materials: Vec<AuthoredMaterial>,
}

impl LoadedModel {
    pub fn mesh_count(&self) -> usize {
        self.nodes.iter().map(|n| n.primitives.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.geometries.iter().map(Geometry::triangle_count).sum()
    }
}

/// Loads a glTF/GLB file into a [`LoadedModel`]
pub fn load_model_file(path: impl AsRef<Path>) -> Result<LoadedModel> {
    let path = path.as_ref();
    log::info!("Loading glTF file: {:?}", path);

    let (document, buffers, _images) = gltf::import(path)
        .context(format!("Failed to load glTF file: {:?}", path))?;

    log::info!(
        "glTF loaded: {} scenes, {} nodes, {} meshes, {} materials",
        document.scenes().count(),
        document.nodes().count(),
        document.meshes().count(),
        document.materials().count()
    );

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| AssetError::NoScene {
            path: path.display().to_string(),
        })?;

    let materials = document
        .materials()
        .map(|material| AuthoredMaterial {
            name: material.name().map(str::to_string),
            base_color: Vec4::from_array(material.pbr_metallic_roughness().base_color_factor()),
        })
        .collect();

    let mut model = LoadedModel {
        source: path.to_path_buf(),
        nodes: Vec::new(),
        roots: Vec::new(),
        geometries: Vec::new(),
        materials,
    };

    for node in scene.nodes() {
        let index = process_node(&node, &buffers, &mut model)?;
        model.roots.push(index);
    }

    log::info!(
        "Extracted {} meshes ({} triangles) from {:?}",
        model.mesh_count(),
        model.triangle_count(),
        path
    );
    Ok(model)
}

/// Recursively copies a glTF node and its children; returns the new index
fn process_node(
    node: &gltf::Node,
    buffers: &[gltf::buffer::Data],
    model: &mut LoadedModel,
) -> Result<usize> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let index = model.nodes.len();
    model.nodes.push(ModelNode {
        name: node.name().map(str::to_string),
        transform: Transform {
            position: Vec3::from_array(translation),
            rotation: Quat::from_array(rotation),
            scale: Vec3::from_array(scale),
        },
        primitives: Vec::new(),
        children: Vec::new(),
    });

    if let Some(mesh) = node.mesh() {
        let primitives = process_mesh(&mesh, buffers, model)?;
        model.nodes[index].primitives = primitives;
    }

    for child in node.children() {
        let child_index = process_node(&child, buffers, model)?;
        model.nodes[index].children.push(child_index);
    }

    Ok(index)
}

/// Reads every primitive of a mesh into model geometry
fn process_mesh(
    mesh: &gltf::Mesh,
    buffers: &[gltf::buffer::Data],
    model: &mut LoadedModel,
) -> Result<Vec<(usize, Option<usize>)>> {
    log::debug!("  Processing mesh: {:?}", mesh.name());

    let mut primitives = Vec::new();
    for primitive in mesh.primitives() {
        let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

        let positions: Vec<[f32; 3]> = reader
            .read_positions()
            .ok_or_else(|| AssetError::MissingPositions {
                mesh: mesh.name().map(str::to_string),
            })?
            .collect();

        if positions.is_empty() {
            continue;
        }

        let indices: Vec<u32> = match reader.read_indices() {
            Some(indices) => indices.into_u32().collect(),
            // No indices - treat as triangle list
            None => triangle_list_indices(positions.len())?,
        };

        let normals: Vec<[f32; 3]> = match reader.read_normals() {
            Some(normals) => normals.collect(),
            None => compute_normals(&positions, &indices),
        };

        // Default UVs if none provided
        let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
            Some(uvs) => uvs.into_f32().collect(),
            None => vec![[0.0, 0.0]; positions.len()],
        };

        model.geometries.push(Geometry {
            positions,
            normals,
            uvs,
            indices,
        });
        primitives.push((model.geometries.len() - 1, primitive.material().index()));
    }

    Ok(primitives)
}

/// Area-weighted vertex normals for meshes that ship without them
/// Sequential indices for a non-indexed triangle list, dropping a trailing partial triangle
fn triangle_list_indices(vertex_count: usize) -> Result<Vec<u32>> {
    let n = u32::try_from(vertex_count).context("vertex count exceeds the u32 index range")?;
    Ok((0..n - n % 3).collect())
}

pub fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];
    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [triangle[0], triangle[1], triangle[2]].map(|i| i as usize);
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let (pa, pb, pc) = (
            Vec3::from_array(positions[a]),
            Vec3::from_array(positions[b]),
            Vec3::from_array(positions[c]),
        );
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }
    normals
        .into_iter()
        .map(|n| n.try_normalize().unwrap_or(Vec3::Y).to_array())
        .collect()
}

fn import_error(path: &Path, error: anyhow::Error) -> AssetError {
    match error.downcast::<AssetError>() {
        Ok(asset_error) => asset_error,
        Err(other) => AssetError::Import {
            path: path.display().to_string(),
            message: format!("{:#}", other),
        },
    }
}

/// Load on a worker thread and hand the outcome to `on_complete` there
pub fn spawn_model_load<F>(path: impl Into<PathBuf>, on_complete: F) -> std::io::Result<()>
where
    F: FnOnce(Result<LoadedModel, AssetError>) + Send + 'static,
{
    let path = path.into();
    std::thread::Builder::new()
        .name("model-loader".to_string())
        .spawn(move || {
            let outcome = load_model_file(&path).map_err(|e| import_error(&path, e));
            on_complete(outcome);
        })?;
    Ok(())
}

/// Awaitable model load backed by a worker thread
pub fn load_model(path: impl Into<PathBuf>) -> impl Future<Output = Result<LoadedModel, AssetError>> {
    let (sender, receiver) = oneshot::channel();
    let spawned = spawn_model_load(path, move |outcome| {
        sender.send(outcome).ok();
    });

    async move {
        if let Err(e) = spawned {
            log::error!("Failed to spawn model loader: {}", e);
            return Err(AssetError::Cancelled);
        }
        receiver.await.unwrap_or(Err(AssetError::Cancelled))
    }
}
