//! Model loading.
//!
//! `GltfLoader` imports glTF/GLB files into a [`Mesh`]. `AsyncModelLoader`
//! runs any [`ModelLoader`] on worker threads and hands the results back to
//! the frame loop through a channel, so models are only ever attached on the
//! main thread.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::color::Color;
use crate::math::{cross, dot, multiply_matrix_vector, normalize};
use crate::error::LoadError;
use crate::scene::{Mesh, Triangle, DEFAULT_BASE_COLOR};
use crate::section::SectionId;

/// Something that turns an asset path into a mesh
pub trait ModelLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Mesh, LoadError>;
}

/// glTF 2.0 importer (both `.gltf` and `.glb`).
///
/// Walks the default scene (or the first one), bakes node transforms into
/// the vertex positions and keeps triangle-list primitives only.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl ModelLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<Mesh, LoadError> {
        let display = path.display().to_string();
        let (document, buffers, _images) = gltf::import(path).map_err(|e| LoadError::Import {
            path: display.clone(),
            reason: e.to_string(),
        })?;

        let mut mesh = Mesh::default();
        let mut missing_normals = false;
        let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
            return Err(LoadError::NoGeometry { path: display });
        };
        for node in scene.nodes() {
            append_node(&node, IDENTITY, &buffers, &mut mesh, &mut missing_normals);
        }

        if mesh.is_empty() {
            return Err(LoadError::NoGeometry { path: display });
        }
        if missing_normals || mesh.normals.len() != mesh.positions.len() {
            mesh.compute_normals();
        }
        log::debug!(
            "loaded {} ({} vertices, {} triangles)",
            display,
            mesh.positions.len(),
            mesh.triangles.len()
        );
        Ok(mesh)
    }
}

/// Column-major 4x4 matrix as used by glTF
type ColumnMatrix = [[f32; 4]; 4];

const IDENTITY: ColumnMatrix = [
    [1.0, 0.0, 0.0, 0.0],
    [0.0, 1.0, 0.0, 0.0],
    [0.0, 0.0, 1.0, 0.0],
    [0.0, 0.0, 0.0, 1.0],
];

fn multiply_columns(a: &ColumnMatrix, b: &ColumnMatrix) -> ColumnMatrix {
    let mut result = [[0.0; 4]; 4];
    for col in 0..4 {
        for row in 0..4 {
            result[col][row] = (0..4).map(|k| a[k][row] * b[col][k]).sum();
        }
    }
    result
}

fn transform_point(m: &ColumnMatrix, p: [f32; 3]) -> [f64; 3] {
    let mut out = [0.0f64; 3];
    for (row, value) in out.iter_mut().enumerate() {
        *value = (m[0][row] * p[0] + m[1][row] * p[1] + m[2][row] * p[2] + m[3][row]) as f64;
    }
    out
}

/// Upper 3x3 of a column matrix, as rows
fn linear_rows(m: &ColumnMatrix) -> [[f64; 3]; 3] {
    std::array::from_fn(|row| std::array::from_fn(|col| m[col][row] as f64))
}

fn determinant(m: &ColumnMatrix) -> f64 {
    let [r0, r1, r2] = linear_rows(m);
    dot(&r0, &cross(&r1, &r2))
}

/// Inverse-transpose of the linear part, up to a positive scale
fn normal_matrix(m: &ColumnMatrix) -> [[f64; 3]; 3] {
    let [r0, r1, r2] = linear_rows(m);
    let sign = determinant(m).signum();
    [cross(&r1, &r2), cross(&r2, &r0), cross(&r0, &r1)].map(|row| row.map(|v| v * sign))
}

fn transform_normal(normal_matrix: &[[f64; 3]; 3], n: [f32; 3]) -> [f64; 3] {
    let n = n.map(f64::from);
    normalize(&multiply_matrix_vector(normal_matrix, &n))
}

fn append_node(
    node: &gltf::Node<'_>,
    parent: ColumnMatrix,
    buffers: &[gltf::buffer::Data],
    mesh: &mut Mesh,
    missing_normals: &mut bool,
) {
    let world = multiply_columns(&parent, &node.transform().matrix());
    let normal_transform = normal_matrix(&world);
    // Mirroring transforms reverse the winding
    let mirrored = determinant(&world) < 0.0;

    if let Some(node_mesh) = node.mesh() {
        for primitive in node_mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!("skipping non-triangle primitive in mesh {:?}", node_mesh.name());
                continue;
            }
            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|d| d.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };

            let base = mesh.positions.len() as u32;
            mesh.positions.extend(positions.map(|p| transform_point(&world, p)));
            let added = mesh.positions.len() as u32 - base;

            match reader.read_normals() {
                Some(normals) => mesh.normals.extend(normals.map(|n| transform_normal(&normal_transform, n))),
                None => *missing_normals = true,
            }

            let material = primitive.material();
            let [r, g, b, _] = material.pbr_metallic_roughness().base_color_factor();
            let color = if material.index().is_some() {
                Color::from_unit([r, g, b])
            } else {
                DEFAULT_BASE_COLOR
            };
            let double_sided = material.double_sided();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..added).collect(),
            };
            mesh.triangles.extend(
                indices
                    .chunks_exact(3)
                    .filter(|tri| tri.iter().all(|&i| i < added))
                    .map(|tri| Triangle {
                        indices: if mirrored {
                            [base + tri[0], base + tri[2], base + tri[1]]
                        } else {
                            [base + tri[0], base + tri[1], base + tri[2]]
                        },
                        color,
                        double_sided,
                    }),
            );
        }
    }

    for child in node.children() {
        append_node(&child, world, buffers, mesh, missing_normals);
    }
}

/// Runs `loader`, turning a panic inside the importer into a load error
fn load_catching_panics(loader: &dyn ModelLoader, path: &Path) -> Result<Mesh, LoadError> {
    panic::catch_unwind(AssertUnwindSafe(|| loader.load(path))).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|s| s.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "loader panicked".to_string());
        Err(LoadError::Import {
            path: path.display().to_string(),
            reason: format!("loader panicked: {}", reason),
        })
    })
}

/// Completed load request
#[derive(Debug)]
pub struct LoadOutcome {
    pub section: SectionId,
    pub path: PathBuf,
    pub result: Result<Mesh, LoadError>,
}

/// Runs model loads off the main thread.
///
/// Results are picked up with [`AsyncModelLoader::drain`] from the frame
/// loop; nothing is delivered until the loop asks for it.
pub struct AsyncModelLoader {
    loader: Arc<dyn ModelLoader>,
    sender: Sender<LoadOutcome>,
    receiver: Receiver<LoadOutcome>,
    in_flight: usize,
}

impl AsyncModelLoader {
    pub fn new(loader: Arc<dyn ModelLoader>) -> Self {
        let (sender, receiver) = crossbeam_channel::unbounded();
        AsyncModelLoader {
            loader,
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Starts loading `path` for `section`
    pub fn request(&mut self, section: SectionId, path: PathBuf) {
        let loader = Arc::clone(&self.loader);
        let sender = self.sender.clone();
        self.in_flight += 1;
        log::debug!("{}: loading {}", section, path.display());

        let spawned = thread::Builder::new()
            .name(format!("load-{}", section))
            .spawn({
                let path = path.clone();
                move || {
                    let result = load_catching_panics(loader.as_ref(), &path);
                    // The receiver only disappears when the showcase shuts down
                    let _ = sender.send(LoadOutcome {
                        section,
                        path,
                        result,
                    });
                }
            });

        if let Err(err) = spawned {
            log::error!("{}: could not start loader thread: {}", section, err);
            let display = path.display().to_string();
            let _ = self.sender.send(LoadOutcome {
                section,
                path,
                result: Err(LoadError::Import {
                    path: display,
                    reason: err.to_string(),
                }),
            });
        }
    }

    /// Returns every result that has arrived since the last call
    pub fn drain(&mut self) -> Vec<LoadOutcome> {
        let outcomes: Vec<LoadOutcome> = self.receiver.try_iter().collect();
        self.in_flight = self.in_flight.saturating_sub(outcomes.len());
        outcomes
    }

    /// Blocks until the next result arrives
    pub fn wait(&mut self) -> Option<LoadOutcome> {
        if self.in_flight == 0 {
            return None;
        }
        let outcome = self.receiver.recv().ok()?;
        self.in_flight -= 1;
        Some(outcome)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }
}
