//! Scene graph: an arena of nodes with local transforms, plus the geometry
//! and material tables the nodes reference by id.

use glam::{Mat4, Quat, Vec3};

use crate::material::{Material, MaterialId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeometryId(usize);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Self = Self {
        position: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Indexed triangle mesh data
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Geometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl Geometry {
    /// `width` x `height` plane in the XY plane facing +Z, one segment each way
    pub fn plane(width: f32, height: f32) -> Self {
        let (hw, hh) = (width * 0.5, height * 0.5);
        Self {
            positions: vec![[-hw, hh, 0.0], [hw, hh, 0.0], [-hw, -hh, 0.0], [hw, -hh, 0.0]],
            normals: vec![[0.0, 0.0, 1.0]; 4],
            uvs: vec![[0.0, 1.0], [1.0, 1.0], [0.0, 0.0], [1.0, 0.0]],
            indices: vec![0, 2, 1, 2, 3, 1],
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Mesh {
    pub geometry: GeometryId,
    pub material: MaterialId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Light {
    pub color: Vec3,
    pub intensity: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh(Mesh),
    AmbientLight(Light),
    /// Shines from the node's position towards the origin
    DirectionalLight(Light),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: Option<String>,
    pub kind: NodeKind,
    pub transform: Transform,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: None,
            kind,
            transform: Transform::IDENTITY,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }
}

/// Lights gathered from the graph for one frame
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SceneLights {
    pub ambient: Vec3,
    /// Direction the light travels, normalized
    pub directional_dir: Vec3,
    pub directional: Vec3,
}

#[derive(Debug, Clone)]
pub struct SceneGraph {
    nodes: Vec<Node>,
    geometries: Vec<Geometry>,
    materials: Vec<Material>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new(NodeKind::Group).named("root")],
            geometries: Vec::new(),
            materials: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn add(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn add_geometry(&mut self, geometry: Geometry) -> GeometryId {
        self.geometries.push(geometry);
        GeometryId(self.geometries.len() - 1)
    }

    pub fn add_material(&mut self, material: Material) -> MaterialId {
        self.materials.push(material);
        MaterialId(self.materials.len() - 1)
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn geometry(&self, id: GeometryId) -> &Geometry {
        &self.geometries[id.0]
    }

    pub fn material(&self, id: MaterialId) -> &Material {
        &self.materials[id.0]
    }

    pub fn material_mut(&mut self, id: MaterialId) -> &mut Material {
        &mut self.materials[id.0]
    }

    pub fn materials(&self) -> impl Iterator<Item = (MaterialId, &Material)> {
        self.materials.iter().enumerate().map(|(i, m)| (MaterialId(i), m))
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth-first ids of `start` and everything below it
    pub fn descendants(&self, start: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.nodes[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Visit every node of a subtree mutably
    pub fn traverse_mut(&mut self, start: NodeId, mut visit: impl FnMut(NodeId, &mut Node)) {
        for id in self.descendants(start) {
            visit(id, &mut self.nodes[id.0]);
        }
    }

    /// Point every mesh under `start` at `material`; returns how many changed
    pub fn bind_material(&mut self, start: NodeId, material: MaterialId) -> usize {
        let mut bound = 0;
        self.traverse_mut(start, |_, node| {
            if let NodeKind::Mesh(mesh) = &mut node.kind {
                mesh.material = material;
                bound += 1;
            }
        });
        bound
    }

    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = node.transform.matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Every mesh in the graph with its world matrix
    pub fn visible_meshes(&self) -> Vec<(NodeId, Mat4, Mesh)> {
        let mut out = Vec::new();
        let mut stack = vec![(self.root(), Mat4::IDENTITY)];
        while let Some((id, parent_world)) = stack.pop() {
            let node = &self.nodes[id.0];
            let world = parent_world * node.transform.matrix();
            if let NodeKind::Mesh(mesh) = node.kind {
                out.push((id, world, mesh));
            }
            stack.extend(node.children.iter().map(|&child| (child, world)));
        }
        out
    }

    pub fn lights(&self) -> SceneLights {
        let mut lights = SceneLights {
            directional_dir: Vec3::NEG_Y,
            ..Default::default()
        };
        for (i, node) in self.nodes.iter().enumerate() {
            match &node.kind {
                NodeKind::AmbientLight(light) => lights.ambient += light.color * light.intensity,
                NodeKind::DirectionalLight(light) => {
                    let from = self.world_matrix(NodeId(i)).w_axis.truncate();
                    lights.directional_dir = (-from).try_normalize().unwrap_or(Vec3::NEG_Y);
                    lights.directional += light.color * light.intensity;
                }
                _ => {}
            }
        }
        lights
    }

    pub fn count_where(&self, predicate: impl Fn(&NodeKind) -> bool) -> usize {
        self.nodes.iter().filter(|n| predicate(&n.kind)).count()
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::Material;
    use glam::Vec4;

    fn authored(scene: &mut SceneGraph) -> MaterialId {
        scene.add_material(Material::Authored {
            name: None,
            base_color: Vec4::ONE,
        })
    }

    #[test]
    fn plane_is_two_triangles() {
        let plane = Geometry::plane(1.0, 1.0);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.triangle_count(), 2);
        assert_eq!(plane.positions[0], [-0.5, 0.5, 0.0]);
    }

    #[test]
    fn descendants_are_depth_first_in_child_order() {
        let mut scene = SceneGraph::new();
        let a = scene.add(scene.root(), Node::new(NodeKind::Group).named("a"));
        let a1 = scene.add(a, Node::new(NodeKind::Group).named("a1"));
        let b = scene.add(scene.root(), Node::new(NodeKind::Group).named("b"));

        assert_eq!(scene.descendants(scene.root()), vec![scene.root(), a, a1, b]);
        assert_eq!(scene.descendants(a), vec![a, a1]);
        assert_eq!(scene.node(a1).parent(), Some(a));
    }

    #[test]
    fn bind_material_only_touches_subtree_meshes() {
        let mut scene = SceneGraph::new();
        let geometry = scene.add_geometry(Geometry::plane(1.0, 1.0));
        let old = authored(&mut scene);
        let new = authored(&mut scene);

        let outside = scene.add(scene.root(), Node::new(NodeKind::Mesh(Mesh { geometry, material: old })));
        let group = scene.add(scene.root(), Node::new(NodeKind::Group));
        let inner = scene.add(group, Node::new(NodeKind::Mesh(Mesh { geometry, material: old })));
        let deeper = scene.add(inner, Node::new(NodeKind::Mesh(Mesh { geometry, material: old })));

        assert_eq!(scene.bind_material(group, new), 2);
        assert_eq!(scene.node(inner).mesh().unwrap().material, new);
        assert_eq!(scene.node(deeper).mesh().unwrap().material, new);
        assert_eq!(scene.node(outside).mesh().unwrap().material, old);
    }

    #[test]
    fn world_matrix_composes_parents() {
        let mut scene = SceneGraph::new();
        let parent = scene.add(
            scene.root(),
            Node::new(NodeKind::Group).with_transform(Transform {
                position: Vec3::new(0.0, -8.0, 0.0),
                scale: Vec3::splat(2.0),
                ..Transform::IDENTITY
            }),
        );
        let child = scene.add(
            parent,
            Node::new(NodeKind::Group).with_transform(Transform {
                position: Vec3::new(1.0, 0.0, 0.0),
                ..Transform::IDENTITY
            }),
        );

        let origin = scene.world_matrix(child).transform_point3(Vec3::ZERO);
        assert_eq!(origin, Vec3::new(2.0, -8.0, 0.0));

        let meshes = scene.visible_meshes();
        assert!(meshes.is_empty());
    }

    #[test]
    fn lights_accumulate() {
        let mut scene = SceneGraph::new();
        scene.add(
            scene.root(),
            Node::new(NodeKind::AmbientLight(Light { color: Vec3::ONE, intensity: 0.5 })),
        );
        scene.add(
            scene.root(),
            Node::new(NodeKind::DirectionalLight(Light { color: Vec3::ONE, intensity: 1.0 }))
                .with_transform(Transform {
                    position: Vec3::splat(5.0),
                    ..Transform::IDENTITY
                }),
        );

        let lights = scene.lights();
        assert_eq!(lights.ambient, Vec3::splat(0.5));
        assert_eq!(lights.directional, Vec3::ONE);
        assert!((lights.directional_dir - Vec3::splat(-1.0).normalize()).length() < 1e-6);
    }
}
