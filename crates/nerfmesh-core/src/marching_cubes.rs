//! Marching cubes over a cubic density lattice.
//!
//! Table-driven variant of the public-domain `MarchingCubeCpp` scheme: each
//! lattice edge is interpolated at most once, cached in a two-slab index
//! buffer along `k`, and shared by every cell that touches it.

#![allow(
    clippy::unreadable_literal,
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss
)]

use glam::Vec3;

use crate::grid::{lattice_index, lattice_len};
use crate::mesh::TriangleMesh;
use crate::volume::DensityVolume;

/// One of the twelve cell edges: the axis it runs along, the offset of its
/// start node from the cell origin, and the two cell corners it joins.
/// Corner `c` sits at offset `(c & 1, (c >> 1) & 1, c >> 2)`.
struct CellEdge {
    axis: usize,
    offset: [u32; 3],
    corners: (usize, usize),
}

#[rustfmt::skip]
const CELL_EDGES: [CellEdge; 12] = [
    CellEdge { axis: 0, offset: [0, 0, 0], corners: (0, 1) },
    CellEdge { axis: 0, offset: [0, 1, 0], corners: (2, 3) },
    CellEdge { axis: 0, offset: [0, 0, 1], corners: (4, 5) },
    CellEdge { axis: 0, offset: [0, 1, 1], corners: (6, 7) },
    CellEdge { axis: 1, offset: [0, 0, 0], corners: (0, 2) },
    CellEdge { axis: 1, offset: [1, 0, 0], corners: (1, 3) },
    CellEdge { axis: 1, offset: [0, 0, 1], corners: (4, 6) },
    CellEdge { axis: 1, offset: [1, 0, 1], corners: (5, 7) },
    CellEdge { axis: 2, offset: [0, 0, 0], corners: (0, 4) },
    CellEdge { axis: 2, offset: [1, 0, 0], corners: (1, 5) },
    CellEdge { axis: 2, offset: [0, 1, 0], corners: (2, 6) },
    CellEdge { axis: 2, offset: [1, 1, 0], corners: (3, 7) },
];

impl CellEdge {
    /// An edge belongs to the cell unless a lower neighbour across one of the
    /// perpendicular axes has already produced it.
    fn owned_by(&self, cell: [u32; 3]) -> bool {
        (0..3)
            .filter(|&p| p != self.axis)
            .all(|p| self.offset[p] == 1 || cell[p] == 0)
    }
}

/// Vertex indices of the edges starting at each node of two consecutive
/// `k` slabs, one slot per axis.
struct SlabCache {
    n: usize,
    slots: Vec<[u32; 3]>,
}

impl SlabCache {
    fn new(n: u32) -> Self {
        let n = n as usize;
        Self {
            n,
            slots: vec![[0; 3]; n * n * 2],
        }
    }

    fn slot(&self, node: [u32; 3]) -> usize {
        self.n * self.n * (node[2] as usize % 2) + node[1] as usize * self.n + node[0] as usize
    }
}

/// Extracts the level set `field == isoval` of an `n^3` lattice.
///
/// `field` is laid out by [`lattice_index`]. Vertices come back in lattice
/// index space: `(i, j, k)` maps to `(x, y, z)` with no swizzle. A lattice
/// with fewer than two nodes per axis has no cells and yields an empty mesh.
///
/// # Panics
/// Panics if `field.len() != n^3`.
#[must_use]
pub fn marching_cubes(field: &[f32], isoval: f32, n: u32) -> TriangleMesh {
    let nodes = lattice_len(n);
    assert!(
        nodes == Some(field.len()),
        "Field size {} does not match lattice {n}^3",
        field.len(),
    );

    let mut mesh = TriangleMesh::default();
    if n < 2 {
        return mesh;
    }

    let mut cache = SlabCache::new(n);
    let mut corners = [0.0_f32; 8];
    let mut edge_vertices = [0_u32; 12];

    for k in 0..n - 1 {
        for j in 0..n - 1 {
            for i in 0..n - 1 {
                for (c, value) in corners.iter_mut().enumerate() {
                    let (di, dj, dk) = ((c & 1) as u32, ((c >> 1) & 1) as u32, (c >> 2) as u32);
                    *value = field[lattice_index(i + di, j + dj, k + dk, n)] - isoval;
                }

                let config = corners
                    .iter()
                    .enumerate()
                    .fold(0_usize, |acc, (c, &v)| acc | (usize::from(v < 0.0) << c));
                if config == 0 || config == 255 {
                    continue;
                }

                let cell = [i, j, k];
                for (e, edge) in CELL_EDGES.iter().enumerate() {
                    let node = [
                        cell[0] + edge.offset[0],
                        cell[1] + edge.offset[1],
                        cell[2] + edge.offset[2],
                    ];
                    if edge.owned_by(cell) {
                        let (a, b) = (corners[edge.corners.0], corners[edge.corners.1]);
                        interpolate_edge(&mut cache, &mut mesh, a, b, edge.axis, node);
                    }
                    edge_vertices[e] = cache.slots[cache.slot(node)][edge.axis];
                }

                let entry = MC_TRIS[config];
                let n_triangles = (entry & 0xF) as usize;
                for t in 0..n_triangles {
                    let edge_at = |slot: usize| {
                        let shift = 4 + 4 * (t * 3 + slot);
                        edge_vertices[((entry >> shift) & 0xF) as usize]
                    };
                    let tri = [edge_at(0), edge_at(1), edge_at(2)];
                    accumulate_normal(&mut mesh, tri);
                    mesh.triangles.push(tri);
                }
            }
        }
    }

    for normal in &mut mesh.normals {
        let len = normal.length();
        if len > 1e-10 {
            *normal /= len;
        }
    }

    log::debug!(
        "marching cubes at {isoval}: {} vertices, {} triangles",
        mesh.num_vertices(),
        mesh.num_triangles()
    );
    mesh
}

/// Extracts the isosurface of a density volume at `threshold`.
///
/// A volume that never crosses the threshold yields an empty mesh.
#[must_use]
pub fn extract_isosurface(volume: &DensityVolume, threshold: f32) -> TriangleMesh {
    marching_cubes(volume.values(), threshold, volume.resolution())
}

/// Adds a vertex where the surface crosses the edge, if the endpoint values
/// straddle zero, and records its index in the slab cache.
fn interpolate_edge(
    cache: &mut SlabCache,
    mesh: &mut TriangleMesh,
    va: f32,
    vb: f32,
    axis: usize,
    node: [u32; 3],
) {
    if (va < 0.0) == (vb < 0.0) {
        return;
    }
    let mut v = Vec3::new(node[0] as f32, node[1] as f32, node[2] as f32);
    v[axis] += va / (va - vb);
    let slot = cache.slot(node);
    cache.slots[slot][axis] = mesh.vertices.len() as u32;
    mesh.vertices.push(v);
    mesh.normals.push(Vec3::ZERO);
}

/// Adds the face normal of `tri` to each of its vertices.
fn accumulate_normal(mesh: &mut TriangleMesh, tri: [u32; 3]) {
    let [a, b, c] = tri.map(|i| mesh.vertices[i as usize]);
    let n = (c - b).cross(a - b);
    for i in tri {
        mesh.normals[i as usize] += n;
    }
}

/// Triangle table, one entry per corner configuration.
///
/// Bits `[3:0]` hold the triangle count (0-5); each following nibble is a
/// cell edge index (0-11), three per triangle.
#[rustfmt::skip]
static MC_TRIS: [u64; 256] = [
    0, 33793, 36945, 159668546,
    18961, 144771090, 5851666, 595283255635,
    20913, 67640146, 193993474, 655980856339,
    88782242, 736732689667, 797430812739, 194554754,
    26657, 104867330, 136709522, 298069416227,
    109224258, 8877909667, 318136408323, 1567994331701604,
    189884450, 350847647843, 559958167731, 3256298596865604,
    447393122899, 651646838401572, 2538311371089956, 737032694307,
    29329, 43484162, 91358498, 374810899075,
    158485010, 178117478419, 88675058979, 433581536604804,
    158486962, 649105605635, 4866906995, 3220959471609924,
    649165714851, 3184943915608436, 570691368417972, 595804498035,
    124295042, 431498018963, 508238522371, 91518530,
    318240155763, 291789778348404, 1830001131721892, 375363605923,
    777781811075, 1136111028516116, 3097834205243396, 508001629971,
    2663607373704004, 680242583802939237, 333380770766129845, 179746658,
    42545, 138437538, 93365810, 713842853011,
    73602098, 69575510115, 23964357683, 868078761575828,
    28681778, 713778574611, 250912709379, 2323825233181284,
    302080811955, 3184439127991172, 1694042660682596, 796909779811,
    176306722, 150327278147, 619854856867, 1005252473234484,
    211025400963, 36712706, 360743481544788, 150627258963,
    117482600995, 1024968212107700, 2535169275963444, 4734473194086550421,
    628107696687956, 9399128243, 5198438490361643573, 194220594,
    104474994, 566996932387, 427920028243, 2014821863433780,
    492093858627, 147361150235284, 2005882975110676, 9671606099636618005,
    777701008947, 3185463219618820, 482784926917540, 2900953068249785909,
    1754182023747364, 4274848857537943333, 13198752741767688709, 2015093490989156,
    591272318771, 2659758091419812, 1531044293118596, 298306479155,
    408509245114388, 210504348563, 9248164405801223541, 91321106,
    2660352816454484, 680170263324308757, 8333659837799955077, 482966828984116,
    4274926723105633605, 3184439197724820, 192104450, 15217,
    45937, 129205250, 129208402, 529245952323,
    169097138, 770695537027, 382310500883, 2838550742137652,
    122763026, 277045793139, 81608128403, 1991870397907988,
    362778151475, 2059003085103236, 2132572377842852, 655681091891,
    58419234, 239280858627, 529092143139, 1568257451898804,
    447235128115, 679678845236084, 2167161349491220, 1554184567314086709,
    165479003923, 1428768988226596, 977710670185060, 10550024711307499077,
    1305410032576132, 11779770265620358997, 333446212255967269, 978168444447012,
    162736434, 35596216627, 138295313843, 891861543990356,
    692616541075, 3151866750863876, 100103641866564, 6572336607016932133,
    215036012883, 726936420696196, 52433666, 82160664963,
    2588613720361524, 5802089162353039525, 214799000387, 144876322,
    668013605731, 110616894681956, 1601657732871812, 430945547955,
    3156382366321172, 7644494644932993285, 3928124806469601813, 3155990846772900,
    339991010498708, 10743689387941597493, 5103845475, 105070898,
    3928064910068824213, 156265010, 1305138421793636, 27185,
    195459938, 567044449971, 382447549283, 2175279159592324,
    443529919251, 195059004769796, 2165424908404116, 1554158691063110021,
    504228368803, 1436350466655236, 27584723588724, 1900945754488837749,
    122971970, 443829749251, 302601798803, 108558722,
    724700725875, 43570095105972, 2295263717447940, 2860446751369014181,
    2165106202149444, 69275726195, 2860543885641537797, 2165106320445780,
    2280890014640004, 11820349930268368933, 8721082628082003989, 127050770,
    503707084675, 122834978, 2538193642857604, 10129,
    801441490467, 2923200302876740, 1443359556281892, 2901063790822564949,
    2728339631923524, 7103874718248233397, 12775311047932294245, 95520290,
    2623783208098404, 1900908618382410757, 137742672547, 2323440239468964,
    362478212387, 727199575803140, 73425410, 34337,
    163101314, 668566030659, 801204361987, 73030562,
    591509145619, 162574594, 100608342969108, 5553,
    724147968595, 1436604830452292, 176259090, 42001,
    143955266, 2385, 18433, 0,
];

#[cfg(test)]
mod tests {
    use super::*;

    fn spike(n: u32, at: [u32; 3], value: f32) -> Vec<f32> {
        let mut field = vec![0.0_f32; (n as usize).pow(3)];
        field[lattice_index(at[0], at[1], at[2], n)] = value;
        field
    }

    #[test]
    fn test_all_above_is_empty() {
        let mesh = marching_cubes(&[1.0; 27], 0.0, 3);
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_vertices(), 0);
    }

    #[test]
    fn test_all_below_is_empty() {
        let mesh = marching_cubes(&[-1.0; 27], 0.0, 3);
        assert!(mesh.is_empty());
        assert_eq!(mesh.num_vertices(), 0);
    }

    #[test]
    fn test_tiny_lattice_is_empty() {
        assert!(marching_cubes(&[5.0], 1.0, 1).is_empty());
        assert!(marching_cubes(&[], 1.0, 0).is_empty());
    }

    #[test]
    fn test_single_corner_gives_one_triangle() {
        let mut field = vec![1.0_f32; 8];
        field[0] = -1.0;
        let mesh = marching_cubes(&field, 0.0, 2);
        assert_eq!(mesh.num_triangles(), 1);
        assert_eq!(mesh.num_vertices(), 3);
        for v in &mesh.vertices {
            assert!((v.length() - 0.5).abs() < 1e-6, "vertex {v:?}");
        }
    }

    #[test]
    fn test_interior_spike_is_closed() {
        let n = 5;
        let mesh = marching_cubes(&spike(n, [2, 2, 2], 8.0), 7.0, n);
        assert_eq!(mesh.num_triangles(), 8);
        assert_eq!(mesh.num_vertices(), 6);

        // Every edge of a closed surface is shared by exactly two triangles.
        let mut edges = std::collections::HashMap::new();
        for t in &mesh.triangles {
            for (a, b) in [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])] {
                *edges.entry((a.min(b), a.max(b))).or_insert(0) += 1;
            }
        }
        assert!(edges.values().all(|&count| count == 2));

        for v in &mesh.vertices {
            assert!((*v - Vec3::splat(2.0)).length() < 1.0, "vertex {v:?}");
        }
    }

    #[test]
    fn test_spike_follows_lattice_axes() {
        let n = 6;
        let mesh = marching_cubes(&spike(n, [1, 2, 4], 2.0), 1.0, n);
        let c = mesh.centroid().unwrap();
        assert!((c - Vec3::new(1.0, 2.0, 4.0)).length() < 1e-4, "centroid {c:?}");
    }

    #[test]
    fn test_sphere_field() {
        let n = 20_u32;
        let center = Vec3::splat(n as f32 / 2.0);
        let radius = n as f32 / 4.0;
        let mut field = vec![0.0_f32; (n * n * n) as usize];
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let p = Vec3::new(i as f32, j as f32, k as f32);
                    field[lattice_index(i, j, k, n)] = (p - center).length() - radius;
                }
            }
        }

        let mesh = marching_cubes(&field, 0.0, n);

        assert!(
            mesh.num_triangles() > 100,
            "Expected >100 triangles, got {}",
            mesh.num_triangles()
        );
        assert_eq!(mesh.vertices.len(), mesh.normals.len());
        for t in &mesh.triangles {
            for &idx in t {
                assert!((idx as usize) < mesh.vertices.len());
            }
        }
        for normal in &mesh.normals {
            assert!((normal.length() - 1.0).abs() < 0.01);
        }
        for v in &mesh.vertices {
            let dist = (*v - center).length();
            assert!((dist - radius).abs() < 1.0, "{v:?} is {dist} from center");
        }
    }

    #[test]
    fn test_extract_isosurface_from_volume() {
        let volume = DensityVolume::from_densities(4, spike(4, [1, 1, 1], 3.0)).unwrap();
        assert_eq!(extract_isosurface(&volume, 2.0).num_triangles(), 8);
        assert!(extract_isosurface(&volume, 5.0).is_empty());
    }

    #[test]
    #[should_panic(expected = "Field size")]
    fn test_wrong_field_size() {
        let _ = marching_cubes(&[0.0; 10], 0.0, 3);
    }
}
