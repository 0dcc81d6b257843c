//! Undirected pairing graph over integer team handles.
//!
//! Vertices are indices into the draw's team list; edges are stored once in an
//! arena and referenced by index from both endpoints' adjacency lists.

/// Directed match between two team handles: (home, away).
pub type Arc = (usize, usize);

#[derive(Debug, Clone)]
pub struct PairingGraph {
    edges: Vec<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl PairingGraph {
    pub fn new(vertices: usize) -> Self {
        Self { edges: Vec::new(), adjacency: vec![Vec::new(); vertices] }
    }

    pub fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn edges(&self) -> &[(usize, usize)] {
        &self.edges
    }

    pub fn degree(&self, v: usize) -> usize {
        self.adjacency[v].len()
    }

    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency[v].iter().map(move |&e| self.other_end(e, v))
    }

    pub fn has_edge(&self, a: usize, b: usize) -> bool {
        let (small, other) = if self.degree(a) <= self.degree(b) { (a, b) } else { (b, a) };
        self.neighbors(small).any(|n| n == other)
    }

    pub fn add_edge(&mut self, a: usize, b: usize) -> usize {
        debug_assert!(a != b, "self loop");
        let index = self.edges.len();
        self.edges.push((a, b));
        self.adjacency[a].push(index);
        self.adjacency[b].push(index);
        index
    }

    fn other_end(&self, edge: usize, v: usize) -> usize {
        let (a, b) = self.edges[edge];
        if a == v {
            b
        } else {
            a
        }
    }

    /// Orient every edge so each vertex has in-degree equal to out-degree.
    ///
    /// Requires every vertex to have even degree. Each connected component is
    /// walked as an Euler circuit and consecutive circuit vertices become
    /// (home, away).
    pub fn euler_orientation(&self) -> Vec<Arc> {
        debug_assert!((0..self.vertex_count()).all(|v| self.degree(v) % 2 == 0));

        let mut used = vec![false; self.edges.len()];
        let mut cursor = vec![0usize; self.vertex_count()];
        let mut arcs = Vec::with_capacity(self.edges.len());

        for start in 0..self.vertex_count() {
            if self.adjacency[start].iter().all(|&e| used[e]) {
                continue;
            }

            let mut stack = vec![start];
            let mut circuit = Vec::new();
            while let Some(&v) = stack.last() {
                while cursor[v] < self.adjacency[v].len() && used[self.adjacency[v][cursor[v]]] {
                    cursor[v] += 1;
                }
                if cursor[v] < self.adjacency[v].len() {
                    let e = self.adjacency[v][cursor[v]];
                    used[e] = true;
                    stack.push(self.other_end(e, v));
                } else {
                    circuit.push(v);
                    stack.pop();
                }
            }

            circuit.reverse();
            arcs.extend(circuit.windows(2).map(|w| (w[0], w[1])));
        }

        arcs
    }
}
