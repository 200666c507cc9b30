use std::collections::{BTreeSet, HashMap};

use crate::model::{AirportCode, SegmentEdge};

/// Directed airport graph built from operated segments.
///
/// Duplicate segment rows collapse into one edge. Neighbors are kept in
/// lexicographic order so searches expand them in a stable order.
#[derive(Debug, Clone, Default)]
pub struct SegmentGraph {
    neighbors: HashMap<AirportCode, Vec<AirportCode>>,
    segment_rows: usize,
}

impl SegmentGraph {
    pub fn from_edges(edges: impl IntoIterator<Item = SegmentEdge>) -> Self {
        let mut sets: HashMap<AirportCode, BTreeSet<AirportCode>> = HashMap::new();
        let mut segment_rows = 0;
        for edge in edges {
            segment_rows += 1;
            sets.entry(edge.origin).or_default().insert(edge.destination);
        }
        let neighbors = sets
            .into_iter()
            .map(|(origin, destinations)| (origin, destinations.into_iter().collect()))
            .collect();
        SegmentGraph {
            neighbors,
            segment_rows,
        }
    }

    pub fn neighbors(&self, origin: AirportCode) -> &[AirportCode] {
        self.neighbors
            .get(&origin)
            .map(|destinations| destinations.as_slice())
            .unwrap_or(&[])
    }

    pub fn contains_edge(&self, origin: AirportCode, destination: AirportCode) -> bool {
        self.neighbors(origin).binary_search(&destination).is_ok()
    }

    /// Distinct directed edges.
    pub fn edge_count(&self) -> usize {
        self.neighbors.values().map(|destinations| destinations.len()).sum()
    }

    /// Segment rows the graph was built from, duplicates included.
    pub fn segment_rows(&self) -> usize {
        self.segment_rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edge(origin: &str, destination: &str) -> SegmentEdge {
        SegmentEdge {
            origin: origin.into(),
            destination: destination.into(),
        }
    }

    #[test]
    fn duplicates_collapse() {
        let graph = SegmentGraph::from_edges([
            edge("SFO", "DEN"),
            edge("SFO", "DEN"),
            edge("SFO", "LAX"),
            edge("DEN", "MDW"),
        ]);
        assert_eq!(graph.segment_rows(), 4);
        assert_eq!(graph.edge_count(), 3);
        assert!(graph.contains_edge("SFO".into(), "DEN".into()));
        assert!(!graph.contains_edge("DEN".into(), "SFO".into()));
    }

    #[test]
    fn neighbors_are_sorted() {
        let graph = SegmentGraph::from_edges([
            edge("SFO", "LAX"),
            edge("SFO", "DEN"),
            edge("SFO", "BWI"),
        ]);
        let names: Vec<_> = graph
            .neighbors("SFO".into())
            .iter()
            .map(|code| code.as_str())
            .collect();
        assert_eq!(names, vec!["BWI", "DEN", "LAX"]);
        assert!(graph.neighbors("MDW".into()).is_empty());
    }
}
