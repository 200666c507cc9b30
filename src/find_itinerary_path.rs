//! Bounded-hop uniform-cost search over the segment graph.
//!
//! Search states are `(airport, hops)`. The frontier is ordered by cumulative
//! great-circle distance, then hop count, then airport code, which makes the
//! result independent of insertion order. A popped state is discarded when the
//! same airport was already settled with no more hops, since anything reachable
//! from it was reachable from the earlier, cheaper state.

use std::{cmp::Reverse, collections::HashMap};

use priority_queue::PriorityQueue;

use crate::{
    coordinates::CoordinateTable,
    distance_index::DistanceIndex,
    error::LookupError,
    model::{AirportCode, Path},
    segment_graph::SegmentGraph,
};

/// Maximum number of edges in a synthesized itinerary.
pub const DEFAULT_MAX_HOPS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct SearchState {
    airport: AirportCode,
    hops: usize,
}

#[derive(Debug, Clone, Copy)]
struct FrontierKey {
    cost: f64,
    hops: usize,
    airport: AirportCode,
}

impl PartialEq for FrontierKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for FrontierKey {}

impl PartialOrd for FrontierKey {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FrontierKey {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then(self.hops.cmp(&other.hops))
            .then(self.airport.cmp(&other.airport))
    }
}

#[derive(Debug, Clone, Copy)]
struct Label {
    cost: f64,
    predecessor: Option<SearchState>,
}

pub struct PathFinder<'g, 'c> {
    graph: &'g SegmentGraph,
    distances: DistanceIndex<'c>,
    max_hops: usize,
}

impl<'g, 'c> PathFinder<'g, 'c> {
    pub fn new(graph: &'g SegmentGraph, coordinates: &'c CoordinateTable) -> Self {
        PathFinder {
            graph,
            distances: DistanceIndex::new(coordinates),
            max_hops: DEFAULT_MAX_HOPS,
        }
    }

    pub fn with_max_hops(mut self, max_hops: usize) -> Self {
        self.max_hops = max_hops;
        self
    }

    pub fn distances(&self) -> &DistanceIndex<'c> {
        &self.distances
    }

    /// Finds the shortest path by summed segment distance that uses at most
    /// `max_hops` edges. `Ok(None)` means no such path exists, which includes
    /// `origin == destination`.
    pub fn search_path(
        &mut self,
        origin: AirportCode,
        destination: AirportCode,
    ) -> Result<Option<Path>, LookupError> {
        if origin == destination {
            return Ok(None);
        }

        let start = SearchState {
            airport: origin,
            hops: 0,
        };
        let mut labels: HashMap<SearchState, Label> = HashMap::new();
        let mut settled_hops: HashMap<AirportCode, usize> = HashMap::new();
        let mut frontier: PriorityQueue<SearchState, Reverse<FrontierKey>> = PriorityQueue::new();

        labels.insert(
            start,
            Label {
                cost: 0.0,
                predecessor: None,
            },
        );
        frontier.push(
            start,
            Reverse(FrontierKey {
                cost: 0.0,
                hops: 0,
                airport: origin,
            }),
        );

        while let Some((here, Reverse(key))) = frontier.pop() {
            if settled_hops
                .get(&here.airport)
                .is_some_and(|&hops| hops <= here.hops)
            {
                continue;
            }
            settled_hops.insert(here.airport, here.hops);

            if here.airport == destination {
                return Ok(Some(reconstruct(&labels, here)));
            }
            if here.hops >= self.max_hops {
                continue;
            }

            for &neighbor in self.graph.neighbors(here.airport) {
                let next = SearchState {
                    airport: neighbor,
                    hops: here.hops + 1,
                };
                if settled_hops
                    .get(&neighbor)
                    .is_some_and(|&hops| hops <= next.hops)
                {
                    continue;
                }
                let cost = key.cost + self.distances.distance(here.airport, neighbor)?;
                let improves = labels.get(&next).map_or(true, |label| cost < label.cost);
                if improves {
                    labels.insert(
                        next,
                        Label {
                            cost,
                            predecessor: Some(here),
                        },
                    );
                    frontier.push_increase(
                        next,
                        Reverse(FrontierKey {
                            cost,
                            hops: next.hops,
                            airport: neighbor,
                        }),
                    );
                }
            }
        }
        log::trace!("No path from {} to {} within {} hops", origin, destination, self.max_hops);
        Ok(None)
    }
}

fn reconstruct(labels: &HashMap<SearchState, Label>, end: SearchState) -> Path {
    let mut airports = vec![end.airport];
    let mut current = end;
    while let Some(predecessor) = labels.get(&current).and_then(|label| label.predecessor) {
        airports.push(predecessor.airport);
        current = predecessor;
    }
    airports.reverse();
    Path::new(airports)
}
