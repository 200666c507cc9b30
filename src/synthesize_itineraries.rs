use indicatif::ProgressIterator;

use crate::{
    coordinates::CoordinateTable,
    error::LookupError,
    find_itinerary_path::PathFinder,
    model::{Itinerary, MarketDemandRow, Path},
    progress,
    segment_graph::SegmentGraph,
};

/// A market paired with the route its passengers take.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedMarket {
    pub path: Path,
    pub passengers: f64,
}

/// Converts passenger counts for a reporting period into counts for the
/// simulated window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DemandScale {
    pub period_days: f64,
    pub simulated_days: f64,
}

impl DemandScale {
    pub fn new(period_days: f64, simulated_days: f64) -> Self {
        DemandScale {
            period_days,
            simulated_days,
        }
    }

    /// Truncates toward zero.
    pub fn amount(&self, passengers: f64) -> u32 {
        if self.period_days <= 0.0 {
            return 0;
        }
        (passengers / self.period_days * self.simulated_days).trunc() as u32
    }
}

pub struct ItinerarySynthesizer<'g, 'c> {
    finder: PathFinder<'g, 'c>,
}

impl<'g, 'c> ItinerarySynthesizer<'g, 'c> {
    pub fn new(graph: &'g SegmentGraph, coordinates: &'c CoordinateTable) -> Self {
        ItinerarySynthesizer {
            finder: PathFinder::new(graph, coordinates),
        }
    }

    pub fn with_max_hops(self, max_hops: usize) -> Self {
        ItinerarySynthesizer {
            finder: self.finder.with_max_hops(max_hops),
        }
    }

    pub fn finder(&self) -> &PathFinder<'g, 'c> {
        &self.finder
    }

    pub fn route_market(
        &mut self,
        market: &MarketDemandRow,
    ) -> Result<Option<RoutedMarket>, LookupError> {
        Ok(self
            .finder
            .search_path(market.origin, market.destination)?
            .map(|path| RoutedMarket {
                path,
                passengers: market.passengers,
            }))
    }

    /// Lazily routes each market in order. Markets without a route are
    /// omitted; lookup failures are yielded in place of the market.
    pub fn generate_itineraries<'s>(
        &'s mut self,
        markets: &'s [MarketDemandRow],
    ) -> Itineraries<'s, 'g, 'c> {
        Itineraries {
            synthesizer: self,
            markets: markets.iter(),
        }
    }

    /// Routes every market and scales its demand. With `skip_unknown_airports`
    /// a market touching an airport without coordinates is dropped with a
    /// warning instead of failing the whole batch.
    pub fn synthesize(
        &mut self,
        markets: &[MarketDemandRow],
        scale: DemandScale,
        skip_unknown_airports: bool,
    ) -> Result<Vec<Itinerary>, LookupError> {
        let mut itineraries = vec![];
        let mut unrouted = 0;
        for market in markets
            .iter()
            .progress_with_style(progress::bar_style())
            .with_message("Synthesize itineraries.")
            .with_finish(indicatif::ProgressFinish::AndLeave)
        {
            match self.route_market(market) {
                Ok(Some(routed)) => itineraries.push(Itinerary {
                    amount: scale.amount(routed.passengers),
                    path: routed.path,
                }),
                Ok(None) => unrouted += 1,
                Err(error) if skip_unknown_airports => {
                    log::warn!(
                        "Skipping market {}-{}: {}",
                        market.origin,
                        market.destination,
                        error
                    );
                    unrouted += 1;
                }
                Err(error) => return Err(error),
            }
        }
        log::info!(
            "Synthesized {} itineraries, {} markets without a route",
            itineraries.len(),
            unrouted
        );
        Ok(itineraries)
    }
}

pub struct Itineraries<'s, 'g, 'c> {
    synthesizer: &'s mut ItinerarySynthesizer<'g, 'c>,
    markets: std::slice::Iter<'s, MarketDemandRow>,
}

impl Iterator for Itineraries<'_, '_, '_> {
    type Item = Result<RoutedMarket, LookupError>;

    fn next(&mut self) -> Option<Self::Item> {
        for market in self.markets.by_ref() {
            match self.synthesizer.route_market(market) {
                Ok(Some(routed)) => return Some(Ok(routed)),
                Ok(None) => continue,
                Err(error) => return Some(Err(error)),
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AirportCode, SegmentEdge};

    fn coordinates() -> CoordinateTable {
        CoordinateTable::from_coordinates([
            ("SFO", 37.619, -122.375),
            ("DEN", 39.856, -104.674),
            ("MDW", 41.786, -87.752),
            ("BWI", 39.175, -76.668),
            ("HOU", 29.646, -95.279),
        ])
    }

    fn market(origin: &str, destination: &str, passengers: f64) -> MarketDemandRow {
        MarketDemandRow {
            origin: origin.into(),
            destination: destination.into(),
            passengers,
        }
    }

    fn graph() -> SegmentGraph {
        SegmentGraph::from_edges(
            [("SFO", "DEN"), ("DEN", "MDW"), ("MDW", "DEN")]
                .into_iter()
                .map(|(origin, destination)| SegmentEdge {
                    origin: origin.into(),
                    destination: destination.into(),
                }),
        )
    }

    #[test]
    fn scale_truncates() {
        let scale = DemandScale::new(30.0, 1.0);
        assert_eq!(scale.amount(300.0), 10);
        assert_eq!(scale.amount(59.0), 1);
        assert_eq!(scale.amount(29.0), 0);
        assert_eq!(DemandScale::new(30.0, 7.0).amount(100.0), 23);
        assert_eq!(DemandScale::new(0.0, 7.0).amount(100.0), 0);
    }

    #[test]
    fn connecting_market_is_routed_and_scaled() {
        let coordinates = coordinates();
        let graph = graph();
        let mut synthesizer = ItinerarySynthesizer::new(&graph, &coordinates);
        let itineraries = synthesizer
            .synthesize(&[market("SFO", "MDW", 300.0)], DemandScale::new(30.0, 1.0), false)
            .unwrap();
        assert_eq!(itineraries.len(), 1);
        assert_eq!(itineraries[0].path.render(), "SFO-DEN-MDW");
        assert_eq!(itineraries[0].amount, 10);
    }

    #[test]
    fn unreachable_market_is_omitted() {
        let coordinates = coordinates();
        let graph = graph();
        let mut synthesizer = ItinerarySynthesizer::new(&graph, &coordinates);
        let markets = [
            market("SFO", "BWI", 80.0),
            market("DEN", "MDW", 60.0),
            market("HOU", "SFO", 10.0),
        ];
        let routed: Vec<_> = synthesizer
            .generate_itineraries(&markets)
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(routed.len(), 1);
        assert_eq!(routed[0].path.render(), "DEN-MDW");
        assert_eq!(routed[0].passengers, 60.0);
    }

    #[test]
    fn generation_is_restartable() {
        let coordinates = coordinates();
        let graph = graph();
        let mut synthesizer = ItinerarySynthesizer::new(&graph, &coordinates);
        let markets = [market("SFO", "MDW", 300.0), market("MDW", "DEN", 20.0)];
        let first: Vec<_> = synthesizer.generate_itineraries(&markets).collect();
        let second: Vec<_> = synthesizer.generate_itineraries(&markets).collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn unknown_airport_fails_or_is_skipped() {
        let coordinates = coordinates();
        let graph = SegmentGraph::from_edges([
            SegmentEdge {
                origin: "SFO".into(),
                destination: "XXX".into(),
            },
            SegmentEdge {
                origin: "DEN".into(),
                destination: "MDW".into(),
            },
        ]);
        let markets = [market("SFO", "MDW", 30.0), market("DEN", "MDW", 30.0)];
        let scale = DemandScale::new(30.0, 1.0);

        let mut strict = ItinerarySynthesizer::new(&graph, &coordinates);
        assert_eq!(
            strict.synthesize(&markets, scale, false),
            Err(LookupError::UnknownAirport(AirportCode::new("XXX")))
        );

        let mut lenient = ItinerarySynthesizer::new(&graph, &coordinates);
        let itineraries = lenient.synthesize(&markets, scale, true).unwrap();
        assert_eq!(itineraries.len(), 1);
        assert_eq!(itineraries[0].path.render(), "DEN-MDW");
    }
}
