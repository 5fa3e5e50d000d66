// SPDX-License-Identifier: MIT
// Copyright (c) 2026 StarTuz

use crate::bias;
use crate::classifier::{RouteClassifier, RoutesByDeparture};
use crate::model::{FlightLeg, HaulType, Route, ScheduleConfiguration};
use crate::state::GeneratorState;
use crate::timing;
use log::debug;
use rand::Rng;

/// What kind of leg the caller needs next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegRequest {
    pub haul_type: HaulType,
    pub return_leg: bool,
    pub first_leg_of_day: bool,
}

impl LegRequest {
    pub fn outbound(haul_type: HaulType, first_leg_of_day: bool) -> Self {
        Self {
            haul_type,
            return_leg: false,
            first_leg_of_day,
        }
    }

    pub fn home(haul_type: HaulType) -> Self {
        Self {
            haul_type,
            return_leg: true,
            first_leg_of_day: false,
        }
    }
}

/// Weighted random index.
///
/// Zero, negative and non-finite weights never win a draw. When no weight is positive
/// the pick is uniform. A draw `u` in `[0, 1)` maps to `u * total`, and the first index
/// whose running sum exceeds it wins, so a fixed `u` always selects the same index.
pub fn weighted_index<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> Option<usize> {
    if weights.is_empty() {
        return None;
    }
    let usable = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
    let total: f64 = weights.iter().copied().map(usable).sum();
    if total <= 0.0 {
        return Some(rng.gen_range(0..weights.len()));
    }

    let draw = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = None;
    for (i, w) in weights.iter().copied().map(usable).enumerate() {
        if w == 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = Some(i);
        if cumulative > draw {
            return Some(i);
        }
    }
    // Only reachable through float rounding at the top end.
    last_positive
}

pub fn weighted_pick<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    weights: &[f64],
    rng: &mut R,
) -> Option<&'a T> {
    if items.len() != weights.len() {
        return None;
    }
    weighted_index(weights, rng).map(|i| &items[i])
}

pub struct LegSelector;

impl LegSelector {
    /// Narrows the routes departing the current airport, weights them and draws one.
    /// Returns `None` when no leg can be flown.
    pub fn select_leg<R: Rng + ?Sized>(
        state: &mut GeneratorState,
        config: &ScheduleConfiguration,
        routes: &RoutesByDeparture,
        request: LegRequest,
        rng: &mut R,
    ) -> Option<FlightLeg> {
        let departing = routes.get(&state.current_airport)?;
        let repetition_mode = config.repetition_mode();

        let candidates: Vec<&Route> = departing
            .iter()
            .filter(|r| RouteClassifier::haul_of(r) == request.haul_type)
            .filter(|r| RouteClassifier::operated_by(r, config))
            .filter(|r| !request.return_leg || r.arrival_iata == config.base_airport)
            .filter(|r| repetition_mode || !state.visited_routes.contains(&r.id))
            .collect();

        if candidates.is_empty() {
            debug!(
                "No {} candidates from {} (return_leg={})",
                request.haul_type, state.current_airport, request.return_leg
            );
            return None;
        }

        let weights = bias::route_weights(
            &candidates,
            config,
            &state.visited_airports,
            &state.preferred_airports,
        );

        let departure = timing::earliest_departure(state.current_time, config);
        let (candidates, mut weights): (Vec<&Route>, Vec<f64>) = candidates
            .into_iter()
            .zip(weights)
            .filter(|_| timing::instant_within_operating_hours(departure, &config.operating_hours))
            .unzip();

        if candidates.is_empty() {
            debug!(
                "Departure {} from {} falls outside operating hours",
                departure.format("%Y-%m-%d %H:%M"),
                state.current_airport
            );
            return None;
        }

        if config.strict_repetition()
            && !candidates
                .iter()
                .zip(&weights)
                .any(|(r, w)| *w > 0.0 && state.preferred_airports.contains(&r.arrival_iata))
        {
            weights.iter_mut().for_each(|w| *w = 1.0);
        }

        let route = *weighted_pick(&candidates, &weights, rng)?;

        if request.first_leg_of_day && config.repetition_bias() > 0.0 {
            state.preferred_airports.insert(route.arrival_iata.clone());
        }

        let leg = FlightLeg::from_route(route, request.haul_type, departure, config);
        debug!(
            "Selected route {} {} -> {} departing {} ({} candidates)",
            route.id,
            leg.departure_airport,
            leg.arrival_airport,
            leg.departure_time.format("%Y-%m-%d %H:%M"),
            candidates.len()
        );
        Some(leg)
    }
}
