// Copyright 2025 Chris Custine
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Background refresh timers.
//!
//! Two periodic timers run on the tokio runtime: departures (with a health
//! probe alongside) and weather. Each timer owns a cancellation token and a
//! slot holds at most one live timer per purpose; starting a new one
//! cancels the old one first. Results come back to the UI thread over an
//! unbounded channel, tagged with the generation that requested them so
//! the controller can drop anything that belongs to a previous selection.

use std::time::Duration;

use log::{debug, info};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiClient, ApiError};
use crate::departures::DepartureSnapshot;
use crate::weather::{WeatherPlan, WeatherReport};

/// Selection epoch. Bumped on every sector or position switch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub fn value(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for Generation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gen {}", self.0)
    }
}

/// Timer periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub departure_refresh: Duration,
    pub weather_refresh: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            departure_refresh: Duration::from_secs(2),
            weather_refresh: Duration::from_secs(180),
        }
    }
}

/// A completed fetch, delivered to the UI thread.
#[derive(Debug)]
pub enum RefreshEvent {
    /// One departure tick together with the health probe issued alongside it.
    Departures {
        generation: Generation,
        result: Result<DepartureSnapshot, ApiError>,
        health: Result<bool, ApiError>,
    },
    /// One standard weather box's airport.
    Weather {
        generation: Generation,
        airport: String,
        result: Result<WeatherReport, ApiError>,
    },
    /// A whole composite view, delivered once every airport has finished.
    Composite {
        generation: Generation,
        index: usize,
        results: Vec<(String, Result<WeatherReport, ApiError>)>,
    },
}

impl RefreshEvent {
    #[must_use]
    pub fn generation(&self) -> Generation {
        match self {
            Self::Departures { generation, .. }
            | Self::Weather { generation, .. }
            | Self::Composite { generation, .. } => *generation,
        }
    }
}

/// Holds the token of at most one running timer.
#[derive(Debug, Default)]
pub struct TimerSlot {
    token: Option<CancellationToken>,
}

impl TimerSlot {
    /// Store a new timer's token, cancelling whatever was there.
    pub fn replace(&mut self, token: CancellationToken) {
        if let Some(old) = self.token.replace(token) {
            old.cancel();
        }
    }

    /// Cancel and forget the current timer. Returns whether one was running.
    pub fn stop(&mut self) -> bool {
        match self.token.take() {
            Some(token) => {
                let was_running = !token.is_cancelled();
                token.cancel();
                was_running
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    fn token(&self) -> Option<&CancellationToken> {
        self.token.as_ref()
    }
}

/// Owner of both refresh timers and the event channel.
pub struct RefreshScheduler {
    runtime: Handle,
    api: ApiClient,
    config: SchedulerConfig,
    event_tx: mpsc::UnboundedSender<RefreshEvent>,
    event_rx: mpsc::UnboundedReceiver<RefreshEvent>,
    departures: TimerSlot,
    weather: TimerSlot,
    root: CancellationToken,
}

impl std::fmt::Debug for RefreshScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshScheduler")
            .field("config", &self.config)
            .field("departures", &self.departures)
            .field("weather", &self.weather)
            .finish_non_exhaustive()
    }
}

impl RefreshScheduler {
    #[must_use]
    pub fn new(runtime: Handle, api: ApiClient, config: SchedulerConfig) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        Self {
            runtime,
            api,
            config,
            event_tx,
            event_rx,
            departures: TimerSlot::default(),
            weather: TimerSlot::default(),
            root: CancellationToken::new(),
        }
    }

    #[must_use]
    pub fn config(&self) -> SchedulerConfig {
        self.config
    }

    /// Start (or restart) departure polling. The first tick fires at once.
    pub fn start_departure_polling(&mut self, generation: Generation) {
        let token = self.root.child_token();
        self.departures.replace(token.clone());

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        let period = self.config.departure_refresh;
        info!("Departure polling started every {period:?} ({generation})");

        self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if !departure_tick(&api, &tx, &token, generation).await {
                    break;
                }
            }
            debug!("Departure polling stopped ({generation})");
        });
    }

    /// One departure fetch outside the regular cadence, e.g. after a relayout.
    pub fn fetch_departures_now(&self, generation: Generation) {
        let token = self
            .departures
            .token()
            .map_or_else(|| self.root.child_token(), CancellationToken::child_token);
        let api = self.api.clone();
        let tx = self.event_tx.clone();
        self.runtime.spawn(async move {
            departure_tick(&api, &tx, &token, generation).await;
        });
    }

    /// Start (or restart) weather polling for a panel. The first tick
    /// fires at once.
    pub fn start_weather_polling(&mut self, generation: Generation, plan: WeatherPlan) {
        let token = self.root.child_token();
        self.weather.replace(token.clone());

        let api = self.api.clone();
        let tx = self.event_tx.clone();
        let period = self.config.weather_refresh;
        info!(
            "Weather polling started every {period:?} for {} airports and {} composite views ({generation})",
            plan.airports.len(),
            plan.composites.len()
        );

        self.runtime.spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = ticker.tick() => {}
                }
                if tx.is_closed() {
                    break;
                }
                weather_tick(&api, &tx, &token, generation, &plan);
            }
            debug!("Weather polling stopped ({generation})");
        });
    }

    pub fn stop_weather(&mut self) {
        if self.weather.stop() {
            info!("Weather polling stopped");
        }
    }

    pub fn stop_departures(&mut self) {
        if self.departures.stop() {
            info!("Departure polling stopped");
        }
    }

    pub fn stop_all(&mut self) {
        self.stop_departures();
        self.stop_weather();
    }

    /// Number of running timers, at most two.
    #[must_use]
    pub fn active_timers(&self) -> usize {
        usize::from(self.departures.is_active()) + usize::from(self.weather.is_active())
    }

    /// Next completed fetch, if any, without blocking.
    pub fn poll_event(&mut self) -> Option<RefreshEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Wait for the next completed fetch.
    pub async fn recv_event(&mut self) -> Option<RefreshEvent> {
        self.event_rx.recv().await
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        self.root.cancel();
    }
}

/// Fetch departures and probe health together. Returns false once the
/// receiver is gone or the timer was cancelled.
async fn departure_tick(
    api: &ApiClient,
    tx: &mpsc::UnboundedSender<RefreshEvent>,
    token: &CancellationToken,
    generation: Generation,
) -> bool {
    let (departures, health) = tokio::select! {
        biased;
        () = token.cancelled() => return false,
        results = async { tokio::join!(api.fetch_departures(), api.check_health()) } => results,
    };

    tx.send(RefreshEvent::Departures {
        generation,
        result: departures,
        health,
    })
    .is_ok()
}

/// Issue every fetch of one weather tick. Standard airports report
/// individually; composite views report as a batch.
fn weather_tick(
    api: &ApiClient,
    tx: &mpsc::UnboundedSender<RefreshEvent>,
    token: &CancellationToken,
    generation: Generation,
    plan: &WeatherPlan,
) {
    for airport in &plan.airports {
        let (api, tx, token, airport) = (api.clone(), tx.clone(), token.clone(), airport.clone());
        tokio::spawn(async move {
            let result = tokio::select! {
                biased;
                () = token.cancelled() => return,
                result = api.fetch_weather(&airport) => result,
            };
            let _ = tx.send(RefreshEvent::Weather {
                generation,
                airport,
                result,
            });
        });
    }

    for (index, airports) in plan.composites.iter().enumerate() {
        let (api, tx, token, airports) = (api.clone(), tx.clone(), token.clone(), airports.clone());
        tokio::spawn(async move {
            let mut batch = JoinSet::new();
            for airport in airports {
                let api = api.clone();
                batch.spawn(async move {
                    let result = api.fetch_weather(&airport).await;
                    (airport, result)
                });
            }

            let mut results = Vec::with_capacity(batch.len());
            loop {
                let joined = tokio::select! {
                    biased;
                    () = token.cancelled() => return,
                    joined = batch.join_next() => joined,
                };
                match joined {
                    Some(Ok(result)) => results.push(result),
                    Some(Err(e)) => debug!("Composite weather fetch task failed: {e}"),
                    None => break,
                }
            }

            let _ = tx.send(RefreshEvent::Composite {
                generation,
                index,
                results,
            });
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scheduler(departure_refresh: Duration) -> RefreshScheduler {
        let api = ApiClient::new(
            "http://127.0.0.1:9/api",
            "http://127.0.0.1:9",
            Duration::from_millis(500),
        )
        .unwrap();
        RefreshScheduler::new(
            Handle::current(),
            api,
            SchedulerConfig {
                departure_refresh,
                weather_refresh: Duration::from_secs(600),
            },
        )
    }

    async fn next_event(scheduler: &mut RefreshScheduler) -> RefreshEvent {
        tokio::time::timeout(Duration::from_secs(5), scheduler.recv_event())
            .await
            .expect("timed out waiting for refresh event")
            .expect("event channel closed")
    }

    #[test]
    fn test_timer_slot_cancels_previous() {
        let mut slot = TimerSlot::default();
        let first = CancellationToken::new();
        slot.replace(first.clone());
        assert!(slot.is_active());

        let second = CancellationToken::new();
        slot.replace(second.clone());
        assert!(first.is_cancelled());
        assert!(!second.is_cancelled());

        assert!(slot.stop());
        assert!(second.is_cancelled());
        assert!(!slot.is_active());
        assert!(!slot.stop());
    }

    #[test]
    fn test_generation_ordering() {
        let first = Generation::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second.value(), 1);
    }

    #[tokio::test]
    async fn test_restart_keeps_one_timer_per_purpose() {
        let mut scheduler = scheduler(Duration::from_secs(60));
        scheduler.start_departure_polling(Generation(1));
        scheduler.start_departure_polling(Generation(2));
        scheduler.start_weather_polling(Generation(2), WeatherPlan::default());
        scheduler.start_weather_polling(Generation(2), WeatherPlan::default());
        assert_eq!(scheduler.active_timers(), 2);

        scheduler.stop_weather();
        assert_eq!(scheduler.active_timers(), 1);
        scheduler.stop_all();
        assert_eq!(scheduler.active_timers(), 0);
    }

    #[tokio::test]
    async fn test_first_departure_tick_is_immediate() {
        // The period is far longer than the wait, so only the first tick can answer.
        let mut scheduler = scheduler(Duration::from_secs(3600));
        scheduler.start_departure_polling(Generation(7));

        match next_event(&mut scheduler).await {
            RefreshEvent::Departures {
                generation,
                result,
                health,
            } => {
                assert_eq!(generation, Generation(7));
                assert!(result.is_err());
                assert!(health.is_err());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_weather_tick_reports_boxes_and_composites() {
        let mut scheduler = scheduler(Duration::from_secs(3600));
        let plan = WeatherPlan {
            airports: vec!["EGLL".to_string()],
            composites: vec![vec!["EGBB".to_string(), "EGNX".to_string()]],
        };
        scheduler.start_weather_polling(Generation(3), plan);

        let mut seen_box = false;
        let mut seen_composite = false;
        while !(seen_box && seen_composite) {
            match next_event(&mut scheduler).await {
                RefreshEvent::Weather { airport, result, .. } => {
                    assert_eq!(airport, "EGLL");
                    assert!(result.is_err());
                    seen_box = true;
                }
                RefreshEvent::Composite { index, results, generation } => {
                    assert_eq!((index, generation), (0, Generation(3)));
                    assert_eq!(results.len(), 2);
                    seen_composite = true;
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_one_shot_fetch_without_timer() {
        let mut scheduler = scheduler(Duration::from_secs(3600));
        scheduler.fetch_departures_now(Generation(4));
        let event = next_event(&mut scheduler).await;
        assert_eq!(event.generation(), Generation(4));
        assert_eq!(scheduler.active_timers(), 0);
    }
}
