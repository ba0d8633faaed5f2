//! Background tasks driving the update cycle.
//!
//! - [`GatewayPoller`] refreshes every circuit from the device on a fixed
//!   period, then dispatches [`SIGNAL_CLIMATE_UPDATE`].
//! - [`ClimateListener`] waits for that signal and runs one update cycle on
//!   each thermostat, committing the ones that changed.
//! - [`schedule_refresh`] dispatches the signal once after a delay.

use std::sync::Arc;
use std::time::Duration;

use boschhub_app::dispatcher::Dispatcher;
use boschhub_app::ports::IntegrationContext;
use boschhub_domain::error::HubError;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::SIGNAL_CLIMATE_UPDATE;
use crate::thermostat::BoschThermostat;
use crate::upstream::{Gateway, HeatingCircuit};

/// A thermostat shared between the listener task and service calls.
pub(crate) type SharedThermostat<C> = Arc<Mutex<BoschThermostat<C>>>;

/// Run one update cycle and hand the entity to the host if it asked for it.
///
/// Returns whether a commit happened. The lock is released before the
/// commit is awaited. A rejected commit is retried on the next cycle.
pub(crate) async fn commit_if_needed<C, X>(
    ctx: &X,
    thermostat: &SharedThermostat<C>,
) -> Result<bool, HubError>
where
    C: HeatingCircuit,
    X: IntegrationContext,
{
    let entity = {
        let mut thermostat = thermostat.lock().await;
        if !thermostat.update().needs_commit() {
            return Ok(false);
        }
        thermostat.to_entity()?
    };
    if let Err(err) = ctx.upsert_entity(entity).await {
        thermostat.lock().await.commit_failed();
        return Err(err);
    }
    Ok(true)
}

/// Update cycle over every thermostat. One failing commit does not stop the
/// others.
pub(crate) async fn refresh_thermostats<C, X>(ctx: &X, thermostats: &[SharedThermostat<C>])
where
    C: HeatingCircuit,
    X: IntegrationContext,
{
    for thermostat in thermostats {
        if let Err(err) = commit_if_needed(ctx, thermostat).await {
            tracing::warn!(%err, "failed to commit thermostat state");
        }
    }
}

/// Listens for the climate-update signal and refreshes the thermostats.
pub(crate) struct ClimateListener<C, X> {
    context: X,
    receiver: broadcast::Receiver<()>,
    thermostats: Vec<SharedThermostat<C>>,
}

impl<C, X> ClimateListener<C, X>
where
    C: HeatingCircuit + 'static,
    X: IntegrationContext + 'static,
{
    pub fn start(
        context: X,
        receiver: broadcast::Receiver<()>,
        thermostats: Vec<SharedThermostat<C>>,
    ) -> JoinHandle<()> {
        let listener = Self {
            context,
            receiver,
            thermostats,
        };
        tokio::spawn(listener.run())
    }

    async fn run(mut self) {
        loop {
            match self.receiver.recv().await {
                Ok(()) => {}
                // Signals carry no payload, one refresh covers the skipped ones.
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "climate update signals coalesced");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    tracing::debug!("climate update signal closed, listener stopping");
                    return;
                }
            }
            refresh_thermostats(&self.context, &self.thermostats).await;
        }
    }
}

/// Periodically refreshes every circuit from the gateway.
pub(crate) struct GatewayPoller<G> {
    gateway: Arc<G>,
    dispatcher: Dispatcher,
    period: Duration,
}

impl<G: Gateway + 'static> GatewayPoller<G> {
    pub fn start(gateway: Arc<G>, dispatcher: Dispatcher, period: Duration) -> JoinHandle<()> {
        let poller = Self {
            gateway,
            dispatcher,
            period,
        };
        tokio::spawn(poller.run())
    }

    async fn run(self) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // setup already ran the first refresh
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.iterate().await;
        }
    }

    async fn iterate(&self) {
        for circuit in self.gateway.heating_circuits() {
            if let Err(err) = circuit.update().await {
                tracing::warn!(
                    circuit = %circuit.name(),
                    %err,
                    "heating circuit refresh failed, retrying next interval"
                );
            }
        }
        self.dispatcher.send(SIGNAL_CLIMATE_UPDATE);
    }
}

/// Dispatch the climate-update signal once, `delay` from now.
pub(crate) fn schedule_refresh(dispatcher: Dispatcher, delay: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        let delivered = dispatcher.send(SIGNAL_CLIMATE_UPDATE);
        tracing::debug!(delivered, "deferred climate refresh dispatched");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::{FakeCircuit, FakeGateway, RecordingContext};
    use crate::upstream::GatewayInfo;
    use boschhub_domain::entity::EntityState;

    fn shared(circuit: &Arc<FakeCircuit>) -> SharedThermostat<FakeCircuit> {
        Arc::new(Mutex::new(BoschThermostat::new(
            Arc::clone(circuit),
            GatewayInfo::default(),
        )))
    }

    #[tokio::test]
    async fn should_commit_only_when_thermostat_asks_for_it() {
        let ctx = RecordingContext::default();
        let circuit = Arc::new(FakeCircuit::ready("hc1"));
        let thermostat = shared(&circuit);

        assert!(commit_if_needed(&ctx, &thermostat).await.unwrap());
        assert!(!commit_if_needed(&ctx, &thermostat).await.unwrap());
        assert_eq!(ctx.entities().len(), 1);
    }

    #[tokio::test]
    async fn should_not_commit_pending_thermostat() {
        let ctx = RecordingContext::default();
        let thermostat = shared(&Arc::new(FakeCircuit::pending("hc1")));

        refresh_thermostats(&ctx, &[thermostat]).await;

        assert!(ctx.entities().is_empty());
    }

    #[tokio::test]
    async fn should_keep_refreshing_after_a_failed_commit() {
        let ctx = RecordingContext::default();
        ctx.fail_entity_commits(true);
        let first = shared(&Arc::new(FakeCircuit::ready("hc1")));
        let second = shared(&Arc::new(FakeCircuit::ready("hc2")));
        let thermostats = [first, Arc::clone(&second)];

        refresh_thermostats(&ctx, &thermostats).await;
        assert!(second.lock().await.is_ready());
        assert!(ctx.entities().is_empty());

        ctx.fail_entity_commits(false);
        refresh_thermostats(&ctx, &thermostats).await;

        let entities = ctx.entities();
        assert_eq!(entities.len(), 2);
        assert!(entities.iter().all(|e| e.state == EntityState::On));
    }

    #[tokio::test(start_paused = true)]
    async fn should_refresh_when_signal_is_dispatched() {
        let ctx = RecordingContext::default();
        let dispatcher = Dispatcher::new();
        let circuit = Arc::new(FakeCircuit::ready("hc1"));
        let handle = ClimateListener::start(
            ctx.clone(),
            dispatcher.connect(SIGNAL_CLIMATE_UPDATE),
            vec![shared(&circuit)],
        );

        dispatcher.send(SIGNAL_CLIMATE_UPDATE);
        tokio::time::sleep(Duration::from_millis(1)).await;

        assert_eq!(ctx.entities().len(), 1);
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_poll_every_circuit_then_signal() {
        let dispatcher = Dispatcher::new();
        let mut signal = dispatcher.connect(SIGNAL_CLIMATE_UPDATE);
        let gateway = Arc::new(FakeGateway {
            circuits: vec![
                Arc::new(FakeCircuit::ready("hc1")),
                Arc::new(FakeCircuit::ready("hc2")),
            ],
        });
        let handle = GatewayPoller::start(
            Arc::clone(&gateway),
            dispatcher.clone(),
            Duration::from_secs(30),
        );

        tokio::time::sleep(Duration::from_secs(31)).await;

        assert!(signal.try_recv().is_ok());
        for circuit in &gateway.circuits {
            assert_eq!(circuit.state().update_calls, 1);
        }
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_keep_polling_when_a_circuit_fails() {
        let dispatcher = Dispatcher::new();
        let mut signal = dispatcher.connect(SIGNAL_CLIMATE_UPDATE);
        let broken = Arc::new(FakeCircuit::ready("hc1"));
        broken.with(|s| s.fail_calls = true);
        let healthy = Arc::new(FakeCircuit::ready("hc2"));
        let gateway = Arc::new(FakeGateway {
            circuits: vec![broken, Arc::clone(&healthy)],
        });
        let handle = GatewayPoller::start(gateway, dispatcher.clone(), Duration::from_secs(10));

        tokio::time::sleep(Duration::from_secs(25)).await;

        assert_eq!(healthy.state().update_calls, 2);
        assert!(signal.try_recv().is_ok());
        handle.abort();
    }

    #[tokio::test(start_paused = true)]
    async fn should_dispatch_deferred_refresh_after_delay() {
        let dispatcher = Dispatcher::new();
        let mut signal = dispatcher.connect(SIGNAL_CLIMATE_UPDATE);

        schedule_refresh(dispatcher.clone(), Duration::from_secs(2));
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert!(signal.try_recv().is_err());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(signal.try_recv().is_ok());
    }
}
