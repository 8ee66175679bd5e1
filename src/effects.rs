//! Atmospheric effects.
//!
//! Each flicker runs as its own task: every `interval` it rolls against
//! `probability` and, on a hit, sends an add/remove class pair `duration`
//! apart. Tasks stop for good once the token is cancelled.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::config::{EffectsConfig, Flicker};
use crate::render::{Class, Directive, Target};

/// Spawns the scanline and screen flicker tasks.
///
/// Returns no handles when effects are disabled. A flicker with a zero
/// interval is not started.
#[must_use]
pub fn spawn(
    config: &EffectsConfig,
    tx: &mpsc::UnboundedSender<Directive>,
    token: &CancellationToken,
) -> Vec<JoinHandle<()>> {
    if !config.enabled {
        debug!("atmospheric effects disabled");
        return Vec::new();
    }

    [
        (&config.scanline, Target::Scanlines, Class::Dimmed),
        (&config.screen, Target::Screen, Class::Brightened),
    ]
    .into_iter()
    .filter(|(flicker, target, _)| {
        let usable = !flicker.interval.is_zero();
        if !usable {
            debug!(%target, "flicker interval is zero; not started");
        }
        usable
    })
    .map(|(flicker, target, class)| {
        tokio::spawn(flicker_loop(
            flicker.clone(),
            config.start_delay,
            target,
            class,
            tx.clone(),
            token.clone(),
        ))
    })
    .collect()
}

async fn flicker_loop(
    flicker: Flicker,
    start_delay: Duration,
    target: Target,
    class: Class,
    tx: mpsc::UnboundedSender<Directive>,
    token: CancellationToken,
) {
    let mut rng = StdRng::from_os_rng();
    let probability = if flicker.probability.is_nan() {
        0.0
    } else {
        flicker.probability.clamp(0.0, 1.0)
    };
    // A delay or interval past the clock's range means the flicker never fires
    let Some(start) = tokio::time::Instant::now()
        .checked_add(start_delay)
        .filter(|start| start.checked_add(flicker.interval).is_some())
    else {
        debug!(%target, "flicker schedule out of range; not started");
        return;
    };
    let mut ticks = tokio::time::interval_at(start, flicker.interval);

    loop {
        tokio::select! {
            biased;
            () = token.cancelled() => break,
            _ = ticks.tick() => {}
        }

        if !rng.random_bool(probability) {
            continue;
        }
        if tx.send(Directive::AddClass(target, class)).is_err() {
            break;
        }

        tokio::select! {
            biased;
            () = token.cancelled() => {
                let _ = tx.send(Directive::RemoveClass(target, class));
                break;
            }
            () = tokio::time::sleep(flicker.duration) => {}
        }
        if tx.send(Directive::RemoveClass(target, class)).is_err() {
            break;
        }
    }

    debug!(%target, "flicker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn always(interval_ms: u64) -> Flicker {
        Flicker {
            interval: Duration::from_millis(interval_ms),
            probability: 1.0,
            duration: Duration::from_millis(10),
        }
    }

    fn config() -> EffectsConfig {
        EffectsConfig {
            enabled: true,
            start_delay: Duration::from_millis(100),
            scanline: always(200),
            screen: Flicker {
                probability: 0.0,
                ..always(50)
            },
        }
    }

    #[tokio::test]
    async fn disabled_spawns_nothing() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let cfg = EffectsConfig {
            enabled: false,
            ..config()
        };
        assert!(spawn(&cfg, &tx, &CancellationToken::new()).is_empty());
    }

    #[tokio::test]
    async fn zero_interval_is_skipped() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let mut cfg = config();
        cfg.screen.interval = Duration::ZERO;
        let handles = spawn(&cfg, &tx, &CancellationToken::new());
        assert_eq!(handles.len(), 1);
        for h in handles {
            h.abort();
        }
    }

    #[tokio::test(start_paused = true)]
    async fn flicker_adds_then_removes() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        let handles = spawn(&config(), &tx, &token);
        drop(tx);

        assert_eq!(
            rx.recv().await,
            Some(Directive::AddClass(Target::Scanlines, Class::Dimmed))
        );
        assert_eq!(
            rx.recv().await,
            Some(Directive::RemoveClass(Target::Scanlines, Class::Dimmed))
        );

        token.cancel();
        for h in handles {
            h.await.unwrap();
        }
        // Nothing from the zero-probability screen flicker
        while let Ok(d) = rx.try_recv() {
            assert_eq!(d.target(), Some(Target::Scanlines));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_stops_tasks() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let token = CancellationToken::new();
        token.cancel();
        let handles = spawn(&config(), &tx, &token);
        drop(tx);
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_schedule_ends_quietly() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let cfg = EffectsConfig {
            start_delay: Duration::MAX,
            ..config()
        };
        let handles = spawn(&cfg, &tx, &CancellationToken::new());
        drop(tx);
        assert_eq!(handles.len(), 2);
        for h in handles {
            h.await.unwrap();
        }
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn huge_speed_factor_does_not_panic() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let script = crate::config::Script::default().scaled(1e300);
        for h in spawn(&script.effects, &tx, &CancellationToken::new()) {
            h.await.unwrap();
        }
    }
}
