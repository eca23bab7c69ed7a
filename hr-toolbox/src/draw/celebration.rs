// Celebration hook fired when a draw settles.
//
// The effect is optional. The draw never waits on it and never fails
// because of it.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::warn;

use crate::protocol::UiUpdate;
use crate::roster::participant::Participant;

#[async_trait]
pub trait Celebration: Send + Sync {
    async fn celebrate(&self, winner: &Participant) -> anyhow::Result<()>;
}

/// Forwards a celebration to the TUI as a `UiUpdate::Celebrate`.
pub struct UiCelebration {
    ui_tx: mpsc::Sender<UiUpdate>,
}

impl UiCelebration {
    pub fn new(ui_tx: mpsc::Sender<UiUpdate>) -> Self {
        UiCelebration { ui_tx }
    }
}

#[async_trait]
impl Celebration for UiCelebration {
    async fn celebrate(&self, winner: &Participant) -> anyhow::Result<()> {
        self.ui_tx
            .send(UiUpdate::Celebrate {
                winner: winner.name.clone(),
            })
            .await
            .map_err(|_| anyhow::anyhow!("UI channel closed"))
    }
}

/// Fire-and-forget: spawn the celebration if one is installed.
pub fn fire(celebration: Option<&Arc<dyn Celebration>>, winner: &Participant) {
    let Some(celebration) = celebration else {
        return;
    };
    let celebration = Arc::clone(celebration);
    let winner = winner.clone();
    tokio::spawn(async move {
        if let Err(e) = celebration.celebrate(&winner).await {
            warn!("Celebration for '{}' failed: {}", winner.name, e);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    #[async_trait]
    impl Celebration for Failing {
        async fn celebrate(&self, _winner: &Participant) -> anyhow::Result<()> {
            anyhow::bail!("effect unavailable")
        }
    }

    #[tokio::test]
    async fn ui_celebration_sends_winner_name() {
        let (tx, mut rx) = mpsc::channel(4);
        let celebration: Arc<dyn Celebration> = Arc::new(UiCelebration::new(tx));
        fire(Some(&celebration), &Participant::new("Alice"));
        match rx.recv().await.unwrap() {
            UiUpdate::Celebrate { winner } => assert_eq!(winner, "Alice"),
            other => panic!("expected Celebrate, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn failing_celebration_is_swallowed() {
        let celebration: Arc<dyn Celebration> = Arc::new(Failing);
        fire(Some(&celebration), &Participant::new("Bob"));
        tokio::task::yield_now().await;
    }

    #[tokio::test]
    async fn missing_celebration_is_noop() {
        fire(None, &Participant::new("Carol"));
    }
}
