//! Background coach worker: a Tokio task that runs Gemini requests off the UI loop.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::coach::gemini::GeminiClient;
use crate::db::Database;
use crate::habits::{AiHabitPlan, AiInsight, Habit};
use crate::locale::{self, Language, Text};

// ─── Channel types ────────────────────────────────────────────────────────────

#[derive(Debug)]
pub enum CoachCommand {
    /// Turn a goal into a habit plan.
    Blueprint { goal: String, language: Language },
    /// Ask for a coaching note and store it on the habit.
    Coach { habit: Box<Habit>, language: Language },
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum CoachEvent {
    Thinking,
    PlanReady(AiHabitPlan),
    PlanFailed(String),
    InsightReady { habit_id: String, insight: AiInsight, motivation: String },
    Error(String),
}

// ─── Worker handle ────────────────────────────────────────────────────────────

pub struct CoachWorker {
    pub cmd_tx:   mpsc::Sender<CoachCommand>,
    pub event_rx: Arc<Mutex<mpsc::Receiver<CoachEvent>>>,
}

impl CoachWorker {
    pub fn spawn(db: Database, client: GeminiClient) -> Self {
        let (cmd_tx,   mut cmd_rx)   = mpsc::channel::<CoachCommand>(32);
        let (event_tx,     event_rx) = mpsc::channel::<CoachEvent>(64);

        tokio::spawn(async move {
            while let Some(cmd) = cmd_rx.recv().await {
                match cmd {
                    CoachCommand::Shutdown => break,

                    CoachCommand::Blueprint { goal, language } => {
                        let _ = event_tx.send(CoachEvent::Thinking).await;
                        let ev = match client.generate_blueprint(&goal, language).await {
                            Ok(plan) => {
                                tracing::info!("Blueprint ready: {}", plan.title);
                                CoachEvent::PlanReady(plan)
                            }
                            Err(e) => CoachEvent::PlanFailed(e.to_string()),
                        };
                        let _ = event_tx.send(ev).await;
                    }

                    CoachCommand::Coach { habit, language } => {
                        let _ = event_tx.send(CoachEvent::Thinking).await;
                        run_coaching(&client, &db, &habit, language, &event_tx).await;
                    }
                }
            }

            tracing::info!("Coach worker stopped");
        });

        CoachWorker { cmd_tx, event_rx: Arc::new(Mutex::new(event_rx)) }
    }

    pub async fn blueprint(&self, goal: String, language: Language) {
        let _ = self.cmd_tx.send(CoachCommand::Blueprint { goal, language }).await;
    }

    pub async fn coach(&self, habit: Habit, language: Language) {
        let _ = self.cmd_tx.send(CoachCommand::Coach { habit: Box::new(habit), language }).await;
    }

    pub async fn shutdown(&self) { let _ = self.cmd_tx.send(CoachCommand::Shutdown).await; }
}

async fn run_coaching(
    client:   &GeminiClient,
    db:       &Database,
    habit:    &Habit,
    language: Language,
    tx:       &mpsc::Sender<CoachEvent>,
) {
    let insight    = client.habit_coaching(habit, language).await;
    let motivation = insight.motivation(locale::t(language, Text::Tip));

    if let Err(e) = db.set_motivation(&habit.id, &motivation).await {
        tracing::error!("set_motivation({}): {e}", habit.id);
        let _ = tx.send(CoachEvent::Error(e.to_string())).await;
        return;
    }

    let _ = tx.send(CoachEvent::InsightReady {
        habit_id: habit.id.clone(),
        insight,
        motivation,
    }).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coach::gemini::{failed_request_insight, GeminiConfig};

    #[tokio::test]
    async fn unconfigured_coach_stores_fallback_motivation() {
        let db = Database::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let habit = Habit::from_plan(&AiHabitPlan::manual("Stretch"));
        db.upsert_habit(&habit).await.unwrap();

        let worker = CoachWorker::spawn(db.clone(), GeminiClient::new(GeminiConfig::default()).unwrap());
        worker.coach(habit.clone(), Language::En).await;

        let mut rx = worker.event_rx.lock().await;
        assert!(matches!(rx.recv().await, Some(CoachEvent::Thinking)));
        match rx.recv().await {
            Some(CoachEvent::InsightReady { habit_id, insight, motivation }) => {
                assert_eq!(habit_id, habit.id);
                assert_eq!(insight, failed_request_insight());
                assert_eq!(motivation, "Stay focused. Tip: Try to do the micro-step today.");
            }
            other => panic!("unexpected event: {other:?}"),
        }
        drop(rx);
        worker.shutdown().await;

        let stored = db.habit(&habit.id).await.unwrap().unwrap();
        assert_eq!(stored.ai_motivation.as_deref(), Some("Stay focused. Tip: Try to do the micro-step today."));
    }

    #[tokio::test]
    async fn failed_blueprint_is_reported() {
        let db = Database::in_memory().await.unwrap();
        let worker = CoachWorker::spawn(db, GeminiClient::new(GeminiConfig::default()).unwrap());
        worker.blueprint("read more".into(), Language::En).await;

        let mut rx = worker.event_rx.lock().await;
        assert!(matches!(rx.recv().await, Some(CoachEvent::Thinking)));
        assert!(matches!(rx.recv().await, Some(CoachEvent::PlanFailed(_))));
    }
}
