use anyhow::Result;
use chrono::{Duration, Local, NaiveDate};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;

use crate::{
    calendar::{MonthCursor, MonthGrid},
    coach::worker::{CoachEvent, CoachWorker},
    db::Database,
    habits::{self, AiHabitPlan, Habit},
    jalali::{self, JalaliDate},
    locale::{self, Language, Text},
    theme::ThemeConfig,
    ui::{draw, InputMode, UiState, WizardStep},
};

// ─── Panel focus model ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub enum Panel {
    Dashboard,
    Detail,
    Analytics,
    Wizard,
    Help,
}

// ─── App state ────────────────────────────────────────────────────────────────

pub struct App {
    pub db:           Database,
    pub theme:        ThemeConfig,
    pub language:     Language,
    pub coach:        Option<CoachWorker>,
    pub habits:       Vec<Habit>,
    pub habit_cursor: usize,
    pub active_panel: Panel,
    pub today:        NaiveDate,
    /// Jalali month shown in the calendar panel.
    pub view:         MonthCursor,
    /// Selected day within `view`.
    pub selected_day: u32,
    pub ui:           UiState,
    pub status:       String,
    pub running:      bool,
}

impl App {
    pub async fn new(db: Database, theme: ThemeConfig, language: Language) -> Result<Self> {
        let today   = Local::now().date_naive();
        let today_j = jalali::from_naive(today);
        let habits  = db.all_habits().await?;

        Ok(Self {
            db, theme, language,
            coach: None,
            habits,
            habit_cursor: 0,
            active_panel: Panel::Dashboard,
            today,
            view:         MonthCursor { year: today_j.year, month: today_j.month },
            selected_day: today_j.day,
            ui:           UiState::default(),
            status:       String::new(),
            running:      true,
        })
    }

    pub fn attach_coach(&mut self, w: CoachWorker) { self.coach = Some(w); }

    pub fn selected_habit(&self) -> Option<&Habit> { self.habits.get(self.habit_cursor) }

    /// Grid for the month on screen, flagged against the selected habit's logs.
    pub fn month_grid(&self) -> Option<MonthGrid> {
        let logs = self.selected_habit().map(|h| h.logs.as_slice()).unwrap_or(&[]);
        match self.view.grid(logs, self.today) {
            Ok(g)  => Some(g),
            Err(e) => {
                tracing::warn!("month grid {}/{}: {e}", self.view.year, self.view.month);
                None
            }
        }
    }

    // ── TUI loop ──────────────────────────────────────────────────────────────

    pub async fn run(&mut self) -> Result<()> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend  = CrosstermBackend::new(stdout);
        let mut term = Terminal::new(backend)?;

        let result = self.event_loop(&mut term).await;

        disable_raw_mode()?;
        execute!(term.backend_mut(), LeaveAlternateScreen, DisableMouseCapture)?;
        term.show_cursor()?;
        result
    }

    async fn event_loop(
        &mut self,
        term: &mut Terminal<CrosstermBackend<io::Stdout>>,
    ) -> Result<()> {
        let tick = std::time::Duration::from_millis(50);
        while self.running {
            // The date can roll over while the app is open.
            self.today = Local::now().date_naive();
            term.draw(|f| draw(f, self))?;

            let pending: Vec<CoachEvent> = if let Some(ref w) = self.coach {
                if let Ok(mut rx) = w.event_rx.try_lock() {
                    let mut buf = Vec::new();
                    while let Ok(ev) = rx.try_recv() { buf.push(ev); }
                    buf
                } else { vec![] }
            } else { vec![] };
            for ev in pending { self.on_coach_event(ev); }

            if event::poll(tick)? {
                if let Event::Key(key) = event::read()? {
                    self.on_key(key).await?;
                }
            }
        }

        if let Some(ref w) = self.coach { w.shutdown().await; }
        Ok(())
    }

    pub fn on_coach_event(&mut self, ev: CoachEvent) {
        match ev {
            CoachEvent::Thinking => {
                self.status = format!("⟳ {}", locale::t(self.language, Text::CoachThinking));
            }
            CoachEvent::PlanReady(plan) => {
                self.status = String::new();
                if self.active_panel == Panel::Wizard {
                    self.ui.plan        = Some(plan);
                    self.ui.wizard_step = WizardStep::Review;
                }
            }
            CoachEvent::PlanFailed(msg) => {
                tracing::warn!("blueprint failed: {msg}");
                self.status          = String::new();
                self.ui.wizard_error = Some(locale::t(self.language, Text::Error).to_owned());
                self.ui.wizard_step  = WizardStep::Goal;
                self.ui.input_mode   = InputMode::Insert;
            }
            CoachEvent::InsightReady { habit_id, motivation, .. } => {
                self.status = "✓ Coach".into();
                if let Some(h) = self.habits.iter_mut().find(|h| h.id == habit_id) {
                    h.ai_motivation = Some(motivation);
                }
            }
            CoachEvent::Error(msg) => self.status = format!("✗ {msg}"),
        }
    }

    // ── Input ─────────────────────────────────────────────────────────────────

    pub async fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        if self.active_panel == Panel::Wizard {
            return self.key_wizard(key).await;
        }

        match key.code {
            KeyCode::Char('q') => { self.running = false; return Ok(()); }
            KeyCode::Char('?') => { self.active_panel = Panel::Help; return Ok(()); }
            KeyCode::Esc => { self.active_panel = Panel::Dashboard; return Ok(()); }
            KeyCode::Char('T') => {
                self.theme = self.theme.next_accent();
                let _ = self.theme.save();
                return Ok(());
            }
            KeyCode::Char('M') => {
                self.theme = self.theme.toggle_mode();
                let _ = self.theme.save();
                return Ok(());
            }
            KeyCode::Char('L') => { self.language = self.language.toggle(); return Ok(()); }
            _ => {}
        }

        let panel = self.active_panel.clone();
        match panel {
            Panel::Dashboard => self.key_dashboard(key).await?,
            Panel::Detail    => self.key_detail(key).await?,
            Panel::Analytics => {
                if matches!(key.code, KeyCode::Tab | KeyCode::Char('a')) {
                    self.active_panel = Panel::Dashboard;
                }
            }
            Panel::Help | Panel::Wizard => {}
        }
        Ok(())
    }

    async fn key_dashboard(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Down | KeyCode::Char('j') => {
                if self.habit_cursor + 1 < self.habits.len() { self.habit_cursor += 1; }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.habit_cursor = self.habit_cursor.saturating_sub(1);
            }
            KeyCode::Char(' ') => {
                let iso = self.today.format("%Y-%m-%d").to_string();
                self.toggle_selected(&iso).await?;
            }
            KeyCode::Enter | KeyCode::Tab => {
                if !self.habits.is_empty() {
                    self.jump_to(self.today);
                    self.active_panel = Panel::Detail;
                }
            }
            KeyCode::Char('a') => self.active_panel = Panel::Analytics,
            KeyCode::Char('n') => {
                self.ui.reset_wizard();
                self.active_panel = Panel::Wizard;
            }
            KeyCode::Char('c') => {
                if let (Some(w), Some(h)) = (&self.coach, self.selected_habit()) {
                    w.coach(h.clone(), self.language).await;
                } else if self.coach.is_none() {
                    self.status = locale::t(self.language, Text::CoachDisabled).to_owned();
                }
            }
            KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(h) = self.selected_habit().cloned() {
                    self.db.delete_habit(&h.id).await?;
                    tracing::info!("Deleted habit {}", h.id);
                    self.reload().await;
                }
            }
            _ => {}
        }
        Ok(())
    }

    async fn key_detail(&mut self, key: KeyEvent) -> Result<()> {
        match key.code {
            KeyCode::Right | KeyCode::Char('l') => self.shift_day(1),
            KeyCode::Left  | KeyCode::Char('h') => self.shift_day(-1),
            KeyCode::Down  | KeyCode::Char('j') => self.shift_day(7),
            KeyCode::Up    | KeyCode::Char('k') => self.shift_day(-7),
            KeyCode::Char(']') => self.next_month(),
            KeyCode::Char('[') => self.prev_month(),
            KeyCode::Char('t') => self.jump_to(self.today),
            KeyCode::Char(' ') | KeyCode::Enter => {
                let iso = jalali::jalali_to_iso(self.view.year, self.view.month, self.selected_day)?;
                self.toggle_selected(&iso).await?;
            }
            KeyCode::Tab => self.active_panel = Panel::Dashboard,
            _ => {}
        }
        Ok(())
    }

    // ── Creation wizard ───────────────────────────────────────────────────────

    async fn key_wizard(&mut self, key: KeyEvent) -> Result<()> {
        if key.code == KeyCode::Esc {
            self.ui.reset_wizard();
            self.active_panel = Panel::Dashboard;
            return Ok(());
        }

        match self.ui.wizard_step {
            WizardStep::Goal => match key.code {
                KeyCode::Char(c)   => self.ui.goal.push(c),
                KeyCode::Backspace => { self.ui.goal.pop(); }
                // Tab skips the coach and plants the goal as typed.
                KeyCode::Tab => {
                    let goal = self.ui.goal.trim().to_owned();
                    if !goal.is_empty() {
                        self.ui.plan        = Some(AiHabitPlan::manual(&goal));
                        self.ui.wizard_step = WizardStep::Review;
                        self.ui.input_mode  = InputMode::Normal;
                    }
                }
                KeyCode::Enter => {
                    let goal = self.ui.goal.trim().to_owned();
                    if goal.is_empty() { return Ok(()); }
                    self.ui.wizard_error = None;
                    self.ui.input_mode   = InputMode::Normal;
                    match &self.coach {
                        Some(w) => {
                            self.ui.wizard_step = WizardStep::Thinking;
                            w.blueprint(goal, self.language).await;
                        }
                        None => {
                            self.ui.plan        = Some(AiHabitPlan::manual(&goal));
                            self.ui.wizard_step = WizardStep::Review;
                        }
                    }
                }
                _ => {}
            },
            WizardStep::Thinking => {}
            WizardStep::Review => {
                if key.code == KeyCode::Enter {
                    if let Some(plan) = self.ui.plan.take() {
                        self.add_habit(&plan).await?;
                    }
                    self.ui.reset_wizard();
                    self.active_panel = Panel::Dashboard;
                }
            }
        }
        Ok(())
    }

    // ── Helpers ───────────────────────────────────────────────────────────────

    pub async fn add_habit(&mut self, plan: &AiHabitPlan) -> Result<()> {
        let habit = Habit::from_plan(plan);
        self.db.upsert_habit(&habit).await?;
        tracing::info!("Planted habit {} ({})", habit.title, habit.id);
        self.habits.insert(0, habit);
        self.habit_cursor = 0;
        Ok(())
    }

    /// Toggles `iso` for the selected habit and persists the change.
    pub async fn toggle_selected(&mut self, iso: &str) -> Result<()> {
        let today = self.today;
        let Some(habit) = self.habits.get_mut(self.habit_cursor) else { return Ok(()) };
        habits::toggle_log(habit, iso, today);
        self.db.save_progress(habit, iso).await?;
        Ok(())
    }

    pub fn jump_to(&mut self, date: NaiveDate) {
        let j = jalali::from_naive(date);
        self.view         = MonthCursor { year: j.year, month: j.month };
        self.selected_day = j.day;
    }

    pub fn selected_date(&self) -> Option<NaiveDate> {
        let j = JalaliDate { year: self.view.year, month: self.view.month, day: self.selected_day };
        jalali::to_gregorian(j).ok().and_then(|g| NaiveDate::try_from(g).ok())
    }

    pub fn shift_day(&mut self, d: i64) {
        if let Some(date) = self.selected_date() {
            self.jump_to(date + Duration::days(d));
        }
    }

    pub fn next_month(&mut self) {
        self.view = self.view.next();
        self.clamp_selected_day();
    }

    pub fn prev_month(&mut self) {
        self.view = self.view.prev();
        self.clamp_selected_day();
    }

    fn clamp_selected_day(&mut self) {
        let max = jalali::month_length(self.view.year, self.view.month).unwrap_or(29);
        self.selected_day = self.selected_day.clamp(1, max);
    }

    async fn reload(&mut self) {
        self.habits = self.db.all_habits().await.unwrap_or_else(|e| {
            tracing::error!("all_habits: {e}");
            Vec::new()
        });
        if self.habit_cursor >= self.habits.len() {
            self.habit_cursor = self.habits.len().saturating_sub(1);
        }
    }
}
