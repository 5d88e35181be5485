use chrono::{DateTime, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

// ─── Domain models ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HabitCategory {
    Health,
    Productivity,
    Mindfulness,
    Learning,
    Creativity,
    Other,
}

impl HabitCategory {
    pub const ALL: [HabitCategory; 6] = [
        HabitCategory::Health,
        HabitCategory::Productivity,
        HabitCategory::Mindfulness,
        HabitCategory::Learning,
        HabitCategory::Creativity,
        HabitCategory::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HabitCategory::Health       => "Health",
            HabitCategory::Productivity => "Productivity",
            HabitCategory::Mindfulness  => "Mindfulness",
            HabitCategory::Learning     => "Learning",
            HabitCategory::Creativity   => "Creativity",
            HabitCategory::Other        => "Other",
        }
    }

    /// Unknown names fall back to `Other`.
    pub fn parse(s: &str) -> Self {
        Self::ALL.into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .unwrap_or(HabitCategory::Other)
    }
}

impl fmt::Display for HabitCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// One day's entry, keyed by Gregorian ISO date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitLog {
    pub date:      String,
    pub completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes:     Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id:               String,
    pub title:            String,
    pub description:      String,
    pub category:         HabitCategory,
    pub start_date:       DateTime<Utc>,
    pub target_frequency: String,
    pub streak:           u32,
    pub logs:             Vec<HabitLog>,
    pub color:            String,
    pub ai_motivation:    Option<String>,
}

/// A habit proposal, either produced by the coach or typed in by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiHabitPlan {
    pub title:       String,
    pub description: String,
    /// The easiest version of the habit, what the user actually commits to.
    pub micro_step:  String,
    pub category:    HabitCategory,
    pub frequency:   String,
}

impl AiHabitPlan {
    pub fn manual(title: &str) -> Self {
        Self {
            title:       title.to_owned(),
            description: String::new(),
            micro_step:  title.to_owned(),
            category:    HabitCategory::Other,
            frequency:   "Daily".to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiInsight {
    pub message:        String,
    pub actionable_tip: String,
}

impl AiInsight {
    /// Text stored on the habit, e.g. `"Nice run. Tip: stack it after coffee."`.
    pub fn motivation(&self, tip_label: &str) -> String {
        format!("{} {}: {}", self.message, tip_label, self.actionable_tip)
    }
}

pub const HABIT_COLORS: &[&str] = &[
    "rose", "orange", "amber", "emerald", "teal", "cyan", "indigo", "violet", "fuchsia",
];

impl Habit {
    pub fn from_plan(plan: &AiHabitPlan) -> Self {
        let id    = Uuid::new_v4();
        let color = HABIT_COLORS[id.as_bytes()[0] as usize % HABIT_COLORS.len()];
        Self {
            id:               id.to_string(),
            title:            plan.title.clone(),
            description:      plan.micro_step.clone(),
            category:         plan.category,
            start_date:       Utc::now(),
            target_frequency: plan.frequency.clone(),
            streak:           0,
            logs:             Vec::new(),
            color:            color.to_owned(),
            ai_motivation:    None,
        }
    }

    pub fn is_completed_on(&self, iso: &str) -> bool {
        self.logs.iter().any(|l| l.date == iso && l.completed)
    }

    pub fn is_completed_today(&self) -> bool {
        self.is_completed_on(&today_iso())
    }
}

// ─── Logging and streaks ──────────────────────────────────────────────────────

/// Flips the entry for `iso_date`, or adds a completed entry if none exists,
/// then recomputes the streak relative to `today`.
pub fn toggle_log(habit: &mut Habit, iso_date: &str, today: NaiveDate) {
    match habit.logs.iter_mut().find(|l| l.date == iso_date) {
        Some(log) => log.completed = !log.completed,
        None      => habit.logs.push(HabitLog {
            date: iso_date.to_owned(), completed: true, notes: None,
        }),
    }
    habit.streak = compute_streak(&habit.logs, today);
}

/// Consecutive completed days ending today or yesterday. A streak whose last
/// completion is older than yesterday is broken and counts 0.
pub fn compute_streak(logs: &[HabitLog], today: NaiveDate) -> u32 {
    let done: BTreeSet<NaiveDate> = logs.iter()
        .filter(|l| l.completed)
        .filter_map(|l| NaiveDate::parse_from_str(&l.date, "%Y-%m-%d").ok())
        .collect();

    let mut newest_first = done.iter().rev();
    let Some(&latest) = newest_first.next() else { return 0 };
    if (today - latest).num_days().abs() > 1 {
        return 0;
    }

    let mut streak = 1;
    let mut prev   = latest;
    for &d in newest_first {
        if (prev - d).num_days() != 1 { break; }
        streak += 1;
        prev = d;
    }
    streak
}

/// Share of logged days that were completed, as a rounded percentage.
pub fn completion_rate(logs: &[HabitLog]) -> u32 {
    let completed = logs.iter().filter(|l| l.completed).count();
    let total     = logs.len().max(1);
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Completion ratio (0.0–1.0) over the last `n` log entries.
pub fn recent_completion_rate(logs: &[HabitLog], n: usize) -> f64 {
    let recent    = &logs[logs.len().saturating_sub(n)..];
    let completed = recent.iter().filter(|l| l.completed).count();
    completed as f64 / recent.len().max(1) as f64
}

// ─── Analytics ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HabitStats {
    pub name:   String,
    pub rate:   u32,
    pub streak: u32,
    pub color:  String,
}

pub fn stats(habits: &[Habit]) -> Vec<HabitStats> {
    habits.iter().map(|h| HabitStats {
        name:   short_title(&h.title, 10),
        rate:   completion_rate(&h.logs),
        streak: h.streak,
        color:  h.color.clone(),
    }).collect()
}

fn short_title(title: &str, max: usize) -> String {
    if title.chars().count() > max {
        format!("{}...", title.chars().take(max).collect::<String>())
    } else {
        title.to_owned()
    }
}

/// Today's local date as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    Local::now().date_naive().format("%Y-%m-%d").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate { NaiveDate::from_ymd_opt(y, m, d).unwrap() }

    fn log(date: &str, completed: bool) -> HabitLog {
        HabitLog { date: date.to_owned(), completed, notes: None }
    }

    fn habit() -> Habit { Habit::from_plan(&AiHabitPlan::manual("Read one page")) }

    #[test]
    fn streak_counts_back_from_today() {
        let logs = vec![log("2024-03-18", true), log("2024-03-19", true), log("2024-03-20", true)];
        assert_eq!(compute_streak(&logs, ymd(2024, 3, 20)), 3);
    }

    #[test]
    fn streak_survives_until_end_of_next_day() {
        let logs = vec![log("2024-03-18", true), log("2024-03-19", true)];
        assert_eq!(compute_streak(&logs, ymd(2024, 3, 20)), 2);
        assert_eq!(compute_streak(&logs, ymd(2024, 3, 21)), 0);
    }

    #[test]
    fn streak_stops_at_gap_and_ignores_incomplete() {
        let logs = vec![
            log("2024-03-15", true),
            log("2024-03-17", true),
            log("2024-03-18", false),
            log("2024-03-19", true),
            log("2024-03-20", true),
        ];
        assert_eq!(compute_streak(&logs, ymd(2024, 3, 20)), 2);
    }

    #[test]
    fn streak_of_nothing_is_zero() {
        assert_eq!(compute_streak(&[], ymd(2024, 3, 20)), 0);
        assert_eq!(compute_streak(&[log("garbage", true)], ymd(2024, 3, 20)), 0);
    }

    #[test]
    fn streak_crosses_jalali_new_year() {
        let logs = vec![log("2024-03-19", true), log("2024-03-20", true), log("2024-03-21", true)];
        assert_eq!(compute_streak(&logs, ymd(2024, 3, 21)), 3);
    }

    #[test]
    fn toggle_adds_then_flips() {
        let mut h = habit();
        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        assert_eq!(h.logs, vec![log("2024-03-20", true)]);
        assert_eq!(h.streak, 1);

        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        assert_eq!(h.logs, vec![log("2024-03-20", false)]);
        assert_eq!(h.streak, 0);

        toggle_log(&mut h, "2024-03-19", ymd(2024, 3, 20));
        toggle_log(&mut h, "2024-03-20", ymd(2024, 3, 20));
        assert_eq!(h.logs.len(), 2);
        assert_eq!(h.streak, 2);
        assert!(h.is_completed_on("2024-03-19"));
    }

    #[test]
    fn rates() {
        let logs = vec![log("2024-03-18", true), log("2024-03-19", false), log("2024-03-20", true)];
        assert_eq!(completion_rate(&logs), 67);
        assert_eq!(completion_rate(&[]), 0);
        assert_eq!(recent_completion_rate(&logs, 2), 0.5);
        assert_eq!(recent_completion_rate(&logs, 7), 2.0 / 3.0);
        assert_eq!(recent_completion_rate(&[], 7), 0.0);
    }

    #[test]
    fn stats_shorten_long_titles() {
        let mut h = Habit::from_plan(&AiHabitPlan::manual("Meditate every morning"));
        h.logs.push(log("2024-03-20", true));
        let s = stats(&[h]);
        assert_eq!(s[0].name, "Meditate e...");
        assert_eq!(s[0].rate, 100);
    }

    #[test]
    fn category_parsing() {
        assert_eq!(HabitCategory::parse("health"), HabitCategory::Health);
        assert_eq!(HabitCategory::parse("Mindfulness"), HabitCategory::Mindfulness);
        assert_eq!(HabitCategory::parse("gardening"), HabitCategory::Other);
    }

    #[test]
    fn plan_json_uses_camel_case() {
        let plan: AiHabitPlan = serde_json::from_str(
            r#"{"title":"Walk","description":"Walk daily","microStep":"Put on shoes","category":"Health","frequency":"Daily"}"#,
        ).unwrap();
        assert_eq!(plan.micro_step, "Put on shoes");
        assert_eq!(plan.category, HabitCategory::Health);

        let h = Habit::from_plan(&plan);
        assert_eq!(h.description, "Put on shoes");
        assert!(HABIT_COLORS.contains(&h.color.as_str()));
    }

    #[test]
    fn motivation_text() {
        let i = AiInsight { message: "Nice run.".into(), actionable_tip: "Stack it after coffee.".into() };
        assert_eq!(i.motivation("Tip"), "Nice run. Tip: Stack it after coffee.");
    }

    #[test]
    fn completed_today_follows_the_local_date() {
        let today = Local::now().date_naive();
        let mut h = habit();
        assert!(!h.is_completed_today());

        toggle_log(&mut h, &today_iso(), today);
        assert!(h.is_completed_today());
        assert_eq!(h.streak, 1);

        toggle_log(&mut h, &today_iso(), today);
        assert!(!h.is_completed_today());
    }
}
