/// English and Persian strings for the TUI and the coach prompts.
use serde::{Deserialize, Serialize};

use crate::habits::HabitCategory;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Fa,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction { Ltr, Rtl }

impl Language {
    pub fn dir(self) -> Direction {
        match self { Language::En => Direction::Ltr, Language::Fa => Direction::Rtl }
    }

    /// Name used inside coach prompts.
    pub fn prompt_name(self) -> &'static str {
        match self { Language::En => "English", Language::Fa => "Persian (Farsi)" }
    }

    pub fn toggle(self) -> Self {
        match self { Language::En => Language::Fa, Language::Fa => Language::En }
    }

    pub fn code(self) -> &'static str {
        match self { Language::En => "en", Language::Fa => "fa" }
    }
}

// ─── Calendar names ───────────────────────────────────────────────────────────

const MONTHS_EN: [&str; 12] = [
    "Farvardin", "Ordibehesht", "Khordad", "Tir", "Mordad", "Shahrivar",
    "Mehr", "Aban", "Azar", "Dey", "Bahman", "Esfand",
];
const MONTHS_FA: [&str; 12] = [
    "فروردین", "اردیبهشت", "خرداد", "تیر", "مرداد", "شهریور",
    "مهر", "آبان", "آذر", "دی", "بهمن", "اسفند",
];

// Saturday first.
const WEEKDAYS_EN: [&str; 7] = ["Sa", "Su", "Mo", "Tu", "We", "Th", "Fr"];
const WEEKDAYS_FA: [&str; 7] = ["ش", "ی", "د", "س", "چ", "پ", "ج"];

pub fn month_name(lang: Language, month: u32) -> &'static str {
    let names = match lang { Language::En => &MONTHS_EN, Language::Fa => &MONTHS_FA };
    month.checked_sub(1)
        .and_then(|i| names.get(i as usize))
        .copied()
        .unwrap_or("???")
}

pub fn weekday_headers(lang: Language) -> [&'static str; 7] {
    match lang { Language::En => WEEKDAYS_EN, Language::Fa => WEEKDAYS_FA }
}

pub fn category_label(lang: Language, c: HabitCategory) -> &'static str {
    match (lang, c) {
        (Language::En, _)                      => c.as_str(),
        (Language::Fa, HabitCategory::Health)       => "سلامتی",
        (Language::Fa, HabitCategory::Productivity) => "بهره‌وری",
        (Language::Fa, HabitCategory::Mindfulness)  => "ذهن‌آگاهی",
        (Language::Fa, HabitCategory::Learning)     => "یادگیری",
        (Language::Fa, HabitCategory::Creativity)   => "خلاقیت",
        (Language::Fa, HabitCategory::Other)        => "سایر",
    }
}

// ─── UI text ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Text {
    Habits,
    Analytics,
    ConsistencyMetrics,
    NoHabitsTitle,
    Streak,
    Done,
    Mark,
    Tip,
    Back,
    NewHabit,
    WizardGoalLabel,
    WizardPlaceholder,
    WizardThinking,
    WizardConfirm,
    MicroStep,
    Error,
    CoachThinking,
    CoachDisabled,
}

pub fn t(lang: Language, key: Text) -> &'static str {
    match lang {
        Language::Fa => fa(key).unwrap_or_else(|| en(key)),
        Language::En => en(key),
    }
}

fn en(key: Text) -> &'static str {
    match key {
        Text::Habits             => "Habits",
        Text::Analytics          => "Analytics",
        Text::ConsistencyMetrics => "Consistency",
        Text::NoHabitsTitle      => "No habits yet. Press n to plant one.",
        Text::Streak             => "Streak",
        Text::Done               => "Done",
        Text::Mark               => "Mark",
        Text::Tip                => "Tip",
        Text::Back               => "Back",
        Text::NewHabit           => "New Habit",
        Text::WizardGoalLabel    => "What do you want to achieve?",
        Text::WizardPlaceholder  => "e.g. I want to read more books",
        Text::WizardThinking     => "Designing your habit…",
        Text::WizardConfirm      => "Enter: plant this habit   Esc: cancel",
        Text::MicroStep          => "Micro step",
        Text::Error              => "Something went wrong. Please try again.",
        Text::CoachThinking      => "Asking your coach…",
        Text::CoachDisabled      => "Coach disabled: set GEMINI_API_KEY or [gemini] api_key",
    }
}

fn fa(key: Text) -> Option<&'static str> {
    Some(match key {
        Text::Habits             => "عادت‌ها",
        Text::Analytics          => "تحلیل",
        Text::ConsistencyMetrics => "میزان پایداری",
        Text::NoHabitsTitle      => "هنوز عادتی ندارید. برای شروع n را بزنید.",
        Text::Streak             => "زنجیره",
        Text::Done               => "انجام شد",
        Text::Mark               => "ثبت",
        Text::Tip                => "نکته",
        Text::Back               => "بازگشت",
        Text::NewHabit           => "عادت جدید",
        Text::WizardGoalLabel    => "به چه هدفی می‌خواهید برسید؟",
        Text::MicroStep          => "گام کوچک",
        Text::Error              => "خطایی رخ داد. دوباره تلاش کنید.",
        Text::CoachDisabled      => "مربی غیرفعال است: GEMINI_API_KEY یا [gemini] api_key را تنظیم کنید",
        _ => return None,
    })
}
