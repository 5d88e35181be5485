use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::Title, Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use crate::app::{App, Panel};
use crate::calendar::CalendarDay;
use crate::habits::{self, AiHabitPlan};
use crate::jalali;
use crate::locale::{self, Text};
use crate::theme::{habit_color, ThemeConfig};

// ─── UI enums / state ─────────────────────────────────────────────────────────

#[derive(Debug, Default, Clone, PartialEq)]
pub enum InputMode { #[default] Normal, Insert }

/// Step of the habit creation wizard.
#[derive(Debug, Default, Clone, PartialEq)]
pub enum WizardStep {
    #[default]
    Goal,
    Thinking,
    Review,
}

#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub input_mode:   InputMode,
    pub goal:         String,
    pub wizard_step:  WizardStep,
    pub plan:         Option<AiHabitPlan>,
    pub wizard_error: Option<String>,
}

impl UiState {
    pub fn reset_wizard(&mut self) {
        *self = Self { input_mode: InputMode::Insert, ..Self::default() };
    }
}

// ─── Root draw ────────────────────────────────────────────────────────────────

pub fn draw(f: &mut Frame, app: &App) {
    let area = f.area();

    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.bg()).fg(app.theme.fg())),
        area,
    );

    // Layout: [ content | status_bar(1) ]
    let root = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)]).split(area);

    // Content: [ calendar(34) | right_panel ]
    let cols = Layout::default().direction(Direction::Horizontal)
        .constraints([Constraint::Length(34), Constraint::Min(0)]).split(root[0]);

    // Right: [ habits(60%) | coach(40%) ]
    let rows = Layout::default().direction(Direction::Vertical)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(cols[1]);

    draw_calendar(f, app, cols[0]);
    draw_habits(f, app, rows[0]);
    draw_coach(f, app, rows[1]);
    draw_statusbar(f, app, root[1]);

    match app.active_panel {
        Panel::Analytics => draw_analytics(f, area, app),
        Panel::Wizard    => draw_wizard(f, area, app),
        Panel::Help      => draw_help(f, area, app),
        _ => {}
    }
}

fn panel_block<'a>(t: &ThemeConfig, title: Line<'a>, focused: bool) -> Block<'a> {
    Block::default()
        .title(Title::from(title))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(if focused { t.border_active() } else { t.border() }))
        .style(Style::default().bg(t.bg()))
}

// ─── Jalali calendar ──────────────────────────────────────────────────────────

fn draw_calendar(f: &mut Frame, app: &App, area: Rect) {
    let t       = &app.theme;
    let lang    = app.language;
    let focused = app.active_panel == Panel::Detail;
    let title   = Line::from(Span::styled(
        format!(" {} {} ", locale::month_name(lang, app.view.month), app.view.year),
        Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
    ));
    let block = panel_block(t, title, focused);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(grid) = app.month_grid() else {
        f.render_widget(Paragraph::new("  ?").style(Style::default().fg(t.error())), inner);
        return;
    };
    let rtl = lang.dir() == locale::Direction::Rtl;

    let mut lines: Vec<Line> = vec![];

    // Header row, Saturday first; Friday is the weekend.
    let mut hdrs: Vec<Span> = locale::weekday_headers(lang).iter().enumerate().map(|(i, d)| {
        let fg = if i == 6 { t.weekend_color() } else { t.fg_dim() };
        Span::styled(format!(" {d:>2} "), Style::default().fg(fg).add_modifier(Modifier::BOLD))
    }).collect();
    if rtl { hdrs.reverse(); }
    lines.push(Line::from(hdrs));
    lines.push(Line::from(Span::styled(
        "─".repeat(inner.width as usize),
        Style::default().fg(t.border()),
    )));

    for week in grid.weeks() {
        let mut spans: Vec<Span> = week.iter().enumerate()
            .map(|(col, cell)| day_span(app, cell, col, focused))
            .collect();
        if rtl { spans.reverse(); }
        lines.push(Line::from(spans));
    }

    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        format!(" {}/{} {}", grid.completed_days(), grid.days_in_month, locale::t(lang, Text::Done)),
        Style::default().fg(t.fg_dim()),
    )));
    if let Some(date) = app.selected_date() {
        lines.push(Line::from(Span::styled(
            format!(" {}", date.format("%Y-%m-%d")),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        )));
    }

    let align = if rtl { Alignment::Right } else { Alignment::Left };
    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(t.bg())).alignment(align),
        inner,
    );
}

fn day_span<'a>(app: &App, cell: &CalendarDay, col: usize, focused: bool) -> Span<'a> {
    let t = &app.theme;
    let Some(d) = cell.day_number else { return Span::raw("    ") };
    let label = format!(" {d:2} ");

    let style = if focused && d == app.selected_day {
        let (bg, fg) = t.selected_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if cell.is_completed {
        let (bg, fg) = t.completed_highlight();
        let s = Style::default().bg(bg).fg(fg);
        if cell.is_today { s.add_modifier(Modifier::BOLD | Modifier::UNDERLINED) } else { s }
    } else if cell.is_today {
        let (bg, fg) = t.today_highlight();
        Style::default().bg(bg).fg(fg).add_modifier(Modifier::BOLD)
    } else if col == 6 {
        Style::default().fg(t.weekend_color())
    } else {
        Style::default().fg(t.fg())
    };
    Span::styled(label, style)
}

// ─── Habit list ───────────────────────────────────────────────────────────────

fn draw_habits(f: &mut Frame, app: &App, area: Rect) {
    let t       = &app.theme;
    let lang    = app.language;
    let focused = app.active_panel == Panel::Dashboard;
    let today_j = jalali::from_naive(app.today);
    let title   = Line::from(Span::styled(
        format!(
            " ● {} ({} {} {}) ",
            locale::t(lang, Text::Habits),
            today_j.day, locale::month_name(lang, today_j.month), today_j.year,
        ),
        Style::default().fg(t.accent()),
    ));
    let block = panel_block(t, title, focused);

    if app.habits.is_empty() {
        f.render_widget(
            Paragraph::new(format!("  {}", locale::t(lang, Text::NoHabitsTitle)))
                .block(block).style(Style::default().fg(t.fg_dim())),
            area,
        );
        return;
    }

    let today_iso = app.today.format("%Y-%m-%d").to_string();
    let items: Vec<ListItem> = app.habits.iter().enumerate().map(|(i, h)| {
        let done  = h.is_completed_on(&today_iso);
        let check = if done { " ✔ " } else { " ○ " };
        let cs    = Style::default().fg(if done { habit_color(&h.color) } else { t.fg_dim() });
        let sel   = i == app.habit_cursor;
        let ts    = if sel && focused {
            let (bg, fg) = t.selected_highlight();
            Style::default().bg(bg).fg(fg)
        } else if sel {
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(t.fg())
        };
        ListItem::new(Line::from(vec![
            Span::styled(check, cs),
            Span::styled(h.title.clone(), ts),
            Span::styled(
                format!("  {}", locale::category_label(lang, h.category)),
                Style::default().fg(t.fg_dim()),
            ),
            Span::styled(
                format!("  🔥 {} {}", h.streak, locale::t(lang, Text::Streak)),
                Style::default().fg(habit_color(&h.color)),
            ),
        ]))
    }).collect();

    let mut state = ListState::default();
    state.select(Some(app.habit_cursor));
    f.render_stateful_widget(List::new(items).block(block).highlight_symbol("▶ "), area, &mut state);
}

// ─── Coach panel ──────────────────────────────────────────────────────────────

fn draw_coach(f: &mut Frame, app: &App, area: Rect) {
    let t     = &app.theme;
    let lang  = app.language;
    let title = Line::from(Span::styled(" ✦ Coach ", Style::default().fg(t.accent())));
    let block = panel_block(t, title, false);

    let Some(h) = app.selected_habit() else {
        f.render_widget(Paragraph::new("").block(block), area);
        return;
    };

    let dim    = Style::default().fg(t.fg_dim());
    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let mut lines = vec![
        Line::from(Span::styled(h.title.clone(), accent)),
        Line::from(Span::styled(h.description.clone(), Style::default().fg(t.fg()))),
        Line::from(""),
        Line::from(vec![
            Span::styled(format!("{}: ", locale::t(lang, Text::ConsistencyMetrics)), dim),
            Span::styled(
                format!("{}%", habits::completion_rate(&h.logs)),
                Style::default().fg(habit_color(&h.color)),
            ),
            Span::styled(format!("   {}: {}", locale::t(lang, Text::Streak), h.streak), dim),
            Span::styled(format!("   {}", h.target_frequency), dim),
        ]),
    ];
    if let Some(m) = &h.ai_motivation {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("“{m}”"),
            Style::default().fg(t.fg()).add_modifier(Modifier::ITALIC),
        )));
    }

    f.render_widget(
        Paragraph::new(lines).block(block).wrap(Wrap { trim: true }),
        area,
    );
}

// ─── Status bar ───────────────────────────────────────────────────────────────

fn draw_statusbar(f: &mut Frame, app: &App, area: Rect) {
    let t = &app.theme;
    let (mode_str, mode_style) = match app.ui.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(t.accent()).fg(t.bg()).add_modifier(Modifier::BOLD)),
        InputMode::Insert => (" INSERT ", Style::default().bg(t.success()).fg(t.bg()).add_modifier(Modifier::BOLD)),
    };
    let hints = match app.active_panel {
        Panel::Detail => "  hjkl:day  [/]:month  t:today  Space:mark  Tab:habits  ?:help",
        _ => "  jk:nav  Space:done  Enter:calendar  n:new  c:coach  a:stats  d:del  T/M/L:theme/mode/lang  q:quit",
    };
    let bar = Paragraph::new(Line::from(vec![
        Span::styled(mode_str, mode_style),
        Span::styled(format!(" {} ", app.language.code().to_uppercase()), Style::default().fg(t.accent())),
        Span::styled(hints, Style::default().fg(t.fg_dim())),
        Span::styled(
            format!("  {}", app.status),
            Style::default().fg(t.fg_dim()).add_modifier(Modifier::ITALIC),
        ),
    ])).style(Style::default().bg(t.bg2()));
    f.render_widget(bar, area);
}

// ─── Analytics overlay ────────────────────────────────────────────────────────

fn draw_analytics(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let lang = app.language;
    let rect = centered(70, 70, area);
    f.render_widget(Clear, rect);

    let block = popup_block(t, locale::t(lang, Text::Analytics));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let dim   = Style::default().fg(t.fg_dim());
    let width = inner.width.saturating_sub(34).max(10) as usize;
    let mut lines = vec![
        Line::from(Span::styled(
            format!("  {}", locale::t(lang, Text::ConsistencyMetrics)),
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
    ];
    for s in habits::stats(&app.habits) {
        let filled = width * s.rate as usize / 100;
        lines.push(Line::from(vec![
            Span::styled(format!("  {:<14}", s.name), Style::default().fg(t.fg())),
            Span::styled("█".repeat(filled), Style::default().fg(habit_color(&s.color))),
            Span::styled("░".repeat(width - filled), Style::default().fg(t.border())),
            Span::styled(format!(" {:>3}%  🔥{}", s.rate, s.streak), dim),
        ]));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(format!("  Esc: {}", locale::t(lang, Text::Back)), dim)));

    f.render_widget(Paragraph::new(lines).style(Style::default().bg(t.popup_bg())), inner);
}

// ─── Creation wizard ──────────────────────────────────────────────────────────

fn draw_wizard(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let lang = app.language;
    let rect = centered(60, 50, area);
    f.render_widget(Clear, rect);

    let block = popup_block(t, locale::t(lang, Text::NewHabit));
    let inner = block.inner(rect);
    f.render_widget(block, rect);

    let acc = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(t.fg_dim());
    let fg  = Style::default().fg(t.fg());

    let mut lines = vec![Line::from("")];
    match app.ui.wizard_step {
        WizardStep::Goal => {
            lines.push(Line::from(Span::styled(format!("  {}", locale::t(lang, Text::WizardGoalLabel)), acc)));
            lines.push(Line::from(""));
            if app.ui.goal.is_empty() {
                lines.push(Line::from(vec![
                    Span::styled("  █", fg),
                    Span::styled(locale::t(lang, Text::WizardPlaceholder), dim),
                ]));
            } else {
                lines.push(Line::from(Span::styled(format!("  {}█", app.ui.goal), fg)));
            }
            if let Some(e) = &app.ui.wizard_error {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(format!("  {e}"), Style::default().fg(t.error()))));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("  Enter: ask coach   Tab: plant as typed   Esc: cancel", dim)));
        }
        WizardStep::Thinking => {
            lines.push(Line::from(Span::styled(format!("  ⟳ {}", locale::t(lang, Text::WizardThinking)), acc)));
        }
        WizardStep::Review => {
            if let Some(plan) = &app.ui.plan {
                lines.push(Line::from(Span::styled(format!("  {}", plan.title), acc)));
                lines.push(Line::from(Span::styled(
                    format!("  {} · {}", locale::category_label(lang, plan.category), plan.frequency),
                    dim,
                )));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(format!("  {}", plan.description), fg)));
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled(format!("  {}: ", locale::t(lang, Text::MicroStep)), acc),
                    Span::styled(plan.micro_step.clone(), fg),
                ]));
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(format!("  {}", locale::t(lang, Text::WizardConfirm)), dim)));
        }
    }

    f.render_widget(
        Paragraph::new(lines).style(Style::default().bg(t.popup_bg())).wrap(Wrap { trim: false }),
        inner,
    );
}

// ─── Help overlay ────────────────────────────────────────────────────────────

fn draw_help(f: &mut Frame, area: Rect, app: &App) {
    let t    = &app.theme;
    let rect = centered(68, 80, area);
    f.render_widget(Clear, rect);

    let block  = popup_block(t, "Keyboard Shortcuts");
    let accent = Style::default().fg(t.accent()).add_modifier(Modifier::BOLD);
    let dim    = Style::default().fg(t.fg_dim());
    let lines  = vec![
        Line::from(""),
        Line::from(Span::styled("  Habits", accent)),
        Line::from(Span::styled("  j/k  ↓↑            Select habit", dim)),
        Line::from(Span::styled("  Space              Mark today done / undone", dim)),
        Line::from(Span::styled("  n                  New habit (coach blueprint or as typed)", dim)),
        Line::from(Span::styled("  c                  Ask the coach for a tip", dim)),
        Line::from(Span::styled("  d / Del            Delete habit", dim)),
        Line::from(Span::styled("  a                  Consistency chart", dim)),
        Line::from(""),
        Line::from(Span::styled("  Calendar (Jalali)", accent)),
        Line::from(Span::styled("  Enter / Tab        Focus calendar", dim)),
        Line::from(Span::styled("  h/j/k/l  ←↓↑→     Move by day / week", dim)),
        Line::from(Span::styled("  [ / ]              Prev / Next month", dim)),
        Line::from(Span::styled("  t                  Jump to today", dim)),
        Line::from(Span::styled("  Space / Enter      Toggle selected day", dim)),
        Line::from(""),
        Line::from(Span::styled("  General", accent)),
        Line::from(Span::styled("  T                  Next accent colour", dim)),
        Line::from(Span::styled("  M                  Dark / light mode", dim)),
        Line::from(Span::styled("  L                  English / فارسی", dim)),
        Line::from(Span::styled("  ?                  Help", dim)),
        Line::from(Span::styled("  Esc                Cancel / back", dim)),
        Line::from(Span::styled("  q                  Quit", dim)),
    ];

    f.render_widget(
        Paragraph::new(lines).block(block).style(Style::default().fg(t.fg()))
            .wrap(Wrap { trim: false }),
        rect,
    );
}

// ─── Utilities ────────────────────────────────────────────────────────────────

fn popup_block<'a>(t: &ThemeConfig, label: &str) -> Block<'a> {
    Block::default()
        .title(Title::from(Line::from(Span::styled(
            format!(" {label} "),
            Style::default().fg(t.accent()).add_modifier(Modifier::BOLD),
        ))))
        .borders(Borders::ALL)
        .border_type(t.border_type())
        .border_style(Style::default().fg(t.border_active()))
        .style(Style::default().bg(t.popup_bg()))
}

fn centered(pct_x: u16, pct_y: u16, r: Rect) -> Rect {
    let vert = Layout::default().direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - pct_y) / 2),
            Constraint::Percentage(pct_y),
            Constraint::Percentage((100 - pct_y) / 2),
        ]).split(r);
    Layout::default().direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - pct_x) / 2),
            Constraint::Percentage(pct_x),
            Constraint::Percentage((100 - pct_x) / 2),
        ]).split(vert[1])[1]
}
