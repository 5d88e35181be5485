use anyhow::{anyhow, bail, Result};
use habit_inception::{
    app::App,
    calendar::{MonthCursor, MonthGrid},
    coach::{gemini::GeminiClient, worker::CoachWorker},
    config::AppConfig,
    db::{data_dir, Database},
    habits,
    jalali::{GregorianDate, JalaliDate},
    locale::{self, Language},
    theme::ThemeConfig,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();

    match args.get(1).map(|s| s.as_str()) {
        // ── hi convert [--jalali] DATE ───────────────────────────────────────
        Some("convert") => { init_stderr_logging(); cmd_convert(&args[2..]) }
        // ── hi cal [YEAR MONTH] ──────────────────────────────────────────────
        Some("cal")     => { init_stderr_logging(); cmd_cal(&args[2..]) }
        // ── hi list ──────────────────────────────────────────────────────────
        Some("list")    => { init_stderr_logging(); cmd_list().await }
        // ── hi (TUI) ─────────────────────────────────────────────────────────
        None            => run_tui().await,
        Some(other)     => bail!("unknown command `{other}`\nusage: hi [convert [--jalali] DATE | cal [YEAR MONTH] | list]"),
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

fn init_stderr_logging() {
    // stderr keeps command output on stdout clean.
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

// ─── Date conversion ──────────────────────────────────────────────────────────

fn cmd_convert(args: &[String]) -> Result<()> {
    match args {
        [flag, date] if flag == "--jalali" => {
            let j: JalaliDate = date.parse()?;
            println!("{}", j.to_gregorian()?);
        }
        [date] => {
            let g: GregorianDate = date.parse()?;
            println!("{}", g.to_jalali()?);
        }
        _ => bail!("usage: hi convert YYYY-MM-DD | hi convert --jalali YYYY-MM-DD"),
    }
    Ok(())
}

// ─── Month grid ───────────────────────────────────────────────────────────────

fn cmd_cal(args: &[String]) -> Result<()> {
    let cfg   = AppConfig::load().unwrap_or_default();
    let today = chrono::Local::now().date_naive();

    let cursor = match args {
        [] => MonthCursor::containing(today),
        [y, m] => MonthCursor {
            year:  y.parse().map_err(|_| anyhow!("invalid year `{y}`"))?,
            month: m.parse().map_err(|_| anyhow!("invalid month `{m}`"))?,
        },
        _ => bail!("usage: hi cal [YEAR MONTH]"),
    };

    let grid = cursor.grid(&[], today)?;
    print!("{}", render_month(&grid, cfg.language));
    Ok(())
}

fn render_month(grid: &MonthGrid, lang: Language) -> String {
    let mut out = format!("{:^28}\n", format!("{} {}", locale::month_name(lang, grid.month), grid.year));
    for d in locale::weekday_headers(lang) {
        out.push_str(&format!(" {d:>2} "));
    }
    out.push('\n');
    for week in grid.weeks() {
        for cell in &week {
            match cell.day_number {
                Some(d) if cell.is_today => out.push_str(&format!("[{d:2}]")),
                Some(d)                  => out.push_str(&format!(" {d:2} ")),
                None                     => out.push_str("    "),
            }
        }
        out.push('\n');
    }
    out
}

// ─── Habit listing ────────────────────────────────────────────────────────────

async fn cmd_list() -> Result<()> {
    let db = Database::connect().await?;
    db.migrate().await?;
    let all = db.all_habits().await?;

    if all.is_empty() {
        println!("No habits yet. Run  hi  and press n to plant one.");
        return Ok(());
    }

    for h in &all {
        let mark = if h.is_completed_today() { "✔" } else { "○" };
        println!(
            "{mark} {:<24} {:<13} streak {:>3}  {:>3}%",
            h.title, h.category.as_str(), h.streak, habits::completion_rate(&h.logs),
        );
    }
    Ok(())
}

// ─── TUI ─────────────────────────────────────────────────────────────────────

async fn run_tui() -> Result<()> {
    let log_dir = data_dir();
    std::fs::create_dir_all(&log_dir)?;
    let file_appender = tracing_appender::rolling::daily(&log_dir, "habit-inception.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::registry()
        .with(env_filter())
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking))
        .init();

    tracing::info!("Starting Habit Inception");

    let cfg   = AppConfig::load().unwrap_or_else(|e| {
        tracing::warn!("config.toml ignored: {e}");
        AppConfig::default()
    });
    let theme = ThemeConfig::load()?;
    let db    = Database::connect().await?;
    db.migrate().await?;

    let mut app = App::new(db.clone(), theme, cfg.language).await?;

    match cfg.gemini {
        Some(g) => {
            let client = GeminiClient::new(g)?;
            if client.is_configured() {
                app.attach_coach(CoachWorker::spawn(db, client));
            } else {
                tracing::info!("Gemini api_key is empty; coach disabled");
            }
        }
        None => tracing::info!("No [gemini] config; coach disabled"),
    }

    app.run().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_farvardin_1403() {
        let today = chrono::NaiveDate::from_ymd_opt(2024, 3, 20).unwrap();
        let grid  = MonthCursor { year: 1403, month: 1 }.grid(&[], today).unwrap();
        let out   = render_month(&grid, Language::En);
        let lines: Vec<&str> = out.lines().collect();

        assert!(lines[0].contains("Farvardin 1403"));
        assert_eq!(lines[1], " Sa  Su  Mo  Tu  We  Th  Fr ");
        // Four leading blanks put day 1 under Wednesday.
        assert_eq!(lines[2], "                [ 1]  2   3 ");
        assert_eq!(lines.len(), 2 + 5);
    }

    #[test]
    fn convert_rejects_bad_input() {
        assert!(cmd_convert(&["2024-13-01".into()]).is_err());
        assert!(cmd_convert(&["--jalali".into(), "1404/12/30".into()]).is_err());
        assert!(cmd_convert(&[]).is_err());
        assert!(cmd_convert(&["2024-03-20".into()]).is_ok());
    }

    #[test]
    fn jalali_today_is_valid() {
        assert!(JalaliDate::today().validate().is_ok());
    }
}
