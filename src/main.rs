// Sentence-completion quiz TUI built on ratatui + crossterm
// - samples 10 questions per round from a bundled bank (override with --file)
// - 30 seconds per question; on timeout the correct answer is shown briefly
// - mark questions with `m` to revisit them in a review pass at the end
// - results screen with score tier and a per-question breakdown

use std::{
    collections::HashSet,
    fs, io,
    path::{Path, PathBuf},
    time::{Duration, Instant},
};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use rand::{rngs::StdRng, Rng, SeedableRng};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Wrap},
    Frame, Terminal,
};
use serde::Deserialize;
use unicode_width::UnicodeWidthStr;

const PLACEHOLDER: &str = "___";
const TICK: Duration = Duration::from_secs(1);
const REVEAL_HOLD: Duration = Duration::from_secs(2);
const NO_ANSWER: &str = "No answer";
const MARKED_FOR_LATER: &str = "Marked for later";
const CONFIG_FILE: &str = "sentence-master.toml";
const DEFAULT_BANK: &str = include_str!("../data/questions.json");

#[derive(Debug, Clone, Parser)]
#[command(name = "sentence-master", about = "Timed sentence-completion quiz in the terminal", version)]
struct Cli {
    /// Question bank JSON, defaults to the bundled bank
    #[arg(long, short = 'f')]
    file: Option<PathBuf>,

    /// Config file, defaults to sentence-master.toml if present
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Appearance: dark | light
    #[arg(long, value_enum)]
    theme: Option<ThemeKind>,

    /// Fixed RNG seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
}

// ---------------- Config ----------------
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
struct QuizConfig {
    session_size: usize,
    seconds_per_question: u16,
    theme: Option<ThemeKind>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            session_size: 10,
            seconds_per_question: 30,
            theme: None,
        }
    }
}

fn parse_config(s: &str) -> Result<QuizConfig> {
    let cfg: QuizConfig = toml::from_str(s).context("failed to parse config")?;
    if cfg.session_size == 0 {
        bail!("session_size must be at least 1");
    }
    if cfg.seconds_per_question == 0 {
        bail!("seconds_per_question must be at least 1");
    }
    Ok(cfg)
}

fn load_config(explicit: Option<&Path>) -> Result<QuizConfig> {
    if let Some(p) = explicit {
        let s = fs::read_to_string(p)
            .with_context(|| format!("failed to read config: {}", p.display()))?;
        return parse_config(&s).with_context(|| format!("invalid config: {}", p.display()));
    }
    // Probe sentence-master.toml in the working directory and its ancestors
    let mut paths = vec![PathBuf::from(CONFIG_FILE)];
    if let Ok(cwd) = std::env::current_dir() {
        for anc in cwd.ancestors() {
            paths.push(anc.join(CONFIG_FILE));
        }
    }
    for p in paths {
        if p.exists() {
            let s = fs::read_to_string(&p)
                .with_context(|| format!("failed to read config: {}", p.display()))?;
            return parse_config(&s).with_context(|| format!("invalid config: {}", p.display()));
        }
    }
    Ok(QuizConfig::default())
}

// ---------------- Data model ----------------
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Question {
    id: i64,
    sentence: String,
    options: Vec<String>,
    correct_answer: String,
}

#[derive(Debug, Clone, Deserialize)]
struct BankFile {
    questions: Vec<Question>,
}

fn parse_bank(s: &str) -> Result<Vec<Question>> {
    let bank: BankFile = serde_json::from_str(s).context("failed to parse question bank JSON")?;
    validate_bank(&bank.questions)?;
    Ok(bank.questions)
}

fn load_bank(path: Option<&Path>) -> Result<Vec<Question>> {
    match path {
        Some(p) => {
            let s = fs::read_to_string(p)
                .with_context(|| format!("failed to read question bank: {}", p.display()))?;
            parse_bank(&s).with_context(|| format!("invalid question bank: {}", p.display()))
        }
        None => parse_bank(DEFAULT_BANK).context("bundled question bank is invalid"),
    }
}

fn validate_bank(questions: &[Question]) -> Result<()> {
    if questions.is_empty() {
        bail!("question bank is empty");
    }
    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id) {
            bail!("duplicate question id {}", q.id);
        }
        let blanks = q.sentence.matches(PLACEHOLDER).count();
        if blanks != 1 {
            bail!(
                "question {}: expected exactly one \"{}\" placeholder, found {}",
                q.id,
                PLACEHOLDER,
                blanks
            );
        }
        if q.options.len() != 4 {
            bail!("question {}: expected 4 options, found {}", q.id, q.options.len());
        }
        let distinct: HashSet<&str> = q.options.iter().map(String::as_str).collect();
        if distinct.len() != q.options.len() {
            bail!("question {}: options are not distinct", q.id);
        }
        if !q.options.contains(&q.correct_answer) {
            bail!(
                "question {}: correct answer \"{}\" is not among the options",
                q.id,
                q.correct_answer
            );
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
enum Response {
    Choice(String),
    NoAnswer,
    MarkedForLater,
}

impl Response {
    fn label(&self) -> &str {
        match self {
            Response::Choice(s) => s,
            Response::NoAnswer => NO_ANSWER,
            Response::MarkedForLater => MARKED_FOR_LATER,
        }
    }
}

#[derive(Debug, Clone)]
struct AnswerRecord {
    question: Question,
    response: Response,
    // Marked records are shown in the breakdown but excluded from scoring
    // (unless the review pass is the scoring pass, see App::review_scored).
    marked: bool,
}

impl AnswerRecord {
    fn is_correct(&self) -> bool {
        matches!(&self.response, Response::Choice(c) if *c == self.question.correct_answer)
    }
}

// ---------------- Sampler ----------------
// Fisher–Yates over a copy of the bank, truncated to k. The random source is
// a parameter so sampling stays reproducible under a seeded rng.
fn sample_questions<R: Rng>(bank: &[Question], k: usize, rng: &mut R) -> Vec<Question> {
    let mut pool: Vec<Question> = bank.to_vec();
    for i in (1..pool.len()).rev() {
        let j = rng.gen_range(0..=i);
        pool.swap(i, j);
    }
    pool.truncate(k.min(bank.len()));
    pool
}

// ---------------- Timer ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TimerKind {
    Tick,
    Reveal,
}

/// A scheduled deadline tied to the generation counter that was live when it
/// was armed. A firing whose generation no longer matches is stale (its
/// question has moved on) and must be ignored.
#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    generation: u64,
    kind: TimerKind,
    deadline: Instant,
}

// ---------------- Session state ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Start,
    Active,
    Results,
}

struct App {
    bank: Vec<Question>,
    session_size: usize,
    seconds_per_question: u16,

    screen: Screen,
    session: Vec<Question>,
    current: usize,
    selected: Option<usize>,
    time_left: u16,
    revealing: bool,
    ledger: Vec<AnswerRecord>,
    marked: HashSet<usize>,
    review_mode: bool,
    // Set when the primary pass scored nothing (every question was marked);
    // the review pass then scores normally instead of being a second look.
    review_scored: bool,
    show_details: bool,
    details_scroll: u16,

    pending: Option<PendingTimer>,
    generation: u64,

    theme: Theme,
    rng: StdRng,
}

impl App {
    fn new(bank: Vec<Question>, config: &QuizConfig, theme: Theme, rng: StdRng) -> Self {
        Self {
            bank,
            session_size: config.session_size,
            seconds_per_question: config.seconds_per_question,
            screen: Screen::Start,
            session: Vec::new(),
            current: 0,
            selected: None,
            time_left: config.seconds_per_question,
            revealing: false,
            ledger: Vec::new(),
            marked: HashSet::new(),
            review_mode: false,
            review_scored: false,
            show_details: false,
            details_scroll: 0,
            pending: None,
            generation: 0,
            theme,
            rng,
        }
    }

    fn current_question(&self) -> &Question {
        &self.session[self.current]
    }

    // -- timers --

    fn schedule(&mut self, kind: TimerKind, delay: Duration, now: Instant) {
        self.generation += 1;
        self.pending = Some(PendingTimer {
            generation: self.generation,
            kind,
            deadline: now + delay,
        });
    }

    fn cancel_timers(&mut self) {
        self.generation += 1;
        self.pending = None;
    }

    fn due_timer(&self, now: Instant) -> Option<PendingTimer> {
        self.pending.filter(|t| now >= t.deadline)
    }

    fn fire_timer(&mut self, timer: PendingTimer, now: Instant) {
        if timer.generation != self.generation {
            return; // stale
        }
        self.pending = None;
        match timer.kind {
            TimerKind::Tick => self.on_tick(now),
            TimerKind::Reveal => {
                self.revealing = false;
                self.advance(now);
            }
        }
    }

    fn on_tick(&mut self, now: Instant) {
        if self.screen != Screen::Active || self.revealing {
            return;
        }
        self.time_left = self.time_left.saturating_sub(1);
        if self.time_left == 0 {
            self.revealing = true;
            self.schedule(TimerKind::Reveal, REVEAL_HOLD, now);
        } else {
            self.schedule(TimerKind::Tick, TICK, now);
        }
    }

    fn reset_question_clock(&mut self, now: Instant) {
        self.time_left = self.seconds_per_question;
        self.revealing = false;
        self.schedule(TimerKind::Tick, TICK, now);
    }

    // -- intents --

    fn start_session(&mut self, now: Instant) {
        self.session = sample_questions(&self.bank, self.session_size, &mut self.rng);
        self.current = 0;
        self.selected = None;
        self.ledger.clear();
        self.marked.clear();
        self.review_mode = false;
        self.review_scored = false;
        self.show_details = false;
        self.details_scroll = 0;
        self.screen = Screen::Active;
        self.reset_question_clock(now);
    }

    fn select_option(&mut self, idx: usize) {
        if self.screen != Screen::Active || self.revealing {
            return;
        }
        if idx < self.current_question().options.len() {
            self.selected = Some(idx);
        }
    }

    fn move_selection(&mut self, delta: i32) {
        if self.screen != Screen::Active || self.revealing {
            return;
        }
        let len = self.current_question().options.len() as i32;
        let next = match self.selected {
            Some(i) => (i as i32 + delta).rem_euclid(len),
            None if delta >= 0 => 0,
            None => len - 1,
        };
        self.selected = Some(next as usize);
    }

    fn submit_answer(&mut self, now: Instant) {
        if self.screen != Screen::Active {
            return;
        }
        if self.revealing {
            // skip the rest of the reveal hold
            self.revealing = false;
            self.advance(now);
            return;
        }
        if self.selected.is_some() {
            self.advance(now);
        }
    }

    fn toggle_mark(&mut self, now: Instant) {
        if self.screen != Screen::Active || self.revealing || self.review_mode {
            return;
        }
        if self.marked.remove(&self.current) {
            // unmarking also withdraws the provisional record
            let id = self.current_question().id;
            self.ledger
                .retain(|r| !(r.question.id == id && r.response == Response::MarkedForLater));
            return;
        }
        self.marked.insert(self.current);
        self.ledger.push(AnswerRecord {
            question: self.current_question().clone(),
            response: Response::MarkedForLater,
            marked: true,
        });
        self.selected = None;
        match self.next_unanswered(self.current) {
            Some(i) => {
                self.current = i;
                self.reset_question_clock(now);
            }
            None => self.start_review_pass(now),
        }
    }

    // -- transitions --

    fn advance(&mut self, now: Instant) {
        let question = self.current_question().clone();
        let response = match self.selected.take() {
            Some(i) => Response::Choice(question.options[i].clone()),
            None => Response::NoAnswer,
        };
        let marked = if self.review_mode {
            !self.review_scored
        } else {
            self.marked.contains(&self.current)
        };
        self.ledger.push(AnswerRecord {
            question,
            response,
            marked,
        });
        if self.current + 1 < self.session.len() {
            self.current += 1;
            self.reset_question_clock(now);
        } else {
            self.end_of_set(now);
        }
    }

    /// Smallest open index after `from`, wrapping to the front: not marked
    /// and no ledger record for its question yet.
    fn next_unanswered(&self, from: usize) -> Option<usize> {
        let n = self.session.len();
        let answered =
            |i: usize| self.ledger.iter().any(|r| r.question.id == self.session[i].id);
        (from + 1..n)
            .chain(0..from)
            .find(|&i| !self.marked.contains(&i) && !answered(i))
    }

    fn end_of_set(&mut self, now: Instant) {
        let has_marked = self
            .ledger
            .iter()
            .any(|r| r.response == Response::MarkedForLater);
        if has_marked && !self.review_mode {
            self.start_review_pass(now);
        } else {
            self.finish();
        }
    }

    /// Replace the session with the marked questions (in ledger order) and
    /// keep only the scored records. Provisional marked records are consumed
    /// here and never reach final scoring.
    fn start_review_pass(&mut self, now: Instant) {
        let (marked, scored): (Vec<AnswerRecord>, Vec<AnswerRecord>) = self
            .ledger
            .drain(..)
            .partition(|r| r.response == Response::MarkedForLater);
        assert!(!marked.is_empty(), "review pass requires marked questions");
        self.review_scored = scored.is_empty();
        self.session = marked.into_iter().map(|r| r.question).collect();
        self.ledger = scored;
        self.marked.clear();
        self.current = 0;
        self.selected = None;
        self.review_mode = true;
        self.show_details = false;
        self.reset_question_clock(now);
    }

    fn finish(&mut self) {
        self.cancel_timers();
        self.revealing = false;
        self.show_details = false;
        self.details_scroll = 0;
        self.screen = Screen::Results;
    }
}

// ---------------- Scorer ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Top,
    Mid,
    Low,
}

impl Tier {
    fn from_ratio(p: f64) -> Self {
        if p >= 0.8 {
            Tier::Top
        } else if p >= 0.6 {
            Tier::Mid
        } else {
            Tier::Low
        }
    }

    fn message(&self) -> &'static str {
        match self {
            Tier::Top => "Outstanding performance!",
            Tier::Mid => "Good job, keep improving!",
            Tier::Low => "Keep practicing, you'll get better!",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            Tier::Top => "🎉",
            Tier::Mid => "👍",
            Tier::Low => "💪",
        }
    }

    fn color(&self, th: &Theme) -> Color {
        match self {
            Tier::Top => th.good,
            Tier::Mid => th.warn,
            Tier::Low => th.bad,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScoreSummary {
    correct: usize,
    incorrect: usize,
    marked: usize,
    denominator: usize,
}

impl ScoreSummary {
    fn ratio(&self) -> f64 {
        if self.denominator == 0 {
            return 0.0;
        }
        self.correct as f64 / self.denominator as f64
    }

    fn tier(&self) -> Tier {
        Tier::from_ratio(self.ratio())
    }
}

fn score_session(ledger: &[AnswerRecord]) -> ScoreSummary {
    let mut summary = ScoreSummary {
        correct: 0,
        incorrect: 0,
        marked: 0,
        denominator: 0,
    };
    for r in ledger {
        if r.marked {
            summary.marked += 1;
        } else if r.is_correct() {
            summary.correct += 1;
        } else {
            summary.incorrect += 1;
        }
    }
    summary.denominator = summary.correct + summary.incorrect;
    summary
}

// ---------------- View ----------------
fn ui(f: &mut Frame, app: &mut App) {
    match app.screen {
        Screen::Start => draw_start(f, app),
        Screen::Active => draw_active(f, app),
        Screen::Results => draw_results(f, app),
    }
}

fn draw_start(f: &mut Frame, app: &App) {
    let th = app.theme;
    let area = centered_rect(70, 70, f.area());
    let block = Block::default()
        .title(Span::styled(
            " Sentence Master ",
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            "Test your language skills by completing sentences",
            Style::default().fg(th.fg),
        )),
        Line::from(Span::styled(
            "with the correct words.",
            Style::default().fg(th.fg),
        )),
        Line::from(""),
        Line::from(Span::styled("How to play", Style::default().fg(th.accent))),
        Line::from(Span::styled(
            format!("complete {} sentences by filling in the blanks", app.session_size),
            Style::default().fg(th.fg),
        )),
        Line::from(Span::styled(
            "choose from 4 options for each blank",
            Style::default().fg(th.fg),
        )),
        Line::from(Span::styled(
            format!("you have {} seconds per question", app.seconds_per_question),
            Style::default().fg(th.fg),
        )),
        Line::from(Span::styled(
            "mark questions with m to revisit them at the end",
            Style::default().fg(th.fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            "Enter  start · q  quit",
            Style::default().fg(th.muted),
        )),
    ];
    let para = Paragraph::new(lines)
        .block(block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });
    f.render_widget(para, area);
}

fn draw_active(f: &mut Frame, app: &App) {
    let th = app.theme;
    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(5),
            Constraint::Length(6),
            Constraint::Length(1),
        ])
        .split(f.area());

    // header
    let mut head = vec![Span::styled(
        format!(" Question {}/{}", app.current + 1, app.session.len()),
        Style::default().fg(th.fg),
    )];
    if app.review_mode {
        head.push(Span::styled("  ·  review pass", Style::default().fg(th.warn)));
    }
    if app.marked.contains(&app.current) {
        head.push(Span::styled("  ·  marked", Style::default().fg(th.warn)));
    }
    f.render_widget(Paragraph::new(Line::from(head)), v[0]);

    // countdown
    let ratio = f64::from(app.time_left) / f64::from(app.seconds_per_question);
    let clock_color = if app.time_left <= 10 { th.warn } else { th.info };
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(clock_color).bg(th.bar_bg))
        .ratio(ratio.clamp(0.0, 1.0))
        .label(format!("{}s", app.time_left));
    f.render_widget(gauge, v[1]);

    // question card
    let q = app.current_question();
    let (fill, fill_style) = if app.revealing {
        (
            q.correct_answer.clone(),
            Style::default().fg(th.good).add_modifier(Modifier::BOLD),
        )
    } else if let Some(i) = app.selected {
        (
            q.options[i].clone(),
            Style::default().fg(th.info).add_modifier(Modifier::BOLD),
        )
    } else {
        (String::new(), Style::default().fg(th.muted))
    };
    let width = blank_width(q);
    let slot = if fill.is_empty() {
        "_".repeat(width)
    } else {
        pad_to_width(&fill, width)
    };
    let (before, after) = split_sentence(&q.sentence);
    let mut card = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(before.to_string(), Style::default().fg(th.fg)),
            Span::styled(format!("[{}]", slot), fill_style),
            Span::styled(after.to_string(), Style::default().fg(th.fg)),
        ]),
    ];
    if app.revealing {
        card.push(Line::from(""));
        card.push(Line::from(Span::styled(
            "Time's up! The correct answer is shown.",
            Style::default().fg(th.warn),
        )));
    }
    let card_block = Block::default()
        .title(Span::styled(
            " Complete the sentence ",
            Style::default().fg(th.accent),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    f.render_widget(
        Paragraph::new(card).block(card_block).wrap(Wrap { trim: false }),
        v[2],
    );

    // options
    let mut opts = Vec::new();
    for (i, opt) in q.options.iter().enumerate() {
        let style = if app.revealing && *opt == q.correct_answer {
            Style::default().fg(th.good).add_modifier(Modifier::BOLD)
        } else if app.selected == Some(i) {
            Style::default()
                .fg(th.info)
                .bg(th.selection_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(th.fg)
        };
        opts.push(Line::from(Span::styled(format!(" {}. {}", i + 1, opt), style)));
    }
    let opts_block = Block::default()
        .title(Span::styled(" Options ", Style::default().fg(th.accent)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    f.render_widget(Paragraph::new(opts).block(opts_block), v[3]);

    // footer
    let advance = if app.current + 1 == app.session.len() {
        "finish"
    } else {
        "next"
    };
    let footer = format!(" 1-4/↑↓  choose · Enter  {advance} · m  mark · q  quit");
    f.render_widget(
        Paragraph::new(Line::from(Span::styled(footer, Style::default().fg(th.muted)))),
        v[4],
    );
}

fn draw_results(f: &mut Frame, app: &mut App) {
    let th = app.theme;
    let summary = score_session(&app.ledger);
    let tier = summary.tier();
    let title = if app.review_mode {
        " Review Complete! "
    } else {
        " Quiz Complete! "
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            format!("{} / {}", summary.correct, summary.denominator),
            Style::default()
                .fg(tier.color(&th))
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} {}", tier.emoji(), tier.message()),
            Style::default().fg(th.fg),
        )),
        Line::from(""),
        Line::from(Span::styled(
            format!(
                "Correct {} · Incorrect {} · Marked {}",
                summary.correct, summary.incorrect, summary.marked
            ),
            Style::default().fg(th.muted),
        )),
    ];
    if summary.marked > 0 {
        lines.push(Line::from(Span::styled(
            format!(
                "{} marked question{} revisited in the review pass, not scored",
                summary.marked,
                if summary.marked == 1 { "" } else { "s" }
            ),
            Style::default().fg(th.warn),
        )));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "d  details · r  new quiz · q  quit",
        Style::default().fg(th.muted),
    )));

    let headline_block = Block::default()
        .title(Span::styled(
            title,
            Style::default().fg(th.accent).add_modifier(Modifier::BOLD),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let headline = Paragraph::new(lines.clone())
        .block(headline_block)
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: false });

    if !app.show_details {
        f.render_widget(headline, centered_rect(70, 60, f.area()));
        return;
    }

    let v = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(lines.len() as u16 + 2), Constraint::Min(3)])
        .split(f.area());
    f.render_widget(headline, v[0]);

    let detail = results_detail_lines(app, &th);
    let max_scroll = detail.len().saturating_sub(1) as u16;
    if app.details_scroll > max_scroll {
        app.details_scroll = max_scroll;
    }
    let detail_block = Block::default()
        .title(Span::styled(
            " Breakdown  [j/k scroll] ",
            Style::default().fg(th.accent),
        ))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(th.muted));
    let para = Paragraph::new(detail)
        .block(detail_block)
        .wrap(Wrap { trim: false })
        .scroll((app.details_scroll, 0));
    f.render_widget(para, v[1]);
}

fn results_detail_lines(app: &App, th: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (i, r) in app.ledger.iter().enumerate() {
        let (status, color) = if r.is_correct() {
            ("Correct", th.good)
        } else if r.response == Response::NoAnswer {
            ("Skipped", th.muted)
        } else if r.response == Response::MarkedForLater {
            ("Marked", th.warn)
        } else {
            ("Incorrect", th.bad)
        };
        let mut head = vec![
            Span::styled(format!("Q{}  ", i + 1), Style::default().fg(th.muted)),
            Span::styled(status, Style::default().fg(color).add_modifier(Modifier::BOLD)),
        ];
        if r.marked && r.response != Response::MarkedForLater {
            head.push(Span::styled("  [marked]", Style::default().fg(th.warn)));
        }
        lines.push(Line::from(head));
        let (before, after) = split_sentence(&r.question.sentence);
        lines.push(Line::from(vec![
            Span::styled(format!("  {}", before), Style::default().fg(th.fg)),
            Span::styled(format!("[{}]", r.response.label()), Style::default().fg(color)),
            Span::styled(after.to_string(), Style::default().fg(th.fg)),
        ]));
        if !r.is_correct() {
            lines.push(Line::from(Span::styled(
                format!("  correct answer: {}", r.question.correct_answer),
                Style::default().fg(th.good),
            )));
        }
        lines.push(Line::from(""));
    }
    lines
}

fn split_sentence(sentence: &str) -> (&str, &str) {
    sentence.split_once(PLACEHOLDER).unwrap_or((sentence, ""))
}

// Width of the blank slot: the widest option, so the card does not jump
// around as selections change.
fn blank_width(q: &Question) -> usize {
    q.options
        .iter()
        .map(|o| UnicodeWidthStr::width(o.as_str()))
        .max()
        .unwrap_or(6)
        .max(6)
}

fn pad_to_width(text: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(text);
    if w >= width {
        return text.to_string();
    }
    let pad = width - w;
    let left = pad / 2;
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(pad - left))
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);
    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vert[1]);
    horiz[1]
}

// ---------------- Theme ----------------
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ThemeKind {
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy)]
struct Theme {
    fg: Color,
    muted: Color,
    accent: Color,
    bar_bg: Color,
    selection_bg: Color,
    good: Color,
    warn: Color,
    info: Color,
    bad: Color,
}

fn theme_of(kind: ThemeKind) -> Theme {
    match kind {
        ThemeKind::Dark => Theme {
            fg: Color::Rgb(220, 220, 220),
            muted: Color::Rgb(140, 140, 140),
            accent: Color::Rgb(95, 175, 255),
            bar_bg: Color::Rgb(35, 40, 46),
            selection_bg: Color::Rgb(60, 65, 72),
            good: Color::Rgb(130, 200, 120),
            warn: Color::Rgb(255, 200, 110),
            info: Color::Rgb(120, 170, 255),
            bad: Color::Rgb(235, 110, 120),
        },
        ThemeKind::Light => Theme {
            fg: Color::Rgb(30, 30, 30),
            muted: Color::Rgb(120, 120, 120),
            accent: Color::Rgb(0, 122, 255),
            bar_bg: Color::Rgb(235, 240, 245),
            selection_bg: Color::Rgb(210, 220, 235),
            good: Color::Rgb(38, 166, 91),
            warn: Color::Rgb(255, 160, 0),
            info: Color::Rgb(0, 122, 255),
            bad: Color::Rgb(200, 50, 70),
        },
    }
}

// ---------------- Event loop ----------------
fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let bank = load_bank(cli.file.as_deref())?;
    let theme = theme_of(cli.theme.or(config.theme).unwrap_or(ThemeKind::Dark));
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut app = App::new(bank, &config, theme, rng);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    res
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(k) = event::read()? {
                if handle_key(app, k, Instant::now()) {
                    return Ok(());
                }
            }
        }
        let now = Instant::now();
        if let Some(timer) = app.due_timer(now) {
            app.fire_timer(timer, now);
        }
    }
}

fn handle_key(app: &mut App, key: KeyEvent, now: Instant) -> bool {
    let KeyEvent { code, .. } = key;
    match app.screen {
        Screen::Start => match code {
            KeyCode::Enter | KeyCode::Char('s') => app.start_session(now),
            KeyCode::Char('q') | KeyCode::Esc => return true,
            _ => {}
        },
        Screen::Active => match code {
            KeyCode::Char(c) if ('1'..='4').contains(&c) => {
                app.select_option((c as u8 - b'1') as usize)
            }
            KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
            KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
            KeyCode::Enter | KeyCode::Char(' ') => app.submit_answer(now),
            KeyCode::Char('m') => app.toggle_mark(now),
            KeyCode::Char('q') | KeyCode::Esc => return true,
            _ => {}
        },
        Screen::Results => match code {
            KeyCode::Char('d') => {
                app.show_details = !app.show_details;
                app.details_scroll = 0;
            }
            KeyCode::Down | KeyCode::Char('j') if app.show_details => {
                app.details_scroll = app.details_scroll.saturating_add(1);
            }
            KeyCode::Up | KeyCode::Char('k') if app.show_details => {
                app.details_scroll = app.details_scroll.saturating_sub(1);
            }
            KeyCode::Char('r') | KeyCode::Enter => app.start_session(now),
            KeyCode::Char('q') | KeyCode::Esc => return true,
            _ => {}
        },
    }
    false
}
