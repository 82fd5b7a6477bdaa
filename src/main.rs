mod app;
mod cli;
mod config;
mod datasources;
mod db;
mod error;
mod logic;
mod models;
mod ui;

use anyhow::{bail, Context};
use app::{App, Screen};
use clap::Parser;
use cli::{Cli, Commands, HistoryArgs, PredictArgs};
use config::Config;
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use datasources::{OpenWeatherMapClient, PredictionClient};
use db::Database;
use error::CropCastError;
use logic::calculations::format_thousands;
use logic::history::DEFAULT_CAPACITY;
use logic::{
    detect_anomalies, export, generate_recommendations, AnomalyDetector, Collaborators, HistoryLog,
    RulesEngine, ServiceEvent,
};
use models::{
    Anomaly, ChatMessage, HistoryLocation, PredictionForm, PredictionInput, PredictionResult,
    Recommendation, WeatherSnapshot, YIELD_UNIT,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_subscriber::EnvFilter;
use ui::screens::{
    ChatScreen, FormScreen, HistoryScreen, InsightsScreen, LocationScreen, ResultsScreen,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    match &cli.command {
        Some(Commands::Init) => {
            init_logging(cli.verbose, None)?;
            let (_, path) = Config::setup_interactive()?;
            println!("Run `cropcast check` to test the connections in {}", path.display());
            Ok(())
        }
        Some(Commands::Check) => {
            init_logging(cli.verbose, None)?;
            run_check(&cli).await
        }
        Some(Commands::Predict(args)) => {
            init_logging(cli.verbose, None)?;
            run_predict(&cli, args).await
        }
        Some(Commands::History(args)) => {
            init_logging(cli.verbose, None)?;
            run_history(&cli, args)
        }
        None => {
            let log_path = Config::log_path(cli.data_dir.as_ref())?;
            init_logging(cli.verbose, Some(&log_path))?;
            run_tui(&cli).await
        }
    }
}

/// Logs go to `log_file` when given so they do not draw over the TUI.
fn init_logging(verbose: u8, log_file: Option<&Path>) -> anyhow::Result<()> {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match log_file {
        Some(path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Cannot open log file {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(std::sync::Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
        }
    }
    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone()).context("Configuration error")
    } else {
        let (config, _) = Config::setup_interactive()?;
        Ok(config)
    }
}

async fn run_check(cli: &Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.clone()).context("Configuration error")?;
    println!("Configuration: OK");

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    println!(
        "Database: OK ({} predictions in {})",
        db.count_history()?,
        db.path().display()
    );

    let checks = AnomalyDetector::new().list_checks();
    println!("Anomaly checks: {}", checks.join(", "));

    let rules = RulesEngine::new().list_rules();
    println!("Recommendation rules: {}", rules.len());
    for (id, name) in rules {
        println!("  {:<26} {}", id, name);
    }

    let (collaborators, _events) = Collaborators::new(&config)?;
    let status = collaborators.check_connections().await;
    println!("{}", status.summary());

    if !status.predictor {
        bail!("Prediction service at {} is unreachable", config.predictor.url);
    }
    Ok(())
}

async fn run_predict(cli: &Cli, args: &PredictArgs) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let form = PredictionForm {
        year: args.year.clone(),
        rainfall: args.rainfall.clone(),
        pesticides: args.pesticides.clone(),
        avg_temp: args.avg_temp.clone(),
        country: args.country.clone(),
        item: args.item.clone(),
    };
    let input = form.validate().map_err(CropCastError::from)?;

    let (weather, location) = if args.live_weather {
        let owm = config
            .weather()
            .context("--live-weather needs an enabled openweathermap section in the config")?;
        let client = OpenWeatherMapClient::new(owm.clone());
        let location = client.configured_location().await;
        let weather = client
            .current_weather(location.latitude, location.longitude)
            .await
            .context("Failed to fetch current weather")?;
        (Some(weather), Some(location))
    } else if let Some(humidity) = args.humidity {
        let weather = WeatherSnapshot::new(
            args.weather_temp.unwrap_or(input.avg_temp),
            humidity,
            args.weather_rain.unwrap_or(0.0),
        );
        (Some(weather), None)
    } else {
        (None, None)
    };

    let predictor = PredictionClient::new(config.predictor.clone())?;
    let result = predictor
        .predict(&input)
        .await
        .context("Prediction failed")?;

    let anomalies = detect_anomalies(&input, &result);
    let recommendations = generate_recommendations(&input, &result, weather.as_ref());
    print_prediction(&input, &result, weather.as_ref(), &anomalies, &recommendations);

    if !args.no_history {
        let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
        let mut history = HistoryLog::open(db, config.history.capacity)?;
        let location = location.map(|l| HistoryLocation {
            name: l.name,
            country: l.country,
        });
        let record = history.record(input, result, location)?;
        println!();
        println!("Saved to history as {}", record.id);
    }

    Ok(())
}

fn print_prediction(
    input: &PredictionInput,
    result: &PredictionResult,
    weather: Option<&WeatherSnapshot>,
    anomalies: &[Anomaly],
    recommendations: &[Recommendation],
) {
    println!(
        "{} in {}, {}: {} {} ({}% confidence)",
        input.item,
        input.country,
        input.year,
        format_thousands(result.yield_value),
        YIELD_UNIT,
        result.confidence
    );
    println!(
        "Factors: rainfall {}, temperature {}, pesticides {}",
        result.factors.rainfall, result.factors.temperature, result.factors.pesticides
    );
    if let Some(w) = weather {
        println!(
            "Weather: {:.0}°C, {}% humidity, {} mm rain (1h)",
            w.temperature, w.humidity, w.rainfall
        );
    }

    println!();
    if anomalies.is_empty() {
        println!("All Systems Normal: no anomalies detected.");
    }
    for anomaly in anomalies {
        println!(
            "[{}] {}: {}",
            anomaly.severity.as_str().to_uppercase(),
            anomaly.title,
            anomaly.description
        );
        for reason in &anomaly.reasons {
            println!("    cause: {}", reason);
        }
        for suggestion in &anomaly.suggestions {
            println!("    try:   {}", suggestion);
        }
    }

    println!();
    if recommendations.is_empty() {
        println!("No specific recommendations at this time. Your current conditions look optimal!");
    }
    for rec in recommendations {
        println!(
            "{} [{} / {}] {}",
            rec.priority.symbol(),
            rec.category,
            rec.priority,
            rec.title
        );
        println!("    {}", rec.description);
    }
}

fn run_history(cli: &Cli, args: &HistoryArgs) -> anyhow::Result<()> {
    let capacity = if Config::exists(cli.config.as_ref()) {
        Config::load(cli.config.clone())
            .context("Configuration error")?
            .history
            .capacity
    } else {
        DEFAULT_CAPACITY
    };

    let db = Database::open(&Config::db_path(cli.data_dir.as_ref())?)?;
    let mut history = HistoryLog::open(db, capacity)?;

    let mut acted = false;
    if let Some(path) = &args.export_csv {
        export::write_csv(history.records(), path)?;
        println!("Exported {} predictions to {}", history.len(), path.display());
        acted = true;
    }
    if let Some(path) = &args.export_html {
        export::write_html(history.records(), path)?;
        println!("Wrote report for {} predictions to {}", history.len(), path.display());
        acted = true;
    }
    if let Some(id) = &args.delete {
        history.delete(id)?;
        println!("Deleted {}", id);
        acted = true;
    }
    if args.clear {
        history.clear()?;
        println!("History cleared");
        acted = true;
    }
    if acted {
        return Ok(());
    }

    if history.is_empty() {
        println!("No prediction history available.");
        return Ok(());
    }

    for record in history.records() {
        println!(
            "{}  {}  {:<22} {:<20} {:>4}  {:>12} kg/ha  {:>3}%  {}",
            record.id,
            record
                .timestamp
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M"),
            record.input.item,
            record.input.country,
            record.input.year,
            format_thousands(record.prediction.yield_value),
            record.prediction.confidence,
            record.location_label()
        );
    }
    Ok(())
}

async fn run_tui(cli: &Cli) -> anyhow::Result<()> {
    let config = load_config(cli)?;

    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;
    let db = Database::open(&Config::db_path(Some(&data_dir))?)?;

    let (collaborators, mut events) = Collaborators::new(&config)?;
    let mut app = App::new(config, db, data_dir)?;

    let status = collaborators.check_connections().await;
    app.set_status(&status.summary());
    let ticket = app.begin_weather(None);
    collaborators.request_configured_location(ticket);

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the main loop
    let result = run_app(&mut terminal, &mut app, &collaborators, &mut events).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    collaborators: &Collaborators,
    events: &mut UnboundedReceiver<ServiceEvent>,
) -> anyhow::Result<()> {
    loop {
        terminal.draw(|f| {
            let area = f.area();
            let status = app.status_message.as_deref();

            match app.screen {
                Screen::Form => {
                    let screen = FormScreen::new(&app.form_state)
                        .predicting(app.is_predicting())
                        .with_status(status);
                    f.render_widget(screen, area);
                }
                Screen::Results => {
                    let trend = app.trend();
                    let screen =
                        ResultsScreen::new(app.input.as_ref(), app.prediction.as_ref(), &trend)
                            .with_weather(app.weather.as_ref())
                            .with_status(status);
                    f.render_widget(screen, area);
                }
                Screen::Insights => {
                    let screen = InsightsScreen::new(&app.anomalies, &app.recommendations)
                        .has_prediction(app.prediction.is_some())
                        .with_selection(app.insights_state.selected_index)
                        .with_status(status);
                    f.render_widget(screen, area);
                }
                Screen::History => {
                    let screen = HistoryScreen::new(app.history.records(), app.history.capacity())
                        .with_selection(app.history_state.selected_index)
                        .with_status(status);
                    f.render_widget(screen, area);
                }
                Screen::Chat => {
                    let screen = ChatScreen::new(&app.chat, &app.chat_state.input_buffer)
                        .editing(app.chat_state.editing)
                        .enabled(collaborators.chat_enabled())
                        .with_status(status);
                    f.render_widget(screen, area);
                }
                Screen::Location => {
                    let screen = LocationScreen::new(&app.location_state)
                        .current(app.location.as_ref(), app.weather.as_ref())
                        .weather_enabled(collaborators.weather_enabled())
                        .with_status(status);
                    f.render_widget(screen, area);
                }
            }
        })?;

        // Handle input with timeout so background results get drawn
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    handle_key(app, collaborators, key);
                }
            }
        }

        while let Ok(event) = events.try_recv() {
            apply_service_event(app, event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn apply_service_event(app: &mut App, event: ServiceEvent) {
    match event {
        ServiceEvent::Prediction {
            ticket,
            input,
            outcome,
        } => {
            app.finish_prediction(ticket, input, outcome);
        }
        ServiceEvent::ChatReply(outcome) => app.finish_chat(outcome),
        ServiceEvent::LocationResolved { ticket, location } => {
            app.resolve_location(ticket, location);
        }
        ServiceEvent::Weather {
            ticket,
            location,
            outcome,
        } => {
            app.finish_weather(ticket, location, outcome);
        }
        ServiceEvent::SearchResults(outcome) => app.finish_search(outcome),
    }
}

fn handle_key(app: &mut App, collaborators: &Collaborators, key: KeyEvent) {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.quit();
        return;
    }

    if app.is_editing() {
        handle_screen_input(app, collaborators, key.code);
        return;
    }

    // Global key handling
    match key.code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => app.switch_screen(Screen::Form),
        KeyCode::Char(c) => {
            if let Some(screen) = Screen::from_key(c) {
                app.switch_screen(screen);
            } else {
                handle_screen_input(app, collaborators, key.code);
            }
        }
        _ => handle_screen_input(app, collaborators, key.code),
    }
}

fn handle_screen_input(app: &mut App, collaborators: &Collaborators, code: KeyCode) {
    match app.screen {
        Screen::Form => handle_form_input(app, collaborators, code),
        Screen::Results => handle_results_input(app, code),
        Screen::Insights => handle_insights_input(app, code),
        Screen::History => handle_history_input(app, code),
        Screen::Chat => handle_chat_input(app, collaborators, code),
        Screen::Location => handle_location_input(app, collaborators, code),
    }
}

fn handle_form_input(app: &mut App, collaborators: &Collaborators, code: KeyCode) {
    let state = &mut app.form_state;

    if state.editing {
        match code {
            KeyCode::Esc => state.cancel_editing(),
            KeyCode::Enter => state.finish_editing(),
            KeyCode::Tab => {
                state.finish_editing();
                state.next_field();
            }
            KeyCode::Backspace => {
                state.edit_buffer.pop();
            }
            KeyCode::Char(c) => state.edit_buffer.push(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Up | KeyCode::BackTab => state.prev_field(),
        KeyCode::Down | KeyCode::Tab => state.next_field(),
        KeyCode::Left => state.cycle_option(false),
        KeyCode::Right => state.cycle_option(true),
        KeyCode::Enter => state.start_editing(),
        KeyCode::Char('p') => {
            if let Some((ticket, input)) = app.begin_prediction() {
                collaborators.request_prediction(ticket, input);
            }
        }
        KeyCode::Char('n') => app.reset_prediction(),
        _ => {}
    }
}

fn handle_results_input(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('n') => app.reset_prediction(),
        KeyCode::Char('e') => app.switch_screen(Screen::Form),
        _ => {}
    }
}

fn handle_insights_input(app: &mut App, code: KeyCode) {
    let count = app.recommendations.len();
    match code {
        KeyCode::Up => app.insights_state.prev(),
        KeyCode::Down => app.insights_state.next(count),
        _ => {}
    }
}

fn handle_history_input(app: &mut App, code: KeyCode) {
    let count = app.history.len();
    match code {
        KeyCode::Up => app.history_state.prev(),
        KeyCode::Down => app.history_state.next(count),
        KeyCode::Enter => app.view_selected_history(),
        KeyCode::Char('d') => app.delete_selected_history(),
        KeyCode::Char('c') => app.clear_history(),
        KeyCode::Char('e') => match app.export_history_csv() {
            Ok(path) => app.set_status(&format!("Exported CSV to {}", path.display())),
            Err(e) => app.set_status(&format!("Export failed: {}", e)),
        },
        KeyCode::Char('h') => match app.export_history_html() {
            Ok(path) => app.set_status(&format!("Wrote report to {}", path.display())),
            Err(e) => app.set_status(&format!("Export failed: {}", e)),
        },
        _ => {}
    }
}

fn handle_chat_input(app: &mut App, collaborators: &Collaborators, code: KeyCode) {
    if let KeyCode::F(n) = code {
        if (1..=3).contains(&n) {
            let index = usize::from(n - 1);
            send_chat(app, collaborators, |app| app.send_quick_prompt(index));
        }
        return;
    }

    if app.chat_state.editing {
        match code {
            KeyCode::Esc => app.chat_state.editing = false,
            KeyCode::Enter => send_chat(app, collaborators, App::send_chat_input),
            KeyCode::Backspace => {
                app.chat_state.input_buffer.pop();
            }
            KeyCode::Char(c) => app.chat_state.input_buffer.push(c),
            _ => {}
        }
        return;
    }

    if let KeyCode::Char('i') | KeyCode::Enter = code {
        app.chat_state.editing = true;
    }
}

fn send_chat<F>(app: &mut App, collaborators: &Collaborators, queue: F)
where
    F: FnOnce(&mut App) -> Option<(String, Vec<ChatMessage>)>,
{
    if !collaborators.chat_enabled() {
        app.set_status("Chat assistant is disabled in config");
        return;
    }
    if let Some((message, context)) = queue(app) {
        collaborators.request_chat(message, context);
    }
}

fn handle_location_input(app: &mut App, collaborators: &Collaborators, code: KeyCode) {
    if app.location_state.editing {
        match code {
            KeyCode::Esc => app.location_state.editing = false,
            KeyCode::Enter => {
                if let Some(query) = app.begin_search() {
                    if !collaborators.request_search(query) {
                        app.location_state.searching = false;
                        app.set_status("OpenWeatherMap is not configured");
                    }
                }
            }
            KeyCode::Backspace => {
                app.location_state.query.pop();
            }
            KeyCode::Char(c) => app.location_state.query.push(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('/') => app.location_state.editing = true,
        KeyCode::Up => app.location_state.prev(),
        KeyCode::Down => app.location_state.next(),
        KeyCode::Enter => {
            if let Some(location) = app.selected_search_result() {
                let ticket = app.begin_weather(Some(location.clone()));
                if !collaborators.request_weather(ticket, location) {
                    app.set_status("OpenWeatherMap is not configured");
                }
            }
        }
        KeyCode::Char('c') => {
            let ticket = app.begin_weather(None);
            if collaborators.request_configured_location(ticket) {
                app.set_status("Loading configured location...");
            } else {
                app.set_status("OpenWeatherMap is not configured");
            }
        }
        KeyCode::Char('r') => match app.location.clone() {
            Some(location) => {
                let ticket = app.begin_weather(None);
                if collaborators.request_weather(ticket, location) {
                    app.set_status("Refreshing weather...");
                } else {
                    app.set_status("OpenWeatherMap is not configured");
                }
            }
            None => app.set_status("Choose a location first"),
        },
        _ => {}
    }
}
