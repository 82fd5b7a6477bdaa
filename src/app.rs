use crate::config::Config;
use crate::db::Database;
use crate::error::{CropCastError, Result};
use crate::logic::calculations::{self, TrendPoint};
use crate::logic::{export, AnomalyDetector, HistoryLog, RulesEngine};
use crate::models::{
    catalog, Anomaly, ChatMessage, ChatSession, HistoryLocation, Location, PredictionForm,
    PredictionInput, PredictionResult, Recommendation, WeatherSnapshot, QUICK_PROMPTS,
};
use chrono::Local;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Form,
    Results,
    Insights,
    History,
    Chat,
    Location,
}

impl Screen {
    pub fn from_key(c: char) -> Option<Self> {
        match c {
            '1' => Some(Screen::Form),
            '2' => Some(Screen::Results),
            '3' => Some(Screen::Insights),
            '4' => Some(Screen::History),
            '5' => Some(Screen::Chat),
            '6' => Some(Screen::Location),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Year,
    Rainfall,
    Pesticides,
    AvgTemp,
    Country,
    Item,
}

impl FormField {
    pub fn all() -> &'static [FormField] {
        &[
            FormField::Year,
            FormField::Rainfall,
            FormField::Pesticides,
            FormField::AvgTemp,
            FormField::Country,
            FormField::Item,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            FormField::Year => "Year",
            FormField::Rainfall => "Average Rainfall (mm/year)",
            FormField::Pesticides => "Pesticides (tonnes)",
            FormField::AvgTemp => "Average Temperature (°C)",
            FormField::Country => "Country",
            FormField::Item => "Crop Type",
        }
    }

    pub fn placeholder(&self) -> &'static str {
        match self {
            FormField::Year => "e.g., 2024",
            FormField::Rainfall => "e.g., 1200",
            FormField::Pesticides => "e.g., 2.5",
            FormField::AvgTemp => "e.g., 25.5",
            FormField::Country => "Select country",
            FormField::Item => "Select crop",
        }
    }

    pub fn is_select(&self) -> bool {
        matches!(self, FormField::Country | FormField::Item)
    }

    pub fn next(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + 1) % all.len()]
    }

    pub fn prev(&self) -> Self {
        let all = Self::all();
        let idx = all.iter().position(|f| f == self).unwrap_or(0);
        all[(idx + all.len() - 1) % all.len()]
    }
}

pub struct FormState {
    pub focused_field: FormField,
    pub editing: bool,
    pub edit_buffer: String,
    pub year: String,
    pub rainfall: String,
    pub pesticides: String,
    pub avg_temp: String,
    pub country_index: Option<usize>,
    pub crop_index: Option<usize>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            focused_field: FormField::Year,
            editing: false,
            edit_buffer: String::new(),
            year: String::new(),
            rainfall: String::new(),
            pesticides: String::new(),
            avg_temp: String::new(),
            country_index: None,
            crop_index: None,
        }
    }

    pub fn next_field(&mut self) {
        self.focused_field = self.focused_field.next();
    }

    pub fn prev_field(&mut self) {
        self.focused_field = self.focused_field.prev();
    }

    pub fn text_value(&self, field: FormField) -> &str {
        match field {
            FormField::Year => &self.year,
            FormField::Rainfall => &self.rainfall,
            FormField::Pesticides => &self.pesticides,
            FormField::AvgTemp => &self.avg_temp,
            FormField::Country | FormField::Item => "",
        }
    }

    fn text_value_mut(&mut self, field: FormField) -> Option<&mut String> {
        match field {
            FormField::Year => Some(&mut self.year),
            FormField::Rainfall => Some(&mut self.rainfall),
            FormField::Pesticides => Some(&mut self.pesticides),
            FormField::AvgTemp => Some(&mut self.avg_temp),
            FormField::Country | FormField::Item => None,
        }
    }

    /// Select fields are changed with [`FormState::cycle_option`] instead.
    pub fn start_editing(&mut self) {
        if self.focused_field.is_select() {
            return;
        }
        self.edit_buffer = self.text_value(self.focused_field).to_string();
        self.editing = true;
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) {
        self.editing = false;
        let value = std::mem::take(&mut self.edit_buffer);
        if let Some(slot) = self.text_value_mut(self.focused_field) {
            *slot = value;
        }
    }

    pub fn cycle_option(&mut self, forward: bool) {
        let (slot, len) = match self.focused_field {
            FormField::Country => (&mut self.country_index, catalog::COUNTRIES.len()),
            FormField::Item => (&mut self.crop_index, catalog::CROP_ITEMS.len()),
            _ => return,
        };

        *slot = Some(match (*slot, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    pub fn to_form(&self) -> PredictionForm {
        let pick = |options: &[&str], index: Option<usize>| {
            index
                .and_then(|i| options.get(i))
                .map(|s| s.to_string())
                .unwrap_or_default()
        };

        PredictionForm {
            year: self.year.clone(),
            rainfall: self.rainfall.clone(),
            pesticides: self.pesticides.clone(),
            avg_temp: self.avg_temp.clone(),
            country: pick(catalog::COUNTRIES, self.country_index),
            item: pick(catalog::CROP_ITEMS, self.crop_index),
        }
    }

    /// Fill the form from an earlier input so it can be edited and resubmitted.
    pub fn load(&mut self, input: &PredictionInput) {
        let form = input.to_form();
        self.cancel_editing();
        self.year = form.year;
        self.rainfall = form.rainfall;
        self.pesticides = form.pesticides;
        self.avg_temp = form.avg_temp;
        self.country_index = catalog::country_index(&form.country);
        self.crop_index = catalog::crop_index(&form.item);
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct InsightsState {
    pub selected_index: usize,
}

impl InsightsState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self, max: usize) {
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

pub struct HistoryState {
    pub selected_index: usize,
    /// Set by the first clear keypress; the second one clears.
    pub confirm_clear: bool,
}

impl HistoryState {
    pub fn new() -> Self {
        Self {
            selected_index: 0,
            confirm_clear: false,
        }
    }

    pub fn next(&mut self, max: usize) {
        self.confirm_clear = false;
        if max > 0 && self.selected_index < max - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        self.confirm_clear = false;
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    fn clamp(&mut self, len: usize) {
        self.selected_index = self.selected_index.min(len.saturating_sub(1));
    }
}

pub struct ChatState {
    pub editing: bool,
    pub input_buffer: String,
}

impl ChatState {
    pub fn new() -> Self {
        Self {
            editing: false,
            input_buffer: String::new(),
        }
    }
}

pub struct LocationState {
    pub editing: bool,
    pub query: String,
    pub results: Vec<Location>,
    pub selected_index: usize,
    pub searching: bool,
}

impl LocationState {
    pub fn new() -> Self {
        Self {
            editing: false,
            query: String::new(),
            results: Vec::new(),
            selected_index: 0,
            searching: false,
        }
    }

    pub fn next(&mut self) {
        if !self.results.is_empty() && self.selected_index < self.results.len() - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }
}

pub struct App {
    pub screen: Screen,
    pub should_quit: bool,
    pub config: Config,
    pub export_dir: PathBuf,

    // Data
    pub history: HistoryLog<Database>,
    pub input: Option<PredictionInput>,
    pub prediction: Option<PredictionResult>,
    pub anomalies: Vec<Anomaly>,
    pub recommendations: Vec<Recommendation>,
    pub location: Option<Location>,
    pub weather: Option<WeatherSnapshot>,
    pub chat: ChatSession,

    // Screen states
    pub form_state: FormState,
    pub insights_state: InsightsState,
    pub history_state: HistoryState,
    pub chat_state: ChatState,
    pub location_state: LocationState,

    // Rule layer
    anomaly_detector: AnomalyDetector,
    rules_engine: RulesEngine,

    // Only the response for the latest ticket is applied
    prediction_ticket: u64,
    pending_ticket: Option<u64>,
    weather_ticket: u64,

    pub status_message: Option<String>,
}

impl App {
    pub fn new(config: Config, db: Database, export_dir: PathBuf) -> Result<Self> {
        let history = HistoryLog::open(db, config.history.capacity)?;
        tracing::debug!(records = history.len(), "History loaded");

        Ok(Self {
            screen: Screen::Form,
            should_quit: false,
            config,
            export_dir,
            history,
            input: None,
            prediction: None,
            anomalies: Vec::new(),
            recommendations: Vec::new(),
            location: None,
            weather: None,
            chat: ChatSession::new(),
            form_state: FormState::new(),
            insights_state: InsightsState::new(),
            history_state: HistoryState::new(),
            chat_state: ChatState::new(),
            location_state: LocationState::new(),
            anomaly_detector: AnomalyDetector::new(),
            rules_engine: RulesEngine::new(),
            prediction_ticket: 0,
            pending_ticket: None,
            weather_ticket: 0,
            status_message: None,
        })
    }

    pub fn switch_screen(&mut self, screen: Screen) {
        self.screen = screen;
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    /// True while a text field on the current screen is taking keystrokes.
    pub fn is_editing(&self) -> bool {
        match self.screen {
            Screen::Form => self.form_state.editing,
            Screen::Chat => self.chat_state.editing,
            Screen::Location => self.location_state.editing,
            _ => false,
        }
    }

    pub fn is_predicting(&self) -> bool {
        self.pending_ticket.is_some()
    }

    /// Validate the form and issue a new prediction ticket.
    ///
    /// Any earlier request still in flight becomes stale.
    pub fn begin_prediction(&mut self) -> Option<(u64, PredictionInput)> {
        if self.form_state.editing {
            self.form_state.finish_editing();
        }

        match self.form_state.to_form().validate() {
            Ok(input) => {
                self.prediction_ticket += 1;
                self.pending_ticket = Some(self.prediction_ticket);
                self.set_status("Predicting yield...");
                Some((self.prediction_ticket, input))
            }
            Err(e) => {
                self.set_status(&e.to_string());
                None
            }
        }
    }

    /// Apply a prediction response. Returns false when the ticket is stale.
    pub fn finish_prediction(
        &mut self,
        ticket: u64,
        input: PredictionInput,
        outcome: Result<PredictionResult>,
    ) -> bool {
        if self.pending_ticket != Some(ticket) {
            tracing::debug!(ticket, current = ?self.pending_ticket, "Discarding stale prediction");
            return false;
        }
        self.pending_ticket = None;

        match outcome {
            Ok(result) => {
                let location = self.location.as_ref().map(|l| HistoryLocation {
                    name: l.name.clone(),
                    country: l.country.clone(),
                });

                match self.history.record(input.clone(), result.clone(), location) {
                    Ok(_) => {
                        self.history_state.selected_index = 0;
                        self.set_status(&format!(
                            "Predicted {} kg/ha for {}",
                            calculations::format_thousands(result.yield_value),
                            input.item
                        ));
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to save prediction to history");
                        self.set_status(&format!("Prediction not saved to history: {}", e));
                    }
                }

                self.show_prediction(input, result);
                self.switch_screen(Screen::Results);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Prediction failed");
                self.clear_prediction();
                self.set_status(&prediction_error_message(&e));
            }
        }
        true
    }

    /// Clear the form and results; an in-flight prediction is dropped when it lands.
    pub fn reset_prediction(&mut self) {
        self.pending_ticket = None;
        self.clear_prediction();
        self.form_state.clear();
        self.switch_screen(Screen::Form);
        self.set_status("Ready for a new prediction");
    }

    fn clear_prediction(&mut self) {
        self.input = None;
        self.prediction = None;
        self.analyze();
    }

    fn show_prediction(&mut self, input: PredictionInput, result: PredictionResult) {
        self.input = Some(input);
        self.prediction = Some(result);
        self.insights_state = InsightsState::new();
        self.analyze();
    }

    /// Re-run the anomaly checks and recommendation rules on the current result.
    pub fn analyze(&mut self) {
        match (&self.input, &self.prediction) {
            (Some(input), Some(result)) => {
                self.anomalies = self.anomaly_detector.detect(input, result);
                self.recommendations =
                    self.rules_engine
                        .evaluate(input, result, self.weather.as_ref());
            }
            _ => {
                self.anomalies.clear();
                self.recommendations.clear();
            }
        }
    }

    pub fn trend(&self) -> Vec<TrendPoint> {
        match (&self.input, &self.prediction) {
            (Some(input), Some(result)) => {
                calculations::yield_trend(input, result, self.history.records())
            }
            _ => Vec::new(),
        }
    }

    /// Show the selected history record, recomputing its analysis.
    pub fn view_selected_history(&mut self) {
        let Some(record) = self
            .history
            .records()
            .get(self.history_state.selected_index)
            .cloned()
        else {
            return;
        };

        let result = PredictionResult::new(
            &record.input,
            record.prediction.yield_value,
            Some(record.prediction.confidence),
        );
        self.pending_ticket = None;
        self.form_state.load(&record.input);
        self.show_prediction(record.input, result);
        self.switch_screen(Screen::Results);
        self.set_status(&format!(
            "Showing prediction from {}",
            record
                .timestamp
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M")
        ));
    }

    pub fn delete_selected_history(&mut self) {
        let Some(id) = self
            .history
            .records()
            .get(self.history_state.selected_index)
            .map(|r| r.id.clone())
        else {
            return;
        };

        match self.history.delete(&id) {
            Ok(()) => self.set_status("Prediction deleted"),
            Err(e) => self.set_status(&format!("Delete failed: {}", e)),
        }
        self.history_state.confirm_clear = false;
        self.history_state.clamp(self.history.len());
    }

    pub fn clear_history(&mut self) {
        if self.history.is_empty() {
            return;
        }
        if !self.history_state.confirm_clear {
            self.history_state.confirm_clear = true;
            self.set_status("Press c again to delete all predictions");
            return;
        }

        self.history_state.confirm_clear = false;
        match self.history.clear() {
            Ok(()) => {
                self.history_state.selected_index = 0;
                self.set_status("History cleared");
            }
            Err(e) => self.set_status(&format!("Clear failed: {}", e)),
        }
    }

    pub fn export_history_csv(&mut self) -> Result<PathBuf> {
        let path = self
            .export_dir
            .join(export::default_csv_filename(Local::now().date_naive()));
        export::write_csv(self.history.records(), &path)?;
        Ok(path)
    }

    pub fn export_history_html(&mut self) -> Result<PathBuf> {
        let path = self
            .export_dir
            .join(export::default_csv_filename(Local::now().date_naive()))
            .with_extension("html");
        export::write_html(self.history.records(), &path)?;
        Ok(path)
    }

    /// Queue a chat message; returns the text and context to send.
    pub fn send_chat(&mut self, text: &str) -> Option<(String, Vec<ChatMessage>)> {
        let message = self.chat.submit(text)?;
        let context = self.chat.context(self.config.chat.context_messages).to_vec();
        Some((message.text, context))
    }

    pub fn send_chat_input(&mut self) -> Option<(String, Vec<ChatMessage>)> {
        if self.chat.pending {
            return None;
        }
        let text = std::mem::take(&mut self.chat_state.input_buffer);
        self.send_chat(&text)
    }

    pub fn send_quick_prompt(&mut self, index: usize) -> Option<(String, Vec<ChatMessage>)> {
        let (_, text) = QUICK_PROMPTS.get(index)?;
        self.send_chat(text)
    }

    pub fn finish_chat(&mut self, outcome: Result<String>) {
        match outcome {
            Ok(reply) => self.chat.receive(reply),
            Err(e) => {
                tracing::warn!(error = %e, "Chat request failed");
                self.chat.fail();
            }
        }
    }

    pub fn begin_search(&mut self) -> Option<String> {
        self.location_state.editing = false;
        let query = self.location_state.query.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.location_state.searching = true;
        self.set_status(&format!("Searching for '{}'...", query));
        Some(query)
    }

    pub fn finish_search(&mut self, outcome: Result<Vec<Location>>) {
        self.location_state.searching = false;
        match outcome {
            Ok(results) => {
                if results.is_empty() {
                    self.set_status("No locations found");
                } else {
                    self.clear_status();
                }
                self.location_state.results = results;
                self.location_state.selected_index = 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Location search failed");
                self.set_status(&format!("Search failed: {}", e));
            }
        }
    }

    pub fn selected_search_result(&self) -> Option<Location> {
        self.location_state
            .results
            .get(self.location_state.selected_index)
            .cloned()
    }

    /// Issue a new weather ticket, optionally switching to `location` first.
    ///
    /// Location and weather replies carrying an older ticket are dropped.
    pub fn begin_weather(&mut self, location: Option<Location>) -> u64 {
        self.weather_ticket += 1;
        if let Some(location) = location {
            self.set_location(location);
        }
        self.weather_ticket
    }

    /// Apply a resolved location. Returns false when the ticket is stale.
    pub fn resolve_location(&mut self, ticket: u64, location: Location) -> bool {
        if ticket != self.weather_ticket {
            tracing::debug!(ticket, current = self.weather_ticket, "Discarding stale location");
            return false;
        }
        self.set_location(location);
        true
    }

    fn set_location(&mut self, location: Location) {
        self.set_status(&format!("Location set to {}", location.label()));
        self.location = Some(location);
    }

    /// Apply a weather reply. Returns false when the ticket is stale.
    pub fn finish_weather(
        &mut self,
        ticket: u64,
        location: Location,
        outcome: Result<WeatherSnapshot>,
    ) -> bool {
        if ticket != self.weather_ticket {
            tracing::debug!(ticket, current = self.weather_ticket, "Discarding stale weather");
            return false;
        }

        match outcome {
            Ok(weather) => {
                self.set_status(&format!(
                    "Weather for {}: {:.0}°C, {}% humidity",
                    location.label(),
                    weather.temperature,
                    weather.humidity
                ));
                self.location = Some(location);
                self.weather = Some(weather);
                self.analyze();
            }
            Err(e) => {
                tracing::warn!(error = %e, "Weather fetch failed");
                self.set_status(&format!("Weather unavailable: {}", e));
            }
        }
        true
    }
}

fn prediction_error_message(error: &CropCastError) -> String {
    match error {
        CropCastError::Prediction(reason) => format!("Prediction Error: {}", reason),
        CropCastError::Http(_) | CropCastError::DataSourceUnavailable(_) => {
            "Connection Error: Failed to connect to the prediction service. Please make sure the backend is running."
                .to_string()
        }
        other => format!("Prediction Error: {}", other),
    }
}
