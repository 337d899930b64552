//! App shell: one session object owning the four forms, the toast notifier,
//! the cached search context, and the channels to the backend worker.

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossbeam_channel::{Receiver, Sender};
use egui::{Color32, RichText, ScrollArea, Slider, TextEdit};
use serde_json::Value;
use shared::protocol::{HitPayload, SearchHit};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::{UiError, UiErrorContext, UiEvent};
use crate::controller::orchestration::dispatch_backend_command;

const TOAST_DURATION: Duration = Duration::from_millis(3200);
const RESULT_TEXT_LIMIT: usize = 800;
const DEFAULT_BUSY_LABEL: &str = "Загружается...";
const FALLBACK_IDLE_LABEL: &str = "Готово";
const EMPTY_RESULT_PLACEHOLDER: &str = "Ответ пуст";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastTone {
    Info,
    Success,
    Error,
}

impl ToastTone {
    fn accent(self) -> Color32 {
        match self {
            Self::Info => Color32::from_rgb(96, 136, 255),
            Self::Success => Color32::from_rgb(64, 192, 120),
            Self::Error => Color32::from_rgb(224, 80, 80),
        }
    }
}

/// Transient status banner. Overlapping calls overwrite message, tone, and
/// deadline; last call wins.
struct Toast {
    message: String,
    tone: ToastTone,
    expires_at: Instant,
}

/// Submit-button state for one form: label swap plus disable while a request
/// is in flight. `end` must run on both the success and the error path.
struct SubmitControl {
    label: String,
    recorded: Option<String>,
    disabled: bool,
}

impl SubmitControl {
    fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            recorded: None,
            disabled: false,
        }
    }

    fn begin(&mut self, busy_label: Option<&str>) {
        self.recorded = Some(std::mem::replace(
            &mut self.label,
            busy_label.unwrap_or(DEFAULT_BUSY_LABEL).to_string(),
        ));
        self.disabled = true;
    }

    fn end(&mut self) {
        self.label = self
            .recorded
            .take()
            .unwrap_or_else(|| FALLBACK_IDLE_LABEL.to_string());
        self.disabled = false;
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn is_disabled(&self) -> bool {
        self.disabled
    }
}

/// What the search results area currently shows.
enum SearchView {
    Idle,
    NoMatches,
    Hits(Vec<SearchHit>),
    Failed(String),
}

struct UploadForm {
    picked_file: Option<PathBuf>,
    collection: String,
    submit: SubmitControl,
    status: String,
}

struct SearchForm {
    question: String,
    top_k: u32,
    submit: SubmitControl,
    view: SearchView,
}

struct GradeForm {
    question: String,
    student_answer: String,
    context: String,
    submit: SubmitControl,
    result: String,
}

struct PromptForm {
    prompt: String,
    submit: SubmitControl,
    result: String,
}

pub struct CoachApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    status: String,
    toast: Option<Toast>,
    upload: UploadForm,
    search: SearchForm,
    grade: GradeForm,
    prompt: PromptForm,
    /// Concatenated text of the most recent successful search's hits,
    /// separated by blank lines. Overwritten on every search, read only by
    /// the use-context action, never persisted.
    last_context: String,
}

impl CoachApp {
    pub fn new(cmd_tx: Sender<BackendCommand>, ui_rx: Receiver<UiEvent>) -> Self {
        Self {
            cmd_tx,
            ui_rx,
            status: String::new(),
            toast: None,
            upload: UploadForm {
                picked_file: None,
                collection: String::new(),
                submit: SubmitControl::new("Загрузить и проиндексировать"),
                status: String::new(),
            },
            search: SearchForm {
                question: String::new(),
                top_k: 5,
                submit: SubmitControl::new("Найти"),
                view: SearchView::Idle,
            },
            grade: GradeForm {
                question: String::new(),
                student_answer: String::new(),
                context: String::new(),
                submit: SubmitControl::new("Оценить"),
                result: String::new(),
            },
            prompt: PromptForm {
                prompt: String::new(),
                submit: SubmitControl::new("Отправить"),
                result: String::new(),
            },
            last_context: String::new(),
        }
    }

    fn show_toast(&mut self, message: impl Into<String>, tone: ToastTone) {
        self.toast = Some(Toast {
            message: message.into(),
            tone,
            expires_at: Instant::now() + TOAST_DURATION,
        });
    }

    fn prune_toast(&mut self) {
        if self
            .toast
            .as_ref()
            .is_some_and(|toast| toast.expires_at <= Instant::now())
        {
            self.toast = None;
        }
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.handle_event(event);
        }
    }

    fn handle_event(&mut self, event: UiEvent) {
        match event {
            UiEvent::Info(message) => {
                self.status = message;
            }
            UiEvent::UploadFinished(response) => {
                self.upload.status = format!(
                    "✅ Добавлено чанков: {}\nКоллекция: {}\nJSON: {}",
                    response.inserted, response.collection, response.json_path
                );
                self.show_toast("Лекция загружена и проиндексирована", ToastTone::Success);
                self.upload.submit.end();
            }
            UiEvent::SearchFinished { question, hits } => {
                self.last_context = build_context(&hits);
                if self.grade.question.trim().is_empty() {
                    self.grade.question = question;
                }
                self.search.view = if hits.is_empty() {
                    SearchView::NoMatches
                } else {
                    SearchView::Hits(hits)
                };
                self.show_toast("Поиск завершён", ToastTone::Success);
                self.search.submit.end();
            }
            UiEvent::GradeFinished { result } => {
                self.grade.result = non_empty_or_placeholder(result);
                self.show_toast("Оценка готова", ToastTone::Success);
                self.grade.submit.end();
            }
            UiEvent::EvaluateFinished { result } => {
                self.prompt.result = non_empty_or_placeholder(result);
                self.show_toast("Ответ получен", ToastTone::Success);
                self.prompt.submit.end();
            }
            UiEvent::Error(err) => self.handle_error(err),
        }
    }

    fn handle_error(&mut self, err: UiError) {
        tracing::warn!(context = ?err.context(), category = ?err.category(), "{}", err.message());
        let shown = format!("Ошибка: {}", err.message());
        match err.context() {
            UiErrorContext::Upload => {
                self.upload.status = shown;
                self.upload.submit.end();
            }
            UiErrorContext::Search => {
                self.search.view = SearchView::Failed(err.message().to_string());
                self.search.submit.end();
            }
            UiErrorContext::Grade => {
                self.grade.result = shown;
                self.grade.submit.end();
            }
            UiErrorContext::Evaluate => {
                self.prompt.result = shown;
                self.prompt.submit.end();
            }
            UiErrorContext::BackendStartup => {
                self.status = err.message().to_string();
            }
        }
        self.show_toast(err.message().to_string(), ToastTone::Error);
    }

    fn submit_upload(&mut self) {
        let Some(path) = self.upload.picked_file.clone() else {
            self.show_toast("Выберите PDF-файл", ToastTone::Error);
            return;
        };
        let collection = trimmed_non_empty(&self.upload.collection);
        self.upload.submit.begin(Some("Индексируем..."));
        self.upload.status = "Загрузка...".to_string();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::UploadPdf { path, collection },
            &mut self.status,
        );
        if !queued {
            self.upload.submit.end();
        }
    }

    fn submit_search(&mut self) {
        let question = self.search.question.trim().to_string();
        if question.is_empty() {
            self.show_toast("Введите вопрос", ToastTone::Error);
            return;
        }
        self.search.submit.begin(Some("Ищем..."));
        self.search.view = SearchView::Idle;
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Search {
                question,
                top_k: self.search.top_k,
            },
            &mut self.status,
        );
        if !queued {
            self.search.submit.end();
        }
    }

    fn use_search_context(&mut self) {
        if self.last_context.is_empty() {
            self.show_toast("Сначала выполните поиск", ToastTone::Error);
            return;
        }
        self.grade.context = self.last_context.clone();
        self.show_toast("Контекст добавлен в форму оценки", ToastTone::Success);
    }

    fn submit_grade(&mut self) {
        let question = self.grade.question.trim().to_string();
        let student_answer = self.grade.student_answer.trim().to_string();
        if question.is_empty() || student_answer.is_empty() {
            self.show_toast("Заполните вопрос и ответ", ToastTone::Error);
            return;
        }
        let lecture_snippet = trimmed_non_empty(&self.grade.context);
        self.grade.submit.begin(Some("Оцениваем..."));
        self.grade.result.clear();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Grade {
                question,
                student_answer,
                lecture_snippet,
            },
            &mut self.status,
        );
        if !queued {
            self.grade.submit.end();
        }
    }

    fn submit_prompt(&mut self) {
        let prompt = self.prompt.prompt.trim().to_string();
        if prompt.is_empty() {
            self.show_toast("Введите промпт", ToastTone::Error);
            return;
        }
        self.prompt.submit.begin(Some("Отправляем..."));
        self.prompt.result.clear();
        let queued = dispatch_backend_command(
            &self.cmd_tx,
            BackendCommand::Evaluate { prompt },
            &mut self.status,
        );
        if !queued {
            self.prompt.submit.end();
        }
    }

    fn show_upload_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Загрузка лекции");
        ui.horizontal(|ui| {
            if ui.button("Выбрать PDF").clicked() {
                if let Some(path) = rfd::FileDialog::new()
                    .add_filter("PDF", &["pdf"])
                    .pick_file()
                {
                    self.upload.picked_file = Some(path);
                }
            }
            match &self.upload.picked_file {
                Some(path) => ui.monospace(
                    path.file_name()
                        .map(|name| name.to_string_lossy().into_owned())
                        .unwrap_or_else(|| path.display().to_string()),
                ),
                None => ui.weak("Файл не выбран"),
            };
        });
        ui.horizontal(|ui| {
            ui.label("Коллекция:");
            ui.add(
                TextEdit::singleline(&mut self.upload.collection).hint_text("необязательно"),
            );
        });
        if submit_button(ui, &self.upload.submit) {
            self.submit_upload();
        }
        if !self.upload.status.is_empty() {
            ui.label(&self.upload.status);
        }
    }

    fn show_search_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Поиск по лекциям");
        ui.add(TextEdit::singleline(&mut self.search.question).hint_text("Вопрос"));
        ui.add(Slider::new(&mut self.search.top_k, 1..=20).text("Top-K"));
        if submit_button(ui, &self.search.submit) {
            self.submit_search();
        }

        match &self.search.view {
            SearchView::Idle => {}
            SearchView::NoMatches => {
                ui.weak("Ничего не найдено");
            }
            SearchView::Failed(message) => {
                ui.weak(format!("Ошибка: {message}"));
            }
            SearchView::Hits(hits) => {
                for (idx, hit) in hits.iter().enumerate() {
                    ui.group(|ui| {
                        ui.horizontal_wrapped(|ui| {
                            ui.strong(format!("#{} · {}", idx + 1, format_score(&hit.score)));
                            ui.label(format!("src: {}", source_label(&hit.payload)));
                            ui.label(format!("page: {}", page_label(&hit.payload.page)));
                            ui.label(format!("chunk: {}", chunk_label(&hit.payload.chunk_id)));
                        });
                        ui.label(truncate_chars(&hit.payload.text, RESULT_TEXT_LIMIT));
                    });
                }
            }
        }

        if ui.button("Использовать контекст в оценке").clicked() {
            self.use_search_context();
        }
    }

    fn show_grade_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Оценка ответа");
        ui.add(TextEdit::singleline(&mut self.grade.question).hint_text("Вопрос"));
        ui.add(
            TextEdit::multiline(&mut self.grade.student_answer)
                .hint_text("Ответ студента")
                .desired_rows(3),
        );
        ui.add(
            TextEdit::multiline(&mut self.grade.context)
                .hint_text("Контекст лекции (необязательно)")
                .desired_rows(3),
        );
        if submit_button(ui, &self.grade.submit) {
            self.submit_grade();
        }
        if !self.grade.result.is_empty() {
            ui.label(&self.grade.result);
        }
    }

    fn show_prompt_section(&mut self, ui: &mut egui::Ui) {
        ui.heading("Произвольный промпт");
        ui.add(
            TextEdit::multiline(&mut self.prompt.prompt)
                .hint_text("Промпт")
                .desired_rows(3),
        );
        if submit_button(ui, &self.prompt.submit) {
            self.submit_prompt();
        }
        if !self.prompt.result.is_empty() {
            ui.label(&self.prompt.result);
        }
    }

    fn show_toast_overlay(&self, ctx: &egui::Context) {
        let Some(toast) = &self.toast else {
            return;
        };
        egui::Area::new(egui::Id::new("toast"))
            .anchor(egui::Align2::RIGHT_BOTTOM, [-16.0, -16.0])
            .show(ctx, |ui| {
                egui::Frame::popup(ui.style())
                    .stroke(egui::Stroke::new(2.0, toast.tone.accent()))
                    .show(ui, |ui| {
                        ui.label(RichText::new(&toast.message).strong());
                    });
            });
    }
}

fn submit_button(ui: &mut egui::Ui, control: &SubmitControl) -> bool {
    ui.add_enabled(
        !control.is_disabled(),
        egui::Button::new(control.label()),
    )
    .clicked()
}

impl eframe::App for CoachApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();
        self.prune_toast();

        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.weak(self.status.as_str());
        });
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical().show(ui, |ui| {
                self.show_upload_section(ui);
                ui.separator();
                self.show_search_section(ui);
                ui.separator();
                self.show_grade_section(ui);
                ui.separator();
                self.show_prompt_section(ui);
            });
        });
        self.show_toast_overlay(ctx);

        // Keeps toast expiry and queued backend events moving without input.
        ctx.request_repaint_after(Duration::from_millis(100));
    }
}

/// Rebuilds the grading context from hits: non-empty texts joined by a blank
/// line, in hit order.
fn build_context(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| hit.payload.text.as_str())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Numeric scores render with three decimals; anything else renders raw.
/// The backend has changed its score format before, so this stays tolerant.
fn format_score(score: &Value) -> String {
    match score {
        Value::Number(number) => match number.as_f64() {
            Some(value) => format!("{value:.3}"),
            None => number.to_string(),
        },
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn source_label(payload: &HitPayload) -> &str {
    for candidate in [payload.source.as_deref(), payload.filename.as_deref()] {
        if let Some(text) = candidate {
            if !text.is_empty() {
                return text;
            }
        }
    }
    "–"
}

fn page_label(page: &Option<Value>) -> String {
    match page {
        Some(Value::String(text)) if !text.is_empty() => text.clone(),
        Some(Value::Number(number)) if number.as_f64() != Some(0.0) => number.to_string(),
        _ => "?".to_string(),
    }
}

fn chunk_label(chunk_id: &Option<Value>) -> String {
    match chunk_id {
        None | Some(Value::Null) => "?".to_string(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}

fn truncate_chars(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

fn non_empty_or_placeholder(result: String) -> String {
    if result.is_empty() {
        EMPTY_RESULT_PLACEHOLDER.to_string()
    } else {
        result
    }
}

fn trimmed_non_empty(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
